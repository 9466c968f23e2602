use super::client::{MailClient, MessagePage};
use super::message::{self, Draft};
use crate::tool::{parse_arguments, Tool};
use anyhow::Result;
use serde_json::{json, Value};
use std::sync::Arc;

const MAX_MESSAGES: usize = 100;

fn default_folder() -> String {
    "INBOX".to_string()
}

fn default_limit() -> usize {
    10
}

/// Fail fast on missing credentials, then run the mail work off the runtime.
async fn with_client<T, F>(client: &Arc<MailClient>, work: F) -> Result<T>
where
    F: FnOnce(&MailClient) -> Result<T> + Send + 'static,
    T: Send + 'static,
{
    client.config().credentials()?;
    let client = Arc::clone(client);
    tokio::task::spawn_blocking(move || work(&client)).await?
}

fn render_messages(heading: &str, page: &MessagePage) -> String {
    let mut output = format!("{}\n{}\n", heading, "=".repeat(50));
    for summary in &page.messages {
        output.push_str(&format!(
            "\nEmail ID: {}\nFrom: {}\nTo: {}\nSubject: {}\nDate: {}\n",
            summary.id, summary.from, summary.to, summary.subject, summary.date
        ));
        if let Some(preview) = &summary.preview {
            output.push_str(&format!("Preview: {}\n", preview));
        }
        output.push_str(&format!("{}\n", "-".repeat(40)));
    }
    output.trim_end().to_string()
}

/// Send a plain-text email over SMTP
pub struct SendEmailTool {
    client: Arc<MailClient>,
}

#[derive(serde::Deserialize)]
struct SendEmailParams {
    to: String,
    subject: String,
    body: String,
    #[serde(default)]
    cc: String,
    #[serde(default)]
    bcc: String,
}

impl SendEmailTool {
    pub fn new(client: Arc<MailClient>) -> Self {
        Self { client }
    }
}

#[async_trait::async_trait]
impl Tool for SendEmailTool {
    fn name(&self) -> &str {
        "send_email"
    }

    fn description(&self) -> &str {
        "Send a plain-text email, with optional comma-separated CC and BCC lists."
    }

    fn parameters(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "to": { "type": "string", "description": "Recipient address" },
                "subject": { "type": "string", "description": "Subject line" },
                "body": { "type": "string", "description": "Plain-text body" },
                "cc": { "type": "string", "description": "Comma-separated CC addresses" },
                "bcc": { "type": "string", "description": "Comma-separated BCC addresses" }
            },
            "required": ["to", "subject", "body"]
        })
    }

    async fn execute(&self, arguments: &str) -> Result<String> {
        let params: SendEmailParams = parse_arguments(self.name(), arguments)?;
        let draft = Draft {
            to: params.to.trim().to_string(),
            subject: params.subject,
            body: params.body,
            cc: message::parse_recipients(&params.cc),
            bcc: message::parse_recipients(&params.bcc),
        };
        let to = draft.to.clone();
        let recipients = draft.recipient_count();

        with_client(&self.client, move |client| client.send(&draft)).await?;
        Ok(format!("Email sent successfully to {} ({} recipient(s))", to, recipients))
    }
}

/// Newest messages in a folder
pub struct ReadEmailsTool {
    client: Arc<MailClient>,
}

#[derive(serde::Deserialize)]
struct ReadEmailsParams {
    #[serde(default = "default_folder")]
    folder: String,
    #[serde(default = "default_limit")]
    limit: usize,
    #[serde(default)]
    unread_only: bool,
}

impl ReadEmailsTool {
    pub fn new(client: Arc<MailClient>) -> Self {
        Self { client }
    }
}

#[async_trait::async_trait]
impl Tool for ReadEmailsTool {
    fn name(&self) -> &str {
        "read_emails"
    }

    fn description(&self) -> &str {
        "Read the most recent emails in a folder, newest first, with a short preview of each."
    }

    fn parameters(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "folder": { "type": "string", "description": "Mailbox folder (default: INBOX)" },
                "limit": { "type": "integer", "minimum": 1, "description": "Messages to return (default: 10)" },
                "unread_only": { "type": "boolean", "description": "Only unread messages (default: false)" }
            }
        })
    }

    async fn execute(&self, arguments: &str) -> Result<String> {
        let params: ReadEmailsParams = parse_arguments(self.name(), arguments)?;
        let limit = params.limit.clamp(1, MAX_MESSAGES);
        let criteria = if params.unread_only { "UNSEEN" } else { "ALL" };
        let folder = params.folder.clone();

        let page = with_client(&self.client, move |client| {
            client.fetch(&folder, criteria, limit)
        })
        .await?;

        if page.messages.is_empty() {
            return Ok(format!("No emails found in {}", params.folder));
        }
        let kind = if params.unread_only { "unread " } else { "" };
        let heading = format!(
            "Recent {} {}email(s) from {}:",
            page.messages.len(),
            kind,
            params.folder
        );
        Ok(render_messages(&heading, &page))
    }
}

#[derive(serde::Deserialize)]
struct FolderParams {
    #[serde(default = "default_folder")]
    folder: String,
}

/// Count of unseen messages in a folder
pub struct UnreadCountTool {
    client: Arc<MailClient>,
}

impl UnreadCountTool {
    pub fn new(client: Arc<MailClient>) -> Self {
        Self { client }
    }
}

#[async_trait::async_trait]
impl Tool for UnreadCountTool {
    fn name(&self) -> &str {
        "get_unread_count"
    }

    fn description(&self) -> &str {
        "Count the unread emails in a folder."
    }

    fn parameters(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "folder": { "type": "string", "description": "Mailbox folder (default: INBOX)" }
            }
        })
    }

    async fn execute(&self, arguments: &str) -> Result<String> {
        let params: FolderParams = parse_arguments(self.name(), arguments)?;
        let folder = params.folder.clone();
        let count = with_client(&self.client, move |client| client.unread_count(&folder)).await?;
        Ok(format!("You have {} unread email(s) in {}", count, params.folder))
    }
}

#[derive(serde::Deserialize)]
struct MessageParams {
    email_id: String,
    #[serde(default = "default_folder")]
    folder: String,
}

pub struct MarkAsReadTool {
    client: Arc<MailClient>,
}

impl MarkAsReadTool {
    pub fn new(client: Arc<MailClient>) -> Self {
        Self { client }
    }
}

#[async_trait::async_trait]
impl Tool for MarkAsReadTool {
    fn name(&self) -> &str {
        "mark_as_read"
    }

    fn description(&self) -> &str {
        "Mark one email as read by its message number."
    }

    fn parameters(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "email_id": { "type": "string", "description": "Message number as shown by read_emails" },
                "folder": { "type": "string", "description": "Mailbox folder (default: INBOX)" }
            },
            "required": ["email_id"]
        })
    }

    async fn execute(&self, arguments: &str) -> Result<String> {
        let params: MessageParams = parse_arguments(self.name(), arguments)?;
        let id = message::parse_message_id(&params.email_id)?;
        let folder = params.folder;
        with_client(&self.client, move |client| client.mark_seen(&folder, id)).await?;
        Ok(format!("Email {} marked as read", id))
    }
}

/// Subject search within a folder
pub struct SearchEmailsTool {
    client: Arc<MailClient>,
}

#[derive(serde::Deserialize)]
struct SearchEmailsParams {
    query: String,
    #[serde(default = "default_folder")]
    folder: String,
    #[serde(default = "default_limit")]
    limit: usize,
}

impl SearchEmailsTool {
    pub fn new(client: Arc<MailClient>) -> Self {
        Self { client }
    }
}

#[async_trait::async_trait]
impl Tool for SearchEmailsTool {
    fn name(&self) -> &str {
        "search_emails"
    }

    fn description(&self) -> &str {
        "Search a folder for emails whose subject contains the query, newest first."
    }

    fn parameters(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "query": { "type": "string", "description": "Text to look for in subjects" },
                "folder": { "type": "string", "description": "Mailbox folder (default: INBOX)" },
                "limit": { "type": "integer", "minimum": 1, "description": "Messages to return (default: 10)" }
            },
            "required": ["query"]
        })
    }

    async fn execute(&self, arguments: &str) -> Result<String> {
        let params: SearchEmailsParams = parse_arguments(self.name(), arguments)?;
        let query = params.query.trim().to_string();
        if query.is_empty() {
            return Err(anyhow::anyhow!("Search query must not be empty"));
        }
        let criteria = format!("SUBJECT {}", message::imap_quote(&query));
        let limit = params.limit.clamp(1, MAX_MESSAGES);
        let folder = params.folder.clone();

        let page = with_client(&self.client, move |client| {
            client.fetch(&folder, &criteria, limit)
        })
        .await?;

        if page.messages.is_empty() {
            return Ok(format!("No emails found matching '{}' in {}", query, params.folder));
        }
        let heading = format!(
            "Found {} email(s) matching '{}' in {} (showing {}):",
            page.total,
            query,
            params.folder,
            page.messages.len()
        );
        Ok(render_messages(&heading, &page))
    }
}

pub struct FoldersTool {
    client: Arc<MailClient>,
}

impl FoldersTool {
    pub fn new(client: Arc<MailClient>) -> Self {
        Self { client }
    }
}

#[async_trait::async_trait]
impl Tool for FoldersTool {
    fn name(&self) -> &str {
        "get_email_folders"
    }

    fn description(&self) -> &str {
        "List the mailbox folders on the IMAP server."
    }

    fn parameters(&self) -> Value {
        json!({ "type": "object", "properties": {} })
    }

    async fn execute(&self, _arguments: &str) -> Result<String> {
        let folders = with_client(&self.client, |client| client.folders()).await?;
        if folders.is_empty() {
            return Ok("No email folders found".to_string());
        }
        let lines: Vec<String> = folders.iter().map(|folder| format!("  - {}", folder)).collect();
        Ok(format!("Available email folders:\n{}", lines.join("\n")))
    }
}

pub struct DeleteEmailTool {
    client: Arc<MailClient>,
}

impl DeleteEmailTool {
    pub fn new(client: Arc<MailClient>) -> Self {
        Self { client }
    }
}

#[async_trait::async_trait]
impl Tool for DeleteEmailTool {
    fn name(&self) -> &str {
        "delete_email"
    }

    fn description(&self) -> &str {
        "Delete one email by its message number and expunge the folder."
    }

    fn parameters(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "email_id": { "type": "string", "description": "Message number as shown by read_emails" },
                "folder": { "type": "string", "description": "Mailbox folder (default: INBOX)" }
            },
            "required": ["email_id"]
        })
    }

    async fn execute(&self, arguments: &str) -> Result<String> {
        let params: MessageParams = parse_arguments(self.name(), arguments)?;
        let id = message::parse_message_id(&params.email_id)?;
        let folder = params.folder.clone();
        with_client(&self.client, move |client| client.delete(&folder, id)).await?;
        Ok(format!("Email {} deleted from {}", id, params.folder))
    }
}

/// Log in to both servers and report each result
pub struct TestConnectionTool {
    client: Arc<MailClient>,
}

impl TestConnectionTool {
    pub fn new(client: Arc<MailClient>) -> Self {
        Self { client }
    }

    fn status(result: &Result<()>) -> String {
        match result {
            Ok(()) => "OK".to_string(),
            Err(e) => format!("FAILED - {}", e),
        }
    }
}

#[async_trait::async_trait]
impl Tool for TestConnectionTool {
    fn name(&self) -> &str {
        "test_connection"
    }

    fn description(&self) -> &str {
        "Check that the configured SMTP and IMAP servers accept the account credentials."
    }

    fn parameters(&self) -> Value {
        json!({ "type": "object", "properties": {} })
    }

    async fn execute(&self, _arguments: &str) -> Result<String> {
        let (smtp, imap) =
            with_client(&self.client, |client| Ok((client.check_smtp(), client.check_imap())))
                .await?;

        let config = self.client.config();
        Ok(format!(
            "Email connection test:\n  SMTP ({}:{}): {}\n  IMAP ({}:{}): {}",
            config.smtp_server,
            config.smtp_port,
            Self::status(&smtp),
            config.imap_server,
            config.imap_port,
            Self::status(&imap)
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::servers::email::message::MessageSummary;
    use crate::EmailConfig;

    fn unconfigured() -> Arc<MailClient> {
        Arc::new(MailClient::new(EmailConfig::default()))
    }

    fn configured() -> Arc<MailClient> {
        Arc::new(MailClient::new(EmailConfig {
            address: Some("me@example.com".to_string()),
            password: Some("secret".to_string()),
            ..EmailConfig::default()
        }))
    }

    #[tokio::test]
    async fn test_missing_credentials_are_reported() {
        let client = unconfigured();
        let tools: Vec<Box<dyn Tool>> = vec![
            Box::new(ReadEmailsTool::new(client.clone())),
            Box::new(UnreadCountTool::new(client.clone())),
            Box::new(FoldersTool::new(client.clone())),
            Box::new(TestConnectionTool::new(client.clone())),
            Box::new(SendEmailTool::new(client)),
        ];
        for tool in tools {
            let arguments = if tool.name() == "send_email" {
                r#"{"to": "a@example.com", "subject": "s", "body": "b"}"#
            } else {
                "{}"
            };
            let err = tool.execute(arguments).await.unwrap_err();
            assert!(
                err.to_string().contains("Email credentials not configured"),
                "{}: {}",
                tool.name(),
                err
            );
        }
    }

    #[tokio::test]
    async fn test_bad_message_id_fails_before_connecting() {
        let err = MarkAsReadTool::new(configured())
            .execute(r#"{"email_id": "1:*"}"#)
            .await
            .unwrap_err();
        assert!(err.to_string().contains("Invalid email id '1:*'"));

        let err = DeleteEmailTool::new(configured())
            .execute(r#"{"email_id": "zero"}"#)
            .await
            .unwrap_err();
        assert!(err.to_string().contains("Invalid email id 'zero'"));
    }

    #[tokio::test]
    async fn test_empty_search_query() {
        let err = SearchEmailsTool::new(configured())
            .execute(r#"{"query": "   "}"#)
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "Search query must not be empty");
    }

    #[tokio::test]
    async fn test_invalid_recipient_fails_before_connecting() {
        let err = SendEmailTool::new(configured())
            .execute(r#"{"to": "a@example.com", "subject": "s", "body": "b", "cc": "nope"}"#)
            .await
            .unwrap_err();
        assert!(err.to_string().contains("Invalid email address 'nope'"));
    }

    #[test]
    fn test_render_messages() {
        let page = MessagePage {
            total: 3,
            messages: vec![
                MessageSummary {
                    id: 9,
                    from: "a@example.com".to_string(),
                    to: "me@example.com".to_string(),
                    subject: "Invoice".to_string(),
                    date: "Tue, 7 May 2024".to_string(),
                    preview: Some("Amount due".to_string()),
                },
                MessageSummary {
                    id: 8,
                    from: "b@example.com".to_string(),
                    to: "me@example.com".to_string(),
                    subject: "No body".to_string(),
                    date: "Mon, 6 May 2024".to_string(),
                    preview: None,
                },
            ],
        };
        let output = render_messages("Recent 2 email(s) from INBOX:", &page);

        assert!(output.starts_with("Recent 2 email(s) from INBOX:\n====="));
        assert!(output.contains("Email ID: 9\nFrom: a@example.com"));
        assert!(output.contains("Preview: Amount due"));
        assert_eq!(output.matches("Preview:").count(), 1);
        assert!(output.ends_with(&"-".repeat(40)));
    }
}
