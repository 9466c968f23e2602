use super::client::MailClient;
use super::tools::{
    DeleteEmailTool, FoldersTool, MarkAsReadTool, ReadEmailsTool, SearchEmailsTool, SendEmailTool,
    TestConnectionTool, UnreadCountTool,
};
use crate::server::{register, Server, ToolMap};
use crate::EmailConfig;
use std::sync::Arc;

/// One mail account over SMTP and IMAP
pub struct EmailServer {
    tools: ToolMap,
}

impl EmailServer {
    pub fn new(config: EmailConfig) -> Self {
        if config.credentials().is_err() {
            log::debug!("Email credentials not set; email tools will report it on use");
        }
        let client = Arc::new(MailClient::new(config));
        let mut tools = ToolMap::new();

        register(&mut tools, SendEmailTool::new(client.clone()));
        register(&mut tools, ReadEmailsTool::new(client.clone()));
        register(&mut tools, UnreadCountTool::new(client.clone()));
        register(&mut tools, MarkAsReadTool::new(client.clone()));
        register(&mut tools, SearchEmailsTool::new(client.clone()));
        register(&mut tools, FoldersTool::new(client.clone()));
        register(&mut tools, DeleteEmailTool::new(client.clone()));
        register(&mut tools, TestConnectionTool::new(client));

        log::debug!("Email server registered {} tools", tools.len());
        Self { tools }
    }
}

#[async_trait::async_trait]
impl Server for EmailServer {
    fn name(&self) -> &str {
        "email"
    }

    fn description(&self) -> &str {
        "Send, read, search and manage email for one account over SMTP and IMAP."
    }

    fn tools(&self) -> &ToolMap {
        &self.tools
    }
}
