use super::message::{self, Draft, MessageSummary};
use crate::EmailConfig;
use anyhow::Result;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{SmtpTransport, Transport};
use native_tls::{TlsConnector, TlsStream};
use std::net::TcpStream;

type ImapSession = imap::Session<TlsStream<TcpStream>>;

/// Blocking SMTP and IMAP access for one account. Every call opens its own
/// connection and logs out before returning.
pub struct MailClient {
    config: EmailConfig,
}

/// The newest matches of a search, newest first, plus the total match count.
pub struct MessagePage {
    pub total: usize,
    pub messages: Vec<MessageSummary>,
}

impl MailClient {
    pub fn new(config: EmailConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &EmailConfig {
        &self.config
    }

    fn smtp(&self) -> Result<SmtpTransport> {
        let (address, password) = self.config.credentials()?;
        Ok(SmtpTransport::starttls_relay(&self.config.smtp_server)?
            .port(self.config.smtp_port)
            .credentials(Credentials::new(address.to_string(), password.to_string()))
            .build())
    }

    fn session(&self) -> Result<ImapSession> {
        let (address, password) = self.config.credentials()?;
        let tls = TlsConnector::builder().build()?;
        let host = self.config.imap_server.as_str();
        let client = imap::connect((host, self.config.imap_port), host, &tls)?;
        let session = client.login(address, password).map_err(|(e, _)| e)?;
        log::debug!("IMAP session opened on {}:{}", host, self.config.imap_port);
        Ok(session)
    }

    /// Run `work` against `folder`, logging out whatever the outcome.
    fn in_folder<T>(
        &self,
        folder: &str,
        work: impl FnOnce(&mut ImapSession) -> Result<T>,
    ) -> Result<T> {
        let mut session = self.session()?;
        let result = session
            .select(folder)
            .map_err(|e| anyhow::anyhow!("Cannot open folder '{}': {}", folder, e))
            .and_then(|_| work(&mut session));
        if let Err(e) = session.logout() {
            log::debug!("IMAP logout failed: {}", e);
        }
        result
    }

    pub fn send(&self, draft: &Draft) -> Result<()> {
        let (address, _) = self.config.credentials()?;
        let email = message::build_message(address, draft)?;
        self.smtp()?.send(&email)?;
        log::info!("Sent '{}' to {} recipient(s)", draft.subject, draft.recipient_count());
        Ok(())
    }

    pub fn fetch(&self, folder: &str, criteria: &str, limit: usize) -> Result<MessagePage> {
        self.in_folder(folder, |session| {
            let mut ids: Vec<u32> = session.search(criteria)?.into_iter().collect();
            ids.sort_unstable();
            let total = ids.len();

            let mut messages = Vec::new();
            for id in ids.into_iter().rev().take(limit) {
                let fetches = session.fetch(id.to_string(), "RFC822")?;
                match fetches.iter().find_map(|fetch| fetch.body()) {
                    Some(raw) => messages.push(message::summarize(id, raw)?),
                    None => log::debug!("Message {} came back without a body", id),
                }
            }
            Ok(MessagePage { total, messages })
        })
    }

    pub fn unread_count(&self, folder: &str) -> Result<usize> {
        self.in_folder(folder, |session| Ok(session.search("UNSEEN")?.len()))
    }

    pub fn mark_seen(&self, folder: &str, id: u32) -> Result<()> {
        self.in_folder(folder, |session| {
            session.store(id.to_string(), "+FLAGS (\\Seen)")?;
            Ok(())
        })
    }

    pub fn delete(&self, folder: &str, id: u32) -> Result<()> {
        self.in_folder(folder, |session| {
            session.store(id.to_string(), "+FLAGS (\\Deleted)")?;
            session.expunge()?;
            Ok(())
        })
    }

    pub fn folders(&self) -> Result<Vec<String>> {
        let mut session = self.session()?;
        let result = session
            .list(None, Some("*"))
            .map(|names| names.iter().map(|name| name.name().to_string()).collect::<Vec<_>>());
        if let Err(e) = session.logout() {
            log::debug!("IMAP logout failed: {}", e);
        }
        Ok(result?)
    }

    pub fn check_smtp(&self) -> Result<()> {
        if self.smtp()?.test_connection()? {
            Ok(())
        } else {
            Err(anyhow::anyhow!("SMTP server did not accept the connection"))
        }
    }

    pub fn check_imap(&self) -> Result<()> {
        let mut session = self.session()?;
        session.logout()?;
        Ok(())
    }
}
