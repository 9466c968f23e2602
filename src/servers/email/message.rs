use anyhow::Result;
use lettre::message::header::ContentType;
use lettre::message::{Mailbox, Message};
use mailparse::{MailHeaderMap, ParsedMail};
use serde::Serialize;

const PREVIEW_CHARS: usize = 200;

/// An outgoing plain-text message before addressing is validated.
#[derive(Debug, Clone, Default)]
pub struct Draft {
    pub to: String,
    pub subject: String,
    pub body: String,
    pub cc: Vec<String>,
    pub bcc: Vec<String>,
}

impl Draft {
    pub fn recipient_count(&self) -> usize {
        1 + self.cc.len() + self.bcc.len()
    }
}

/// Split a comma-separated address list, dropping blanks.
pub fn parse_recipients(list: &str) -> Vec<String> {
    list.split(',')
        .map(str::trim)
        .filter(|address| !address.is_empty())
        .map(str::to_string)
        .collect()
}

fn mailbox(address: &str) -> Result<Mailbox> {
    address
        .trim()
        .parse()
        .map_err(|e| anyhow::anyhow!("Invalid email address '{}': {}", address, e))
}

/// Build the RFC 5322 message. Bcc recipients end up in the envelope only.
pub fn build_message(from: &str, draft: &Draft) -> Result<Message> {
    let mut builder = Message::builder()
        .from(mailbox(from)?)
        .to(mailbox(&draft.to)?)
        .subject(draft.subject.as_str())
        .header(ContentType::TEXT_PLAIN);
    for cc in &draft.cc {
        builder = builder.cc(mailbox(cc)?);
    }
    for bcc in &draft.bcc {
        builder = builder.bcc(mailbox(bcc)?);
    }
    Ok(builder.body(draft.body.clone())?)
}

/// Header fields and a short text preview of a fetched message.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MessageSummary {
    pub id: u32,
    pub from: String,
    pub to: String,
    pub subject: String,
    pub date: String,
    pub preview: Option<String>,
}

pub fn summarize(id: u32, raw: &[u8]) -> Result<MessageSummary> {
    let parsed = mailparse::parse_mail(raw)?;
    let header = |name: &str, fallback: &str| {
        parsed
            .headers
            .get_first_value(name)
            .unwrap_or_else(|| fallback.to_string())
    };

    let preview = plain_text(&parsed)
        .map(|text| text.trim().chars().take(PREVIEW_CHARS).collect::<String>())
        .filter(|text| !text.is_empty());

    Ok(MessageSummary {
        id,
        from: header("From", "Unknown"),
        to: header("To", "Unknown"),
        subject: header("Subject", "No Subject"),
        date: header("Date", "Unknown"),
        preview,
    })
}

/// First text/plain leaf, depth first.
fn plain_text(part: &ParsedMail) -> Option<String> {
    if part.subparts.is_empty() {
        if part.ctype.mimetype.eq_ignore_ascii_case("text/plain") {
            return part.get_body().ok();
        }
        return None;
    }
    part.subparts.iter().find_map(plain_text)
}

/// Quote a string for use as an IMAP search argument.
pub fn imap_quote(value: &str) -> String {
    let escaped = value.replace('\\', "\\\\").replace('"', "\\\"");
    format!("\"{}\"", escaped)
}

/// Message sequence numbers are plain positive integers.
pub fn parse_message_id(id: &str) -> Result<u32> {
    match id.trim().parse::<u32>() {
        Ok(n) if n > 0 => Ok(n),
        _ => Err(anyhow::anyhow!("Invalid email id '{}': expected a message number", id)),
    }
}
