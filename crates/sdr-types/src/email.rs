//! Email shapes handed from the formatting stage to the delivery provider.

use serde::{Deserialize, Serialize};
use std::fmt;

/// MIME type of an email body.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ContentType {
    #[serde(rename = "text/html")]
    Html,
    #[serde(rename = "text/plain")]
    Plain,
}

impl ContentType {
    pub fn as_mime(&self) -> &'static str {
        match self {
            ContentType::Html => "text/html",
            ContentType::Plain => "text/plain",
        }
    }
}

impl fmt::Display for ContentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_mime())
    }
}

/// Subject and body produced by the email-formatting stage.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FormattedEmail {
    pub subject: String,
    pub body: String,
    pub content_type: ContentType,
}

/// A fully addressed email ready for a delivery provider.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutgoingEmail {
    pub from: String,
    pub to: String,
    pub subject: String,
    pub body: String,
    pub content_type: ContentType,
}

impl OutgoingEmail {
    pub fn new(from: &str, to: &str, email: &FormattedEmail) -> Self {
        Self {
            from: from.to_string(),
            to: to.to_string(),
            subject: email.subject.clone(),
            body: email.body.clone(),
            content_type: email.content_type,
        }
    }
}

/// What the delivery provider told us after accepting an email.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeliveryReceipt {
    /// Provider name (e.g., "sendgrid", "dry-run").
    pub provider: String,
    /// HTTP status returned by the provider, when there was a request.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status_code: Option<u16>,
    /// Provider-assigned message ID, when returned.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message_id: Option<String>,
    /// True when nothing was actually sent.
    #[serde(default)]
    pub dry_run: bool,
}
