use serde::Serialize;

/// Plain-text email handed to the outbound transport.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EmailMessage {
    pub from: String,
    pub to: String,
    pub subject: String,
    pub body: String,
}

/// Outbound mail hook (SMTP relay, provider API, or a log sink in development).
pub trait Mailer: Send + Sync {
    fn send(&self, message: &EmailMessage) -> Result<(), MailError>;
}

/// Mail dispatch error.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MailError {
    #[error("mail transport unavailable: {0}")]
    Transport(String),
    #[error("recipient {0} rejected by transport")]
    Rejected(String),
}
