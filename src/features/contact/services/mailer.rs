use async_trait::async_trait;
use thiserror::Error;

/// A plain-text email ready to hand to a transport
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmailMessage {
    pub from: String,
    pub to: String,
    pub subject: String,
    pub body: String,
}

impl EmailMessage {
    /// Header fields must stay on one line
    pub fn check_headers(&self) -> Result<(), MailError> {
        for (header, value) in [("from", &self.from), ("to", &self.to), ("subject", &self.subject)] {
            if value.contains(['\r', '\n']) {
                return Err(MailError::InvalidHeader(header));
            }
        }
        Ok(())
    }
}

#[derive(Debug, Error)]
pub enum MailError {
    #[error("invalid {0} header: line breaks are not allowed")]
    InvalidHeader(&'static str),
}

/// Outbound email transport
#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, message: &EmailMessage) -> Result<(), MailError>;
}

/// Writes every message to the log instead of delivering it
pub struct LogMailer;

#[async_trait]
impl Mailer for LogMailer {
    async fn send(&self, message: &EmailMessage) -> Result<(), MailError> {
        message.check_headers()?;
        tracing::info!(
            from = %message.from,
            to = %message.to,
            subject = %message.subject,
            "Email (log backend)\n{}",
            message.body
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn message() -> EmailMessage {
        EmailMessage {
            from: "maria@example.com".to_string(),
            to: "admin@multicasa.com".to_string(),
            subject: "New contact message from: María".to_string(),
            body: "Line one\nLine two".to_string(),
        }
    }

    #[tokio::test]
    async fn test_log_mailer_allows_multiline_body() {
        assert!(LogMailer.send(&message()).await.is_ok());
    }

    #[tokio::test]
    async fn test_log_mailer_rejects_header_line_breaks() {
        let mut m = message();
        m.subject = "Hi\r\nBcc: spam@example.com".to_string();
        assert!(matches!(
            LogMailer.send(&m).await,
            Err(MailError::InvalidHeader("subject"))
        ));

        let mut m = message();
        m.from = "a@example.com\n".to_string();
        assert!(matches!(m.check_headers(), Err(MailError::InvalidHeader("from"))));
    }
}
