use std::sync::Arc;

use minijinja::{context, Environment};

use crate::core::error::{AppError, Result};
use crate::features::contact::dtos::ContactRequestDto;
use crate::features::contact::services::mailer::{EmailMessage, Mailer};

const BODY_TEMPLATE: &str = "contact_message";

/// Turns contact form submissions into emails for the office
pub struct ContactService {
    mailer: Arc<dyn Mailer>,
    recipient: String,
    templates: Environment<'static>,
}

impl ContactService {
    pub fn new(mailer: Arc<dyn Mailer>, recipient: String) -> Result<Self> {
        let mut templates = Environment::new();
        templates
            .add_template(
                BODY_TEMPLATE,
                include_str!("../../../../templates/email/contact_message.jinja"),
            )
            .map_err(|e| AppError::Internal(format!("Invalid contact email template: {}", e)))?;

        Ok(Self {
            mailer,
            recipient,
            templates,
        })
    }

    /// Build the email for a submission
    pub fn compose(&self, dto: &ContactRequestDto) -> Result<EmailMessage> {
        let body = self
            .templates
            .get_template(BODY_TEMPLATE)
            .and_then(|t| {
                t.render(context! {
                    name => dto.name.trim(),
                    email => dto.email.trim(),
                    message => dto.message.trim(),
                })
            })
            .map_err(|e| AppError::Internal(format!("Failed to render contact email: {}", e)))?;

        Ok(EmailMessage {
            from: dto.email.trim().to_string(),
            to: self.recipient.clone(),
            subject: format!("New contact message from: {}", dto.name.trim()),
            body,
        })
    }

    /// Send the submission to the configured recipient
    pub async fn submit(&self, dto: &ContactRequestDto) -> Result<()> {
        let message = self.compose(dto)?;

        self.mailer.send(&message).await.map_err(|e| {
            tracing::warn!("Contact email from {} failed: {}", message.from, e);
            AppError::ExternalServiceError(format!(
                "There was an error sending the message: {}",
                e
            ))
        })?;

        tracing::info!("Contact message from {} forwarded to {}", message.from, message.to);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use async_trait::async_trait;

    use super::*;
    use crate::features::contact::services::mailer::MailError;

    #[derive(Default)]
    struct RecordingMailer(Mutex<Vec<EmailMessage>>);

    #[async_trait]
    impl Mailer for RecordingMailer {
        async fn send(&self, message: &EmailMessage) -> std::result::Result<(), MailError> {
            self.0.lock().unwrap().push(message.clone());
            Ok(())
        }
    }

    fn request() -> ContactRequestDto {
        ContactRequestDto {
            name: "María López".to_string(),
            email: "maria@example.com".to_string(),
            message: "Is the house in Zapopan still available?".to_string(),
        }
    }

    #[tokio::test]
    async fn test_submit_sends_composed_email() {
        let mailer = Arc::new(RecordingMailer::default());
        let service = ContactService::new(mailer.clone(), "admin@multicasa.com".to_string()).unwrap();

        service.submit(&request()).await.unwrap();

        let sent = mailer.0.lock().unwrap();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].from, "maria@example.com");
        assert_eq!(sent[0].to, "admin@multicasa.com");
        assert_eq!(sent[0].subject, "New contact message from: María López");
        assert!(sent[0].body.contains("Name: María López"));
        assert!(sent[0].body.contains("Email: maria@example.com"));
        assert!(sent[0].body.contains("Is the house in Zapopan still available?"));
    }

    #[tokio::test]
    async fn test_submit_reports_mailer_failure() {
        let service = ContactService::new(
            Arc::new(crate::features::contact::services::LogMailer),
            "admin@multicasa.com".to_string(),
        )
        .unwrap();
        let mut dto = request();
        dto.name = "Ana\r\nBcc: spam@example.com".to_string();

        match service.submit(&dto).await {
            Err(AppError::ExternalServiceError(msg)) => assert_eq!(
                msg,
                "There was an error sending the message: invalid subject header: line breaks are not allowed"
            ),
            other => panic!("expected external service error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_log_mailer_accepts_everything() {
        let service = ContactService::new(
            Arc::new(crate::features::contact::services::LogMailer),
            "admin@multicasa.com".to_string(),
        )
        .unwrap();
        assert!(service.submit(&request()).await.is_ok());
    }
}
