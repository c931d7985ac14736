use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::shared::validation::SINGLE_LINE_REGEX;

/// Request DTO for the public contact form
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct ContactRequestDto {
    #[validate(
        length(min = 1, max = 255, message = "Name must be 1-255 characters"),
        regex(path = *SINGLE_LINE_REGEX, message = "Name must not contain line breaks or control characters")
    )]
    #[schema(example = "María López")]
    pub name: String,

    #[validate(email(message = "Invalid email format"))]
    #[schema(example = "maria@example.com")]
    pub email: String,

    #[validate(length(min = 1, max = 5000, message = "Message must be 1-5000 characters"))]
    pub message: String,
}

impl ContactRequestDto {
    /// Strip surrounding whitespace so blank fields fail the length rules
    pub fn normalized(self) -> Self {
        Self {
            name: self.name.trim().to_string(),
            email: self.email.trim().to_string(),
            message: self.message.trim().to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request() -> ContactRequestDto {
        ContactRequestDto {
            name: "María López".to_string(),
            email: "maria@example.com".to_string(),
            message: "I would like to visit the house on Saturday.".to_string(),
        }
    }

    #[test]
    fn test_valid_request() {
        assert!(request().validate().is_ok());
    }

    #[test]
    fn test_rejects_bad_email_and_empty_message() {
        let mut r = request();
        r.email = "not-an-email".to_string();
        r.message = String::new();

        let errors = r.validate().unwrap_err();
        let fields = errors.field_errors();
        assert!(fields.contains_key("email"));
        assert!(fields.contains_key("message"));
        assert!(!fields.contains_key("name"));
    }

    #[test]
    fn test_whitespace_only_fields_are_rejected_after_normalizing() {
        let mut r = request();
        r.name = "   ".to_string();
        r.message = "\n\t ".to_string();

        let errors = r.normalized().validate().unwrap_err();
        let fields = errors.field_errors();
        assert!(fields.contains_key("name"));
        assert!(fields.contains_key("message"));
    }

    #[test]
    fn test_normalized_trims_padding() {
        let mut r = request();
        r.name = "  María López ".to_string();
        r.email = " maria@example.com\n".to_string();

        let r = r.normalized();
        assert_eq!(r.name, "María López");
        assert_eq!(r.email, "maria@example.com");
        assert!(r.validate().is_ok());
    }

    #[test]
    fn test_name_with_line_break_is_rejected() {
        let mut r = request();
        r.name = "Ana\r\nBcc: spam@example.com".to_string();

        let errors = r.normalized().validate().unwrap_err();
        let fields = errors.field_errors();
        assert!(fields["name"]
            .iter()
            .any(|e| e.message.as_deref() == Some("Name must not contain line breaks or control characters")));
    }

    #[test]
    fn test_message_may_span_lines() {
        let mut r = request();
        r.message = "Hello,\r\nis it still available?".to_string();
        assert!(r.normalized().validate().is_ok());
    }
}
