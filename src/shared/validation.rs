use lazy_static::lazy_static;
use regex::Regex;
use validator::ValidationErrors;

use crate::core::error::FieldErrors;

lazy_static! {
    /// Mexican postal code: exactly five ASCII digits
    /// - Valid: "01000", "44100"
    /// - Invalid: "1234", "123456", "12a45", " 12345"
    pub static ref POSTAL_CODE_REGEX: Regex = Regex::new(r"^[0-9]{5}$").unwrap();

    /// Text with no control characters, so no CR/LF either
    /// - Valid: "María López", ""
    /// - Invalid: "Ana\r\nBcc: x", "tab\there"
    pub static ref SINGLE_LINE_REGEX: Regex = Regex::new(r"^\P{Cc}*$").unwrap();
}

/// Flatten `validator` errors into field-keyed messages.
///
/// Falls back to the validator code when a rule carries no message.
pub fn to_field_errors(errors: &ValidationErrors) -> FieldErrors {
    let mut fields = FieldErrors::new();
    for (field, errs) in errors.field_errors() {
        let messages = errs
            .iter()
            .map(|e| {
                e.message
                    .as_ref()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| e.code.to_string())
            })
            .collect::<Vec<_>>();
        fields
            .entry(field.to_string())
            .or_default()
            .extend(messages);
    }
    fields
}

/// Append one message under `field`
pub fn push_field_error(fields: &mut FieldErrors, field: &str, message: impl Into<String>) {
    fields
        .entry(field.to_string())
        .or_default()
        .push(message.into());
}

#[cfg(test)]
mod tests {
    use super::*;
    use validator::Validate;

    #[test]
    fn test_postal_code_regex_valid() {
        assert!(POSTAL_CODE_REGEX.is_match("01000"));
        assert!(POSTAL_CODE_REGEX.is_match("44100"));
        assert!(POSTAL_CODE_REGEX.is_match("99999"));
    }

    #[test]
    fn test_postal_code_regex_invalid() {
        assert!(!POSTAL_CODE_REGEX.is_match("1234")); // too short
        assert!(!POSTAL_CODE_REGEX.is_match("123456")); // too long
        assert!(!POSTAL_CODE_REGEX.is_match("12a45")); // letter
        assert!(!POSTAL_CODE_REGEX.is_match(" 12345")); // leading space
        assert!(!POSTAL_CODE_REGEX.is_match("12345\n")); // trailing newline
        assert!(!POSTAL_CODE_REGEX.is_match("١٢٣٤٥")); // non-ASCII digits
        assert!(!POSTAL_CODE_REGEX.is_match(""));
    }

    #[test]
    fn test_single_line_regex() {
        assert!(SINGLE_LINE_REGEX.is_match("María López"));
        assert!(SINGLE_LINE_REGEX.is_match(""));
        assert!(!SINGLE_LINE_REGEX.is_match("Ana\r\nBcc: spam@example.com"));
        assert!(!SINGLE_LINE_REGEX.is_match("Ana\n"));
        assert!(!SINGLE_LINE_REGEX.is_match("tab\there"));
        assert!(!SINGLE_LINE_REGEX.is_match("nul\0"));
    }

    #[derive(Validate)]
    struct Sample {
        #[validate(length(min = 1, message = "Name is required"))]
        name: String,
        #[validate(range(min = 1))]
        rooms: i32,
    }

    #[test]
    fn test_to_field_errors_uses_message_then_code() {
        let sample = Sample {
            name: String::new(),
            rooms: 0,
        };
        let errors = sample.validate().unwrap_err();
        let fields = to_field_errors(&errors);

        assert_eq!(fields["name"], vec!["Name is required".to_string()]);
        assert_eq!(fields["rooms"], vec!["range".to_string()]);
    }
}
