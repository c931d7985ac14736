use std::collections::BTreeMap;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;

use crate::shared::types::ApiResponse;

/// Validation messages keyed by field name
pub type FieldErrors = BTreeMap<String, Vec<String>>;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Validation failed for {} field(s)", .0.len())]
    FieldValidation(FieldErrors),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Internal server error: {0}")]
    Internal(String),

    #[error("Authentication error: {0}")]
    Auth(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("External service error: {0}")]
    ExternalServiceError(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message, errors, field_errors) = match self {
            AppError::Database(ref e) => {
                tracing::error!("Database error: {:?}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Database error occurred".to_string(),
                    None,
                    None,
                )
            }
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg, None, None),
            AppError::Validation(msg) => {
                (StatusCode::BAD_REQUEST, msg.clone(), Some(vec![msg]), None)
            }
            AppError::FieldValidation(fields) => (
                StatusCode::BAD_REQUEST,
                "Validation failed".to_string(),
                None,
                Some(fields),
            ),
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg, None, None),
            AppError::Internal(ref msg) => {
                tracing::error!("Internal error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                    None,
                    None,
                )
            }
            AppError::Auth(msg) => (StatusCode::UNAUTHORIZED, msg, None, None),
            AppError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, msg, None, None),
            AppError::Forbidden(msg) => (StatusCode::FORBIDDEN, msg, None, None),
            AppError::ExternalServiceError(msg) => {
                tracing::error!("External service error: {}", msg);
                (StatusCode::BAD_GATEWAY, msg, None, None)
            }
        };

        let mut response = ApiResponse::<()>::error(Some(message), errors);
        response.field_errors = field_errors;

        (status, Json(response)).into_response()
    }
}

pub type Result<T> = std::result::Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_field_validation_maps_to_bad_request() {
        let mut fields = FieldErrors::new();
        fields.insert(
            "postal_code".to_string(),
            vec!["Postal code must have exactly 5 digits".to_string()],
        );

        let response = AppError::FieldValidation(fields).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_internal_errors_hide_details() {
        let response = AppError::Internal("pool exhausted".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
