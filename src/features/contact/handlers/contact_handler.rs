use std::sync::Arc;

use axum::{extract::State, Json};
use validator::Validate;

use crate::core::error::{AppError, Result};
use crate::core::extractor::AppJson;
use crate::features::contact::dtos::ContactRequestDto;
use crate::features::contact::services::ContactService;
use crate::shared::types::ApiResponse;
use crate::shared::validation::to_field_errors;

/// Send a message to the office through the contact form
#[utoipa::path(
    post,
    path = "/api/contact",
    request_body = ContactRequestDto,
    responses(
        (status = 200, description = "Message sent"),
        (status = 400, description = "Validation error"),
        (status = 502, description = "The message could not be sent")
    ),
    tag = "contact"
)]
pub async fn submit_contact(
    State(service): State<Arc<ContactService>>,
    AppJson(dto): AppJson<ContactRequestDto>,
) -> Result<Json<ApiResponse<()>>> {
    let dto = dto.normalized();
    dto.validate()
        .map_err(|e| AppError::FieldValidation(to_field_errors(&e)))?;

    service.submit(&dto).await?;

    Ok(Json(ApiResponse::success(
        None,
        Some("Your message has been sent successfully. We will contact you soon.".to_string()),
        None,
    )))
}
