use std::sync::Arc;

use axum::{
    extract::{Multipart, Path, State},
    http::StatusCode,
    Json,
};
use tracing::debug;
use uuid::Uuid;
use validator::Validate;

use crate::core::error::{AppError, Result};
use crate::core::extractor::{AppJson, AppQuery};
use crate::features::auth::guards::RequireAdmin;
use crate::features::gallery::dtos::{
    AttachImageDto, GalleryImageDetailDto, GalleryImageDto, PropertyImageLinkDto,
    UploadGalleryImageDto,
};
use crate::features::gallery::models::CreateGalleryImage;
use crate::features::gallery::services::GalleryService;
use crate::shared::constants::{ALLOWED_IMAGE_MIME_TYPES, MAX_IMAGE_SIZE};
use crate::shared::types::{ApiResponse, Meta, PaginationQuery};

/// Upload an image into the central gallery
///
/// Accepts multipart/form-data with:
/// - `file`: the image (required)
/// - `name`: descriptive name (optional, defaults to the file name)
/// - `category`: e.g. exterior, interior, garden (optional)
#[utoipa::path(
    post,
    path = "/api/admin/gallery",
    tag = "gallery",
    request_body(
        content = UploadGalleryImageDto,
        content_type = "multipart/form-data",
    ),
    responses(
        (status = 201, description = "Image stored", body = ApiResponse<GalleryImageDto>),
        (status = 400, description = "Missing file, unsupported type or too large"),
        (status = 401, description = "Authentication required")
    ),
    security(("bearer_auth" = []))
)]
pub async fn upload_image(
    RequireAdmin(_user): RequireAdmin,
    State(service): State<Arc<GalleryService>>,
    mut multipart: Multipart,
) -> Result<(StatusCode, Json<ApiResponse<GalleryImageDto>>)> {
    let mut file_data: Option<Vec<u8>> = None;
    let mut file_name: Option<String> = None;
    let mut content_type: Option<String> = None;
    let mut name: Option<String> = None;
    let mut category: Option<String> = None;

    while let Some(field) = multipart.next_field().await.map_err(|e| {
        debug!("Failed to read multipart field: {}", e);
        AppError::BadRequest(format!("Failed to read multipart data: {}", e))
    })? {
        let field_name = field.name().unwrap_or("").to_string();

        match field_name.as_str() {
            "file" => {
                content_type = field.content_type().map(|s| s.to_string());
                file_name = field.file_name().map(|s| s.to_string());
                let data = field.bytes().await.map_err(|e| {
                    AppError::BadRequest(format!("Failed to read file data: {}", e))
                })?;
                file_data = Some(data.to_vec());
            }
            "name" | "category" => {
                let text = field.text().await.map_err(|e| {
                    AppError::BadRequest(format!("Failed to read {} field: {}", field_name, e))
                })?;
                let text = text.trim().to_string();
                if !text.is_empty() {
                    if field_name == "name" {
                        name = Some(text);
                    } else {
                        category = Some(text);
                    }
                }
            }
            _ => {
                debug!("Ignoring unknown field: {}", field_name);
            }
        }
    }

    let data = file_data
        .filter(|d| !d.is_empty())
        .ok_or_else(|| AppError::BadRequest("Image file is required".to_string()))?;

    if data.len() > MAX_IMAGE_SIZE {
        return Err(AppError::BadRequest(format!(
            "Image too large. Maximum size is {} MB",
            MAX_IMAGE_SIZE / 1024 / 1024
        )));
    }

    let content_type = content_type
        .ok_or_else(|| AppError::BadRequest("Content type is required".to_string()))?;
    if !ALLOWED_IMAGE_MIME_TYPES.contains(&content_type.as_str()) {
        return Err(AppError::BadRequest(format!(
            "Image type '{}' is not allowed. Allowed types: {}",
            content_type,
            ALLOWED_IMAGE_MIME_TYPES.join(", ")
        )));
    }

    let name = name
        .or(file_name)
        .ok_or_else(|| AppError::BadRequest("Image name is required".to_string()))?;
    if name.chars().count() > 255 {
        return Err(AppError::BadRequest(
            "Image name must not exceed 255 characters".to_string(),
        ));
    }
    if category.as_ref().is_some_and(|c| c.chars().count() > 100) {
        return Err(AppError::BadRequest(
            "Category must not exceed 100 characters".to_string(),
        ));
    }

    let image = service
        .upload(CreateGalleryImage {
            name,
            data,
            content_type,
            category,
        })
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(Some(image), None, None)),
    ))
}

/// List gallery images (paginated, ordered by name)
#[utoipa::path(
    get,
    path = "/api/admin/gallery",
    tag = "gallery",
    params(PaginationQuery),
    responses(
        (status = 200, description = "Gallery images", body = ApiResponse<Vec<GalleryImageDto>>),
        (status = 401, description = "Authentication required")
    ),
    security(("bearer_auth" = []))
)]
pub async fn list_images(
    RequireAdmin(_user): RequireAdmin,
    State(service): State<Arc<GalleryService>>,
    AppQuery(params): AppQuery<PaginationQuery>,
) -> Result<Json<ApiResponse<Vec<GalleryImageDto>>>> {
    let (items, total) = service.list(params.offset(), params.limit()).await?;
    Ok(Json(ApiResponse::success(
        Some(items),
        None,
        Some(Meta { total }),
    )))
}

/// Get a gallery image with its inline data URI
#[utoipa::path(
    get,
    path = "/api/admin/gallery/{id}",
    tag = "gallery",
    params(("id" = Uuid, Path, description = "Gallery image ID")),
    responses(
        (status = 200, description = "Gallery image", body = ApiResponse<GalleryImageDetailDto>),
        (status = 404, description = "Gallery image not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn get_image(
    RequireAdmin(_user): RequireAdmin,
    State(service): State<Arc<GalleryService>>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<GalleryImageDetailDto>>> {
    let image = service.get(id).await?;
    Ok(Json(ApiResponse::success(Some(image), None, None)))
}

/// Delete a gallery image (and every link to it)
#[utoipa::path(
    delete,
    path = "/api/admin/gallery/{id}",
    tag = "gallery",
    params(("id" = Uuid, Path, description = "Gallery image ID")),
    responses(
        (status = 204, description = "Deleted"),
        (status = 404, description = "Gallery image not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn delete_image(
    RequireAdmin(_user): RequireAdmin,
    State(service): State<Arc<GalleryService>>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode> {
    service.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Attach a gallery image to a property
#[utoipa::path(
    post,
    path = "/api/admin/properties/{id}/images",
    tag = "gallery",
    params(("id" = Uuid, Path, description = "Property ID")),
    request_body = AttachImageDto,
    responses(
        (status = 201, description = "Image linked", body = ApiResponse<PropertyImageLinkDto>),
        (status = 400, description = "Validation error"),
        (status = 404, description = "Property or gallery image not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn attach_image(
    RequireAdmin(_user): RequireAdmin,
    State(service): State<Arc<GalleryService>>,
    Path(property_id): Path<Uuid>,
    AppJson(dto): AppJson<AttachImageDto>,
) -> Result<(StatusCode, Json<ApiResponse<PropertyImageLinkDto>>)> {
    dto.validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let link = service.attach(property_id, dto).await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(Some(link), None, None)),
    ))
}

/// Remove one image from a property; the gallery image is kept
#[utoipa::path(
    delete,
    path = "/api/admin/property-images/{id}",
    tag = "gallery",
    params(("id" = Uuid, Path, description = "Property image link ID")),
    responses(
        (status = 204, description = "Link removed"),
        (status = 404, description = "Link not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn delete_property_image(
    RequireAdmin(_user): RequireAdmin,
    State(service): State<Arc<GalleryService>>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode> {
    service.delete_link(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
