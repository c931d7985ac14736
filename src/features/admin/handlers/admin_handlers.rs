use std::sync::Arc;

use axum::{extract::State, Json};
use validator::Validate;

use crate::core::error::{AppError, Result};
use crate::core::extractor::{AppJson, AppQuery};
use crate::features::admin::dtos::*;
use crate::features::admin::services::AdminService;
use crate::features::auth::guards::RequireAdmin;
use crate::shared::types::{ApiResponse, Meta};

fn validated(dto: BulkIdsDto) -> Result<Vec<uuid::Uuid>> {
    dto.validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;
    Ok(dto.ids)
}

fn bulk_response(result: BulkActionResultDto) -> Json<ApiResponse<BulkActionResultDto>> {
    let message = result.message.clone();
    Json(ApiResponse::success(Some(result), Some(message), None))
}

/// List properties with status and text filters (paginated)
#[utoipa::path(
    get,
    path = "/api/admin/properties",
    params(AdminPropertyQueryParams),
    responses(
        (status = 200, description = "List of properties", body = ApiResponse<Vec<AdminPropertyDto>>),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden - Admin access required")
    ),
    tag = "admin",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn list_properties(
    RequireAdmin(_user): RequireAdmin,
    State(service): State<Arc<AdminService>>,
    AppQuery(params): AppQuery<AdminPropertyQueryParams>,
) -> Result<Json<ApiResponse<Vec<AdminPropertyDto>>>> {
    let (items, total) = service.list_properties(&params).await?;

    Ok(Json(ApiResponse::success(
        Some(items),
        None,
        Some(Meta { total }),
    )))
}

/// Delete the selected properties
#[utoipa::path(
    post,
    path = "/api/admin/properties/bulk-delete",
    request_body = BulkIdsDto,
    responses(
        (status = 200, description = "Properties deleted", body = ApiResponse<BulkActionResultDto>),
        (status = 400, description = "Empty selection"),
        (status = 401, description = "Unauthorized")
    ),
    tag = "admin",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn bulk_delete_properties(
    RequireAdmin(_user): RequireAdmin,
    State(service): State<Arc<AdminService>>,
    AppJson(dto): AppJson<BulkIdsDto>,
) -> Result<Json<ApiResponse<BulkActionResultDto>>> {
    let ids = validated(dto)?;
    let result = service.bulk_delete_properties(&ids).await?;
    Ok(bulk_response(result))
}

/// Mark the selected properties as sold
#[utoipa::path(
    post,
    path = "/api/admin/properties/mark-sold",
    request_body = BulkIdsDto,
    responses(
        (status = 200, description = "Properties updated", body = ApiResponse<BulkActionResultDto>),
        (status = 400, description = "Empty selection"),
        (status = 401, description = "Unauthorized")
    ),
    tag = "admin",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn mark_properties_sold(
    RequireAdmin(_user): RequireAdmin,
    State(service): State<Arc<AdminService>>,
    AppJson(dto): AppJson<BulkIdsDto>,
) -> Result<Json<ApiResponse<BulkActionResultDto>>> {
    let ids = validated(dto)?;
    let result = service.mark_sold(&ids).await?;
    Ok(bulk_response(result))
}

/// Delete the selected gallery images
#[utoipa::path(
    post,
    path = "/api/admin/gallery/bulk-delete",
    request_body = BulkIdsDto,
    responses(
        (status = 200, description = "Images deleted", body = ApiResponse<BulkActionResultDto>),
        (status = 400, description = "Empty selection"),
        (status = 401, description = "Unauthorized")
    ),
    tag = "admin",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn bulk_delete_gallery_images(
    RequireAdmin(_user): RequireAdmin,
    State(service): State<Arc<AdminService>>,
    AppJson(dto): AppJson<BulkIdsDto>,
) -> Result<Json<ApiResponse<BulkActionResultDto>>> {
    let ids = validated(dto)?;
    let result = service.bulk_delete_gallery_images(&ids).await?;
    Ok(bulk_response(result))
}

/// Remove the selected property-image links
#[utoipa::path(
    post,
    path = "/api/admin/property-images/bulk-delete",
    request_body = BulkIdsDto,
    responses(
        (status = 200, description = "Links removed", body = ApiResponse<BulkActionResultDto>),
        (status = 400, description = "Empty selection"),
        (status = 401, description = "Unauthorized")
    ),
    tag = "admin",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn bulk_delete_property_images(
    RequireAdmin(_user): RequireAdmin,
    State(service): State<Arc<AdminService>>,
    AppJson(dto): AppJson<BulkIdsDto>,
) -> Result<Json<ApiResponse<BulkActionResultDto>>> {
    let ids = validated(dto)?;
    let result = service.bulk_delete_property_images(&ids).await?;
    Ok(bulk_response(result))
}
