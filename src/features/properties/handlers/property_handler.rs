use std::collections::BTreeMap;
use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use uuid::Uuid;

use crate::core::error::{AppError, Result};
use crate::core::extractor::{AppJson, AppQuery};
use crate::features::auth::model::AuthenticatedUser;
use crate::features::properties::dtos::{
    CreatePropertyDto, FieldMatch, PropertyDto, SearchQuery, UpdatePropertyDto,
};
use crate::features::properties::services::PropertyService;
use crate::shared::types::{ApiResponse, Meta, PaginationQuery};

fn list_response(items: Vec<PropertyDto>) -> Json<ApiResponse<Vec<PropertyDto>>> {
    let total = items.len() as i64;
    Json(ApiResponse::success(Some(items), None, Some(Meta { total })))
}

/// List all properties (paginated, newest first)
#[utoipa::path(
    get,
    path = "/api/properties",
    params(PaginationQuery),
    responses(
        (status = 200, description = "Properties", body = ApiResponse<Vec<PropertyDto>>)
    ),
    tag = "properties"
)]
pub async fn list_properties(
    State(service): State<Arc<PropertyService>>,
    AppQuery(params): AppQuery<PaginationQuery>,
) -> Result<Json<ApiResponse<Vec<PropertyDto>>>> {
    let (items, total) = service.list_all(params.offset(), params.limit()).await?;
    Ok(Json(ApiResponse::success(
        Some(items),
        None,
        Some(Meta { total }),
    )))
}

/// Get a property by ID
#[utoipa::path(
    get,
    path = "/api/properties/{id}",
    params(("id" = Uuid, Path, description = "Property ID")),
    responses(
        (status = 200, description = "Property found", body = ApiResponse<PropertyDto>),
        (status = 404, description = "Property not found")
    ),
    tag = "properties"
)]
pub async fn get_property(
    State(service): State<Arc<PropertyService>>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<PropertyDto>>> {
    let property = service.get(id).await?;
    Ok(Json(ApiResponse::success(Some(property), None, None)))
}

/// Search properties by title, description or address
#[utoipa::path(
    get,
    path = "/api/properties/search",
    params(SearchQuery),
    responses(
        (status = 200, description = "Matching properties", body = ApiResponse<Vec<PropertyDto>>),
        (status = 400, description = "Missing search text")
    ),
    tag = "properties"
)]
pub async fn search_properties(
    State(service): State<Arc<PropertyService>>,
    AppQuery(params): AppQuery<SearchQuery>,
) -> Result<Json<ApiResponse<Vec<PropertyDto>>>> {
    let q = params.q.unwrap_or_default();
    let items = service.search(&q).await?;
    Ok(list_response(items))
}

/// Exact-match filter on any combination of fields
///
/// Allowed fields: title, status, municipality, state, postal_code,
/// bedrooms, bathrooms, surface_m2, price.
#[utoipa::path(
    get,
    path = "/api/properties/filter",
    params(
        ("params" = BTreeMap<String, String>, Query, style = Form, explode,
            description = "field=value pairs, e.g. ?state=Jalisco&bedrooms=3")
    ),
    responses(
        (status = 200, description = "Matching properties", body = ApiResponse<Vec<PropertyDto>>),
        (status = 400, description = "Unknown field or invalid value")
    ),
    tag = "properties"
)]
pub async fn filter_properties(
    State(service): State<Arc<PropertyService>>,
    AppQuery(params): AppQuery<BTreeMap<String, String>>,
) -> Result<Json<ApiResponse<Vec<PropertyDto>>>> {
    let matches = FieldMatch::parse_all(params).map_err(AppError::BadRequest)?;
    let items = service.filter(&matches).await?;
    Ok(list_response(items))
}

/// Properties currently for sale
#[utoipa::path(
    get,
    path = "/api/properties/active",
    responses(
        (status = 200, description = "Properties for sale", body = ApiResponse<Vec<PropertyDto>>)
    ),
    tag = "properties"
)]
pub async fn list_active_properties(
    State(service): State<Arc<PropertyService>>,
) -> Result<Json<ApiResponse<Vec<PropertyDto>>>> {
    let items = service.list_active().await?;
    Ok(list_response(items))
}

/// Create a property
///
/// Coordinates are looked up from the address when omitted. A failed
/// lookup does not block the save.
#[utoipa::path(
    post,
    path = "/api/properties",
    request_body = CreatePropertyDto,
    responses(
        (status = 201, description = "Property created", body = ApiResponse<PropertyDto>),
        (status = 400, description = "Validation error"),
        (status = 401, description = "Authentication required")
    ),
    security(("bearer_auth" = [])),
    tag = "properties"
)]
pub async fn create_property(
    user: AuthenticatedUser,
    State(service): State<Arc<PropertyService>>,
    AppJson(dto): AppJson<CreatePropertyDto>,
) -> Result<(StatusCode, Json<ApiResponse<PropertyDto>>)> {
    tracing::debug!("Property create requested by {}", user.username);
    let property = service.create(dto.into()).await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(Some(property), None, None)),
    ))
}

/// Replace every writable field of a property
#[utoipa::path(
    put,
    path = "/api/properties/{id}",
    params(("id" = Uuid, Path, description = "Property ID")),
    request_body = CreatePropertyDto,
    responses(
        (status = 200, description = "Property updated", body = ApiResponse<PropertyDto>),
        (status = 400, description = "Validation error"),
        (status = 404, description = "Property not found")
    ),
    security(("bearer_auth" = [])),
    tag = "properties"
)]
pub async fn replace_property(
    _user: AuthenticatedUser,
    State(service): State<Arc<PropertyService>>,
    Path(id): Path<Uuid>,
    AppJson(dto): AppJson<CreatePropertyDto>,
) -> Result<Json<ApiResponse<PropertyDto>>> {
    let property = service.replace(id, dto.into()).await?;
    Ok(Json(ApiResponse::success(Some(property), None, None)))
}

/// Update some fields of a property
#[utoipa::path(
    patch,
    path = "/api/properties/{id}",
    params(("id" = Uuid, Path, description = "Property ID")),
    request_body = UpdatePropertyDto,
    responses(
        (status = 200, description = "Property updated", body = ApiResponse<PropertyDto>),
        (status = 400, description = "Validation error"),
        (status = 404, description = "Property not found")
    ),
    security(("bearer_auth" = [])),
    tag = "properties"
)]
pub async fn patch_property(
    _user: AuthenticatedUser,
    State(service): State<Arc<PropertyService>>,
    Path(id): Path<Uuid>,
    AppJson(dto): AppJson<UpdatePropertyDto>,
) -> Result<Json<ApiResponse<PropertyDto>>> {
    let property = service.patch(id, dto).await?;
    Ok(Json(ApiResponse::success(Some(property), None, None)))
}

/// Delete a property and its image links
#[utoipa::path(
    delete,
    path = "/api/properties/{id}",
    params(("id" = Uuid, Path, description = "Property ID")),
    responses(
        (status = 204, description = "Property deleted"),
        (status = 404, description = "Property not found")
    ),
    security(("bearer_auth" = [])),
    tag = "properties"
)]
pub async fn delete_property(
    _user: AuthenticatedUser,
    State(service): State<Arc<PropertyService>>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode> {
    service.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
