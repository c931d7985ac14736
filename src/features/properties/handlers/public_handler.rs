use std::sync::Arc;

use axum::{
    extract::{Path, State},
    Json,
};
use uuid::Uuid;

use crate::core::error::Result;
use crate::core::extractor::AppQuery;
use crate::features::properties::dtos::{ListingPageDto, ListingQuery, PropertyDto, PropertyFicheDto};
use crate::features::properties::services::PropertyService;
use crate::shared::constants::LATEST_MOVEMENTS_LIMIT;
use crate::shared::types::{ApiResponse, Meta};

/// Public listing of properties for sale
///
/// Optional filters narrow the list; the latest movements (any status)
/// are always included.
#[utoipa::path(
    get,
    path = "/api/listings",
    params(ListingQuery),
    responses(
        (status = 200, description = "Properties for sale", body = ApiResponse<ListingPageDto>),
        (status = 400, description = "Invalid filter value")
    ),
    tag = "listings"
)]
pub async fn list_listings(
    State(service): State<Arc<PropertyService>>,
    AppQuery(filters): AppQuery<ListingQuery>,
) -> Result<Json<ApiResponse<ListingPageDto>>> {
    let properties = service.list_for_sale(&filters).await?;
    let latest_movements = service.latest_movements(LATEST_MOVEMENTS_LIMIT).await?;
    let total = properties.len() as i64;

    Ok(Json(ApiResponse::success(
        Some(ListingPageDto {
            properties,
            latest_movements,
            filters,
        }),
        None,
        Some(Meta { total }),
    )))
}

/// Public property detail
#[utoipa::path(
    get,
    path = "/api/listings/{id}",
    params(("id" = Uuid, Path, description = "Property ID")),
    responses(
        (status = 200, description = "Property found", body = ApiResponse<PropertyDto>),
        (status = 404, description = "Property not found")
    ),
    tag = "listings"
)]
pub async fn get_listing(
    State(service): State<Arc<PropertyService>>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<PropertyDto>>> {
    let property = service.get(id).await?;
    Ok(Json(ApiResponse::success(Some(property), None, None)))
}

/// Technical sheet of a property
#[utoipa::path(
    get,
    path = "/api/listings/{id}/fiche",
    params(("id" = Uuid, Path, description = "Property ID")),
    responses(
        (status = 200, description = "Fiche document data", body = ApiResponse<PropertyFicheDto>),
        (status = 404, description = "Property not found")
    ),
    tag = "listings"
)]
pub async fn get_listing_fiche(
    State(service): State<Arc<PropertyService>>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<PropertyFicheDto>>> {
    let fiche = service.fiche(id).await?;
    Ok(Json(ApiResponse::success(Some(fiche), None, None)))
}
