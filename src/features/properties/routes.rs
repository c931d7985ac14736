use std::sync::Arc;

use axum::{routing::get, Router};

use crate::features::properties::handlers;
use crate::features::properties::services::PropertyService;

/// Read-only routes: public listing pages and the GET side of the REST API
pub fn public_routes(service: Arc<PropertyService>) -> Router {
    Router::new()
        .route("/api/listings", get(handlers::list_listings))
        .route("/api/listings/{id}", get(handlers::get_listing))
        .route("/api/listings/{id}/fiche", get(handlers::get_listing_fiche))
        .route("/api/properties", get(handlers::list_properties))
        .route("/api/properties/search", get(handlers::search_properties))
        .route("/api/properties/filter", get(handlers::filter_properties))
        .route(
            "/api/properties/active",
            get(handlers::list_active_properties),
        )
        .route("/api/properties/{id}", get(handlers::get_property))
        .with_state(service)
}

/// Mutations of the REST API
///
/// Note: This router requires authentication
pub fn protected_routes(service: Arc<PropertyService>) -> Router {
    Router::new()
        .route(
            "/api/properties",
            axum::routing::post(handlers::create_property),
        )
        .route(
            "/api/properties/{id}",
            axum::routing::put(handlers::replace_property)
                .patch(handlers::patch_property)
                .delete(handlers::delete_property),
        )
        .with_state(service)
}
