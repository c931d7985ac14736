use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};

use crate::features::admin::handlers;
use crate::features::admin::services::AdminService;

/// Create admin routes (all require admin access), nested under `/api/admin`
pub fn routes(admin_service: Arc<AdminService>) -> Router {
    Router::new()
        .route("/properties", get(handlers::list_properties))
        .route(
            "/properties/bulk-delete",
            post(handlers::bulk_delete_properties),
        )
        .route("/properties/mark-sold", post(handlers::mark_properties_sold))
        .route(
            "/gallery/bulk-delete",
            post(handlers::bulk_delete_gallery_images),
        )
        .route(
            "/property-images/bulk-delete",
            post(handlers::bulk_delete_property_images),
        )
        .with_state(admin_service)
}
