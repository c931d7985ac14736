use std::sync::Arc;

use axum::{
    extract::DefaultBodyLimit,
    routing::{delete, get, post},
    Router,
};

use crate::features::gallery::handlers;
use crate::features::gallery::services::GalleryService;
use crate::shared::constants::MAX_IMAGE_SIZE;

/// Gallery management routes (admin only, mounted behind the JWT layer)
pub fn routes(service: Arc<GalleryService>) -> Router {
    Router::new()
        .route(
            "/api/admin/gallery",
            post(handlers::upload_image)
                .layer(DefaultBodyLimit::max(MAX_IMAGE_SIZE + 1024 * 1024))
                .get(handlers::list_images),
        )
        .route(
            "/api/admin/gallery/{id}",
            get(handlers::get_image).delete(handlers::delete_image),
        )
        .route(
            "/api/admin/properties/{id}/images",
            post(handlers::attach_image),
        )
        .route(
            "/api/admin/property-images/{id}",
            delete(handlers::delete_property_image),
        )
        .with_state(service)
}
