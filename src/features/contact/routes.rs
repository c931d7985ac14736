use std::sync::Arc;

use axum::{routing::post, Router};

use crate::features::contact::handlers;
use crate::features::contact::services::ContactService;

/// Public contact form route
pub fn routes(service: Arc<ContactService>) -> Router {
    Router::new()
        .route("/api/contact", post(handlers::submit_contact))
        .with_state(service)
}
