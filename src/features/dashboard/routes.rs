use axum::{routing::get, Router};
use std::sync::Arc;

use crate::features::dashboard::handlers;
use crate::features::dashboard::services::DashboardService;

/// Create dashboard routes
///
/// Note: This feature requires authentication
pub fn routes(dashboard_service: Arc<DashboardService>) -> Router {
    Router::new()
        .route("/api/dashboard", get(handlers::get_dashboard))
        .route("/api/dashboard/sales-report", get(handlers::get_sales_report))
        .with_state(dashboard_service)
}
