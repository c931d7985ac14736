use axum::{extract::State, Json};
use std::sync::Arc;

use crate::core::error::AppError;
use crate::features::auth::guards::RequireAdmin;
use crate::features::dashboard::dtos::*;
use crate::features::dashboard::services::DashboardService;
use crate::shared::types::ApiResponse;

/// Property counts by status and by price range
#[utoipa::path(
    get,
    path = "/api/dashboard",
    tag = "Dashboard",
    responses(
        (status = 200, description = "Dashboard aggregates", body = ApiResponse<DashboardDto>),
        (status = 401, description = "Authentication required")
    ),
    security(("bearer_auth" = []))
)]
pub async fn get_dashboard(
    RequireAdmin(_user): RequireAdmin,
    State(service): State<Arc<DashboardService>>,
) -> Result<Json<ApiResponse<DashboardDto>>, AppError> {
    let dashboard = service.get_dashboard().await?;
    Ok(Json(ApiResponse::success(Some(dashboard), None, None)))
}

/// Sales report: every property grouped by status with price totals
#[utoipa::path(
    get,
    path = "/api/dashboard/sales-report",
    tag = "Dashboard",
    responses(
        (status = 200, description = "Sales report data", body = ApiResponse<SalesReportDto>),
        (status = 401, description = "Authentication required")
    ),
    security(("bearer_auth" = []))
)]
pub async fn get_sales_report(
    RequireAdmin(_user): RequireAdmin,
    State(service): State<Arc<DashboardService>>,
) -> Result<Json<ApiResponse<SalesReportDto>>, AppError> {
    let report = service.get_sales_report().await?;
    Ok(Json(ApiResponse::success(Some(report), None, None)))
}
