use sqlx::PgPool;

use crate::core::error::{AppError, Result};
use crate::features::dashboard::dtos::{DashboardCounts, DashboardDto, PriceBucket, SalesReportDto};
use crate::features::properties::models::{Property, PROPERTY_COLUMNS};

/// Service for back-office aggregates, computed fresh on every request
pub struct DashboardService {
    pool: PgPool,
}

impl DashboardService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Counts per status and per price bucket
    pub async fn get_dashboard(&self) -> Result<DashboardDto> {
        let counts = sqlx::query_as::<_, DashboardCounts>(
            r#"
            SELECT
                COUNT(*) AS total,
                COUNT(*) FILTER (WHERE status = 'for_sale') AS for_sale,
                COUNT(*) FILTER (WHERE status = 'sold') AS sold,
                COUNT(*) FILTER (WHERE price < $1) AS under_1m,
                COUNT(*) FILTER (WHERE price >= $1 AND price <= $2) AS from_1m_to_2m,
                COUNT(*) FILTER (WHERE price > $2 AND price <= $3) AS from_2m_to_3m,
                COUNT(*) FILTER (WHERE price > $3) AS over_3m
            FROM properties
            "#,
        )
        .bind(PriceBucket::ONE_MILLION)
        .bind(PriceBucket::TWO_MILLION)
        .bind(PriceBucket::THREE_MILLION)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to compute dashboard counts: {:?}", e);
            AppError::Database(e)
        })?;

        Ok(counts.into())
    }

    /// Every property, for sale first, newest first within each status
    pub async fn get_sales_report(&self) -> Result<SalesReportDto> {
        let rows = sqlx::query_as::<_, Property>(&format!(
            "SELECT {} FROM properties ORDER BY status, published_at DESC, id DESC",
            PROPERTY_COLUMNS
        ))
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to load sales report rows: {:?}", e);
            AppError::Database(e)
        })?;

        Ok(SalesReportDto::from_properties(rows))
    }
}
