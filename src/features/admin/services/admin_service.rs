use sqlx::{PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use crate::core::error::{AppError, Result};
use crate::features::admin::dtos::*;
use crate::features::properties::models::PropertyStatus;
use crate::features::properties::services::contains_pattern;

/// Service for back-office list views and bulk actions
pub struct AdminService {
    pool: PgPool,
}

fn push_property_filters(qb: &mut QueryBuilder<'_, Postgres>, params: &AdminPropertyQueryParams) {
    qb.push(" WHERE TRUE");
    if let Some(status) = params.status {
        qb.push(" AND p.status = ").push_bind(status);
    }
    if let Some(search) = params.search.as_deref().filter(|s| !s.trim().is_empty()) {
        let pattern = contains_pattern(search);
        qb.push(" AND (p.title ILIKE ")
            .push_bind(pattern.clone())
            .push(" OR p.description ILIKE ")
            .push_bind(pattern)
            .push(")");
    }
}

impl AdminService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    // =========================================================================
    // PROPERTIES
    // =========================================================================

    /// List properties with status and text filters
    pub async fn list_properties(
        &self,
        params: &AdminPropertyQueryParams,
    ) -> Result<(Vec<AdminPropertyDto>, i64)> {
        let mut count = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM properties p");
        push_property_filters(&mut count, params);
        let total: i64 = count
            .build_query_scalar::<i64>()
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to count properties: {:?}", e);
                AppError::Database(e)
            })?;

        let mut qb = QueryBuilder::<Postgres>::new(
            r#"
            SELECT
                p.id, p.title, p.price, p.status, p.municipality, p.state,
                (SELECT COUNT(*) FROM property_images pi WHERE pi.property_id = p.id) AS image_count,
                p.published_at
            FROM properties p
            "#,
        );
        push_property_filters(&mut qb, params);
        qb.push(format!(
            " ORDER BY p.published_at {}, p.id {}",
            params.sort.as_sql(),
            params.sort.as_sql()
        ));
        qb.push(" OFFSET ")
            .push_bind(params.offset())
            .push(" LIMIT ")
            .push_bind(params.limit());

        let items = qb
            .build_query_as::<AdminPropertyDto>()
            .fetch_all(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to list properties: {:?}", e);
                AppError::Database(e)
            })?;

        Ok((items, total))
    }

    /// Delete the selected properties; their image links cascade
    pub async fn bulk_delete_properties(&self, ids: &[Uuid]) -> Result<BulkActionResultDto> {
        let affected = self
            .execute_for_ids("DELETE FROM properties WHERE id = ANY($1)", ids)
            .await?;
        tracing::info!("Bulk delete: {} property(ies) removed", affected);
        Ok(BulkActionResultDto::new(affected, "property(ies)", "deleted"))
    }

    /// Mark the selected properties as sold
    pub async fn mark_sold(&self, ids: &[Uuid]) -> Result<BulkActionResultDto> {
        let result = sqlx::query(
            "UPDATE properties SET status = $2, updated_at = NOW() WHERE id = ANY($1)",
        )
        .bind(ids)
        .bind(PropertyStatus::Sold)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to mark properties as sold: {:?}", e);
            AppError::Database(e)
        })?;

        let affected = result.rows_affected();
        tracing::info!("Bulk update: {} property(ies) marked as sold", affected);
        Ok(BulkActionResultDto::new(
            affected,
            "property(ies)",
            "marked as sold",
        ))
    }

    // =========================================================================
    // GALLERY
    // =========================================================================

    /// Delete the selected gallery images together with the links to them
    pub async fn bulk_delete_gallery_images(&self, ids: &[Uuid]) -> Result<BulkActionResultDto> {
        let affected = self
            .execute_for_ids("DELETE FROM gallery_images WHERE id = ANY($1)", ids)
            .await?;
        tracing::info!("Bulk delete: {} gallery image(s) removed", affected);
        Ok(BulkActionResultDto::new(affected, "image(s)", "deleted"))
    }

    /// Remove the selected property-image links; gallery images stay
    pub async fn bulk_delete_property_images(
        &self,
        ids: &[Uuid],
    ) -> Result<BulkActionResultDto> {
        let affected = self
            .execute_for_ids("DELETE FROM property_images WHERE id = ANY($1)", ids)
            .await?;
        tracing::info!("Bulk delete: {} property image link(s) removed", affected);
        Ok(BulkActionResultDto::new(affected, "image link(s)", "removed"))
    }

    async fn execute_for_ids(&self, sql: &str, ids: &[Uuid]) -> Result<u64> {
        let result = sqlx::query(sql)
            .bind(ids)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Bulk action failed: {:?}", e);
                AppError::Database(e)
            })?;
        Ok(result.rows_affected())
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use rust_decimal::Decimal;

    use super::*;

    async fn insert_property(pool: &PgPool, title: &str) -> Uuid {
        let id = Uuid::now_v7();
        sqlx::query("INSERT INTO properties (id, title, price) VALUES ($1, $2, $3)")
            .bind(id)
            .bind(title)
            .bind(Decimal::from_str("1250000").unwrap())
            .execute(pool)
            .await
            .unwrap();
        id
    }

    fn params(status: Option<PropertyStatus>, search: Option<&str>) -> AdminPropertyQueryParams {
        AdminPropertyQueryParams {
            page: 1,
            page_size: 20,
            status,
            search: search.map(str::to_string),
            sort: SortDirection::Desc,
        }
    }

    #[sqlx::test(migrations = "./migrations")]
    #[ignore = "requires DATABASE_URL"]
    async fn test_mark_sold_and_filter_by_status(pool: PgPool) {
        let a = insert_property(&pool, "Casa A").await;
        let _b = insert_property(&pool, "Casa B").await;
        let svc = AdminService::new(pool);

        let result = svc.mark_sold(&[a, Uuid::now_v7()]).await.unwrap();
        assert_eq!(result.affected, 1);
        assert_eq!(result.message, "1 property(ies) marked as sold");

        let (sold, total) = svc
            .list_properties(&params(Some(PropertyStatus::Sold), None))
            .await
            .unwrap();
        assert_eq!(total, 1);
        assert_eq!(sold[0].id, a);

        let (found, _) = svc
            .list_properties(&params(None, Some("casa b")))
            .await
            .unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].title, "Casa B");
    }

    #[sqlx::test(migrations = "./migrations")]
    #[ignore = "requires DATABASE_URL"]
    async fn test_bulk_delete_properties(pool: PgPool) {
        let a = insert_property(&pool, "Casa A").await;
        let b = insert_property(&pool, "Casa B").await;
        let svc = AdminService::new(pool);

        let result = svc.bulk_delete_properties(&[a, b]).await.unwrap();
        assert_eq!(result.message, "2 property(ies) deleted");

        let (_, total) = svc.list_properties(&params(None, None)).await.unwrap();
        assert_eq!(total, 0);
    }
}
