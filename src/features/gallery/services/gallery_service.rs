use std::collections::HashMap;

use sqlx::PgPool;
use uuid::Uuid;

use crate::core::error::{AppError, Result};
use crate::features::gallery::dtos::{
    AttachImageDto, GalleryImageDetailDto, GalleryImageDto, PropertyImageDto,
    PropertyImageLinkDto,
};
use crate::features::gallery::models::{
    CreateGalleryImage, CreatePropertyImage, GalleryImage, GalleryImageSummary, PropertyImage,
    PropertyImageWithData,
};

/// Service for the central image gallery and property-image links
pub struct GalleryService {
    pool: PgPool,
}

impl GalleryService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    // =========================================================================
    // GALLERY IMAGES
    // =========================================================================

    /// Store a new image in the gallery
    pub async fn upload(&self, image: CreateGalleryImage) -> Result<GalleryImageDto> {
        let row = sqlx::query_as::<_, GalleryImageSummary>(
            r#"
            INSERT INTO gallery_images (id, name, data, content_type, category)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, name, content_type, category,
                      octet_length(data) AS size_bytes, created_at
            "#,
        )
        .bind(Uuid::now_v7())
        .bind(&image.name)
        .bind(&image.data)
        .bind(&image.content_type)
        .bind(&image.category)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to store gallery image: {:?}", e);
            AppError::Database(e)
        })?;

        tracing::info!(
            "Gallery image stored: id={}, name={}, bytes={}",
            row.id,
            row.name,
            row.size_bytes
        );

        Ok(row.into())
    }

    /// List gallery images ordered by name
    pub async fn list(&self, offset: i64, limit: i64) -> Result<(Vec<GalleryImageDto>, i64)> {
        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM gallery_images")
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to count gallery images: {:?}", e);
                AppError::Database(e)
            })?;

        let rows = sqlx::query_as::<_, GalleryImageSummary>(
            r#"
            SELECT id, name, content_type, category,
                   octet_length(data) AS size_bytes, created_at
            FROM gallery_images
            ORDER BY name, id
            OFFSET $1 LIMIT $2
            "#,
        )
        .bind(offset)
        .bind(limit)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to list gallery images: {:?}", e);
            AppError::Database(e)
        })?;

        Ok((rows.into_iter().map(Into::into).collect(), total))
    }

    /// Get one gallery image with its data URI
    pub async fn get(&self, id: Uuid) -> Result<GalleryImageDetailDto> {
        sqlx::query_as::<_, GalleryImage>(
            r#"
            SELECT id, name, data, content_type, category, created_at
            FROM gallery_images
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to get gallery image: {:?}", e);
            AppError::Database(e)
        })?
        .map(Into::into)
        .ok_or_else(|| AppError::NotFound(format!("Gallery image {} not found", id)))
    }

    /// Delete a gallery image; links pointing at it go with it
    pub async fn delete(&self, id: Uuid) -> Result<()> {
        let result = sqlx::query("DELETE FROM gallery_images WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to delete gallery image: {:?}", e);
                AppError::Database(e)
            })?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Gallery image {} not found", id)));
        }

        tracing::info!("Gallery image deleted: id={}", id);
        Ok(())
    }

    // =========================================================================
    // PROPERTY-IMAGE LINKS
    // =========================================================================

    /// Link a gallery image to a property
    pub async fn attach(&self, property_id: Uuid, dto: AttachImageDto) -> Result<PropertyImageLinkDto> {
        let link = CreatePropertyImage {
            property_id,
            image_id: dto.image_id,
            alt_text: dto.alt_text.filter(|s| !s.trim().is_empty()),
            display_order: dto.display_order.unwrap_or(0),
        };

        let row = sqlx::query_as::<_, PropertyImage>(
            r#"
            INSERT INTO property_images (id, property_id, image_id, alt_text, display_order)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, property_id, image_id, alt_text, display_order
            "#,
        )
        .bind(Uuid::now_v7())
        .bind(link.property_id)
        .bind(link.image_id)
        .bind(&link.alt_text)
        .bind(link.display_order)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| link_db_error(e, link.property_id, link.image_id))?;

        tracing::info!(
            "Image {} linked to property {} at position {}",
            row.image_id,
            row.property_id,
            row.display_order
        );

        Ok(row.into())
    }

    /// Remove one link; the gallery image stays
    pub async fn delete_link(&self, id: Uuid) -> Result<()> {
        let result = sqlx::query("DELETE FROM property_images WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to delete property image link: {:?}", e);
                AppError::Database(e)
            })?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!(
                "Property image {} not found",
                id
            )));
        }
        Ok(())
    }

    /// Ordered images for each of the given properties, in one round trip.
    ///
    /// Properties without images are absent from the map.
    pub async fn images_for_properties(
        &self,
        property_ids: &[Uuid],
    ) -> Result<HashMap<Uuid, Vec<PropertyImageDto>>> {
        if property_ids.is_empty() {
            return Ok(HashMap::new());
        }

        let rows = sqlx::query_as::<_, PropertyImageWithData>(
            r#"
            SELECT
                pi.id,
                pi.property_id,
                pi.image_id,
                pi.alt_text,
                pi.display_order,
                gi.name AS image_name,
                gi.content_type,
                gi.data
            FROM property_images pi
            JOIN gallery_images gi ON gi.id = pi.image_id
            WHERE pi.property_id = ANY($1)
            ORDER BY pi.property_id, pi.display_order, pi.id
            "#,
        )
        .bind(property_ids)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to load property images: {:?}", e);
            AppError::Database(e)
        })?;

        Ok(group_by_property(rows))
    }
}

/// Foreign key violations on a new link mean one side is gone
fn link_db_error(e: sqlx::Error, property_id: Uuid, image_id: Uuid) -> AppError {
    if let sqlx::Error::Database(db_err) = &e {
        // PostgreSQL foreign_key_violation
        if db_err.code().as_deref() == Some("23503") {
            if db_err
                .constraint()
                .is_some_and(|c| c.contains("property_id"))
            {
                return AppError::NotFound(format!("Property {} not found", property_id));
            }
            return AppError::NotFound(format!("Gallery image {} not found", image_id));
        }
    }

    tracing::error!("Failed to link image to property: {:?}", e);
    AppError::Database(e)
}

fn group_by_property(rows: Vec<PropertyImageWithData>) -> HashMap<Uuid, Vec<PropertyImageDto>> {
    let mut grouped: HashMap<Uuid, Vec<PropertyImageDto>> = HashMap::new();
    for row in rows {
        grouped.entry(row.property_id).or_default().push(row.into());
    }
    grouped
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(property_id: Uuid, order: i32) -> PropertyImageWithData {
        PropertyImageWithData {
            id: Uuid::now_v7(),
            property_id,
            image_id: Uuid::now_v7(),
            alt_text: None,
            display_order: order,
            image_name: format!("image {}", order),
            content_type: "image/jpeg".to_string(),
            data: vec![0xff, 0xd8],
        }
    }

    async fn insert_property(pool: &PgPool) -> Uuid {
        let id = Uuid::now_v7();
        sqlx::query("INSERT INTO properties (id, title, price) VALUES ($1, $2, $3)")
            .bind(id)
            .bind("Casa Tlaquepaque")
            .bind(rust_decimal::Decimal::from(1_250_000))
            .execute(pool)
            .await
            .unwrap();
        id
    }

    fn attach_dto(image_id: Uuid) -> AttachImageDto {
        AttachImageDto {
            image_id,
            alt_text: Some("Fachada".to_string()),
            display_order: Some(2),
        }
    }

    #[test]
    fn test_link_db_error_passes_other_errors_through() {
        let err = link_db_error(sqlx::Error::RowNotFound, Uuid::now_v7(), Uuid::now_v7());
        assert!(matches!(err, AppError::Database(sqlx::Error::RowNotFound)));
    }

    #[sqlx::test(migrations = "./migrations")]
    #[ignore = "requires DATABASE_URL"]
    async fn test_attach_maps_missing_rows_to_not_found(pool: PgPool) {
        let property_id = insert_property(&pool).await;
        let svc = GalleryService::new(pool);
        let image = svc
            .upload(CreateGalleryImage {
                name: "fachada.jpg".to_string(),
                data: vec![0xff, 0xd8, 0xff],
                content_type: "image/jpeg".to_string(),
                category: None,
            })
            .await
            .unwrap();

        let missing_property = Uuid::now_v7();
        match svc.attach(missing_property, attach_dto(image.id)).await {
            Err(AppError::NotFound(msg)) => {
                assert_eq!(msg, format!("Property {} not found", missing_property))
            }
            other => panic!("expected not found, got {:?}", other),
        }

        let missing_image = Uuid::now_v7();
        match svc.attach(property_id, attach_dto(missing_image)).await {
            Err(AppError::NotFound(msg)) => {
                assert_eq!(msg, format!("Gallery image {} not found", missing_image))
            }
            other => panic!("expected not found, got {:?}", other),
        }

        let link = svc.attach(property_id, attach_dto(image.id)).await.unwrap();
        assert_eq!(link.property_id, property_id);
        assert_eq!(link.display_order, 2);
    }

    #[test]
    fn test_group_by_property_keeps_row_order() {
        let a = Uuid::now_v7();
        let b = Uuid::now_v7();
        let grouped = group_by_property(vec![row(a, 0), row(a, 1), row(b, 5)]);

        assert_eq!(grouped.len(), 2);
        let orders: Vec<i32> = grouped[&a].iter().map(|i| i.display_order).collect();
        assert_eq!(orders, vec![0, 1]);
        assert_eq!(
            grouped[&b][0].src.as_deref(),
            Some("data:image/jpeg;base64,/9g=")
        );
    }
}
