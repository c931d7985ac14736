use std::sync::Arc;

use sqlx::{PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use crate::core::error::{AppError, Result};
use crate::features::gallery::GalleryService;
use crate::features::properties::dtos::{
    FieldMatch, LatestMovementDto, ListingQuery, PropertyDto, PropertyFicheDto,
    UpdatePropertyDto,
};
use crate::features::properties::models::{
    Property, PropertyDraft, PropertyStatus, PROPERTY_COLUMNS,
};
use crate::features::properties::services::geocoding_service::{
    fill_missing_coordinates, Geocoder,
};

/// `%value%` for ILIKE, with LIKE wildcards in the input taken literally
pub(crate) fn contains_pattern(value: &str) -> String {
    let escaped = value
        .trim()
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("%{}%", escaped)
}

/// Appends ` AND (title ILIKE .. OR description ILIKE .. OR address ILIKE ..)`
fn push_text_match(qb: &mut QueryBuilder<'_, Postgres>, text: &str) {
    let pattern = contains_pattern(text);
    qb.push(" AND (title ILIKE ")
        .push_bind(pattern.clone())
        .push(" OR description ILIKE ")
        .push_bind(pattern.clone())
        .push(" OR address ILIKE ")
        .push_bind(pattern)
        .push(")");
}

fn select_properties<'a>() -> QueryBuilder<'a, Postgres> {
    QueryBuilder::new(format!(
        "SELECT {} FROM properties WHERE TRUE",
        PROPERTY_COLUMNS
    ))
}

/// Service for property listings: reads, searches and the save pipeline
pub struct PropertyService {
    pool: PgPool,
    gallery: Arc<GalleryService>,
    geocoder: Option<Arc<dyn Geocoder>>,
}

impl PropertyService {
    /// `geocoder` is `None` when geocoding is disabled
    pub fn new(
        pool: PgPool,
        gallery: Arc<GalleryService>,
        geocoder: Option<Arc<dyn Geocoder>>,
    ) -> Self {
        Self {
            pool,
            gallery,
            geocoder,
        }
    }

    // =========================================================================
    // READS
    // =========================================================================

    /// For-sale properties matching the listing filters, newest first
    pub async fn list_for_sale(&self, filters: &ListingQuery) -> Result<Vec<PropertyDto>> {
        let mut qb = select_properties();
        qb.push(" AND status = ").push_bind(PropertyStatus::ForSale);

        if let Some(municipality) = &filters.municipality {
            qb.push(" AND municipality ILIKE ")
                .push_bind(contains_pattern(municipality));
        }
        if let Some(state) = &filters.state {
            qb.push(" AND state ILIKE ").push_bind(contains_pattern(state));
        }
        if let Some(postal_code) = &filters.postal_code {
            qb.push(" AND postal_code ILIKE ")
                .push_bind(contains_pattern(postal_code));
        }
        if let Some(bedrooms) = filters.bedrooms {
            qb.push(" AND bedrooms = ").push_bind(bedrooms);
        }
        if let Some(bathrooms) = filters.bathrooms {
            qb.push(" AND bathrooms = ").push_bind(bathrooms);
        }
        if let Some(min_price) = filters.min_price {
            qb.push(" AND price >= ").push_bind(min_price);
        }
        if let Some(max_price) = filters.max_price {
            qb.push(" AND price <= ").push_bind(max_price);
        }
        if let Some(q) = &filters.q {
            push_text_match(&mut qb, q);
        }
        qb.push(" ORDER BY published_at DESC, id DESC");

        let rows = qb
            .build_query_as::<Property>()
            .fetch_all(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to list properties for sale: {:?}", e);
                AppError::Database(e)
            })?;

        self.attach_images(rows).await
    }

    /// Most recently published properties of any status
    pub async fn latest_movements(&self, limit: i64) -> Result<Vec<LatestMovementDto>> {
        let rows = sqlx::query_as::<_, Property>(&format!(
            "SELECT {} FROM properties ORDER BY published_at DESC, id DESC LIMIT $1",
            PROPERTY_COLUMNS
        ))
        .bind(limit)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to load latest movements: {:?}", e);
            AppError::Database(e)
        })?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    /// All properties, newest first, with the total count
    pub async fn list_all(&self, offset: i64, limit: i64) -> Result<(Vec<PropertyDto>, i64)> {
        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM properties")
            .fetch_one(&self.pool)
            .await?;

        let rows = sqlx::query_as::<_, Property>(&format!(
            "SELECT {} FROM properties ORDER BY published_at DESC, id DESC OFFSET $1 LIMIT $2",
            PROPERTY_COLUMNS
        ))
        .bind(offset)
        .bind(limit)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to list properties: {:?}", e);
            AppError::Database(e)
        })?;

        Ok((self.attach_images(rows).await?, total))
    }

    /// Properties currently for sale
    pub async fn list_active(&self) -> Result<Vec<PropertyDto>> {
        self.list_for_sale(&ListingQuery::default()).await
    }

    /// Case-insensitive text search across every status
    pub async fn search(&self, q: &str) -> Result<Vec<PropertyDto>> {
        if q.trim().is_empty() {
            return Err(AppError::BadRequest(
                "Query parameter 'q' is required".to_string(),
            ));
        }

        let mut qb = select_properties();
        push_text_match(&mut qb, q);
        qb.push(" ORDER BY published_at DESC, id DESC");

        let rows = qb
            .build_query_as::<Property>()
            .fetch_all(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to search properties: {:?}", e);
                AppError::Database(e)
            })?;

        self.attach_images(rows).await
    }

    /// Exact match on every given field; no fields returns everything
    pub async fn filter(&self, matches: &[FieldMatch]) -> Result<Vec<PropertyDto>> {
        let mut qb = select_properties();
        for m in matches {
            qb.push(format!(" AND {} = ", m.column()));
            match m {
                FieldMatch::Title(v)
                | FieldMatch::Municipality(v)
                | FieldMatch::State(v)
                | FieldMatch::PostalCode(v) => {
                    qb.push_bind(v.clone());
                }
                FieldMatch::Status(v) => {
                    qb.push_bind(*v);
                }
                FieldMatch::Bedrooms(v) | FieldMatch::Bathrooms(v) | FieldMatch::SurfaceM2(v) => {
                    qb.push_bind(*v);
                }
                FieldMatch::Price(v) => {
                    qb.push_bind(*v);
                }
            }
        }
        qb.push(" ORDER BY published_at DESC, id DESC");

        let rows = qb
            .build_query_as::<Property>()
            .fetch_all(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to filter properties: {:?}", e);
                AppError::Database(e)
            })?;

        self.attach_images(rows).await
    }

    /// Property detail with its images
    pub async fn get(&self, id: Uuid) -> Result<PropertyDto> {
        let property = self.find(id).await?;
        let mut images = self.gallery.images_for_properties(&[id]).await?;
        Ok(PropertyDto::with_images(
            property,
            images.remove(&id).unwrap_or_default(),
        ))
    }

    /// Data of the technical sheet of one property
    pub async fn fiche(&self, id: Uuid) -> Result<PropertyFicheDto> {
        let property = self.get(id).await?;
        Ok(PropertyFicheDto::new(property))
    }

    // =========================================================================
    // WRITES
    // =========================================================================

    pub async fn create(&self, draft: PropertyDraft) -> Result<PropertyDto> {
        let draft = self.prepare(draft).await?;

        let property = sqlx::query_as::<_, Property>(&format!(
            r#"
            INSERT INTO properties (
                id, title, description, price, address, municipality, state,
                postal_code, latitude, longitude, status, bedrooms, bathrooms, surface_m2
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14)
            RETURNING {}
            "#,
            PROPERTY_COLUMNS
        ))
        .bind(Uuid::now_v7())
        .bind(&draft.title)
        .bind(&draft.description)
        .bind(draft.price)
        .bind(&draft.address)
        .bind(&draft.municipality)
        .bind(&draft.state)
        .bind(&draft.postal_code)
        .bind(draft.latitude)
        .bind(draft.longitude)
        .bind(draft.status)
        .bind(draft.bedrooms)
        .bind(draft.bathrooms)
        .bind(draft.surface_m2)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to create property: {:?}", e);
            AppError::Database(e)
        })?;

        tracing::info!(
            "Property created: id={}, title={}, geocoded={}",
            property.id,
            property.title,
            property.latitude.is_some()
        );

        Ok(PropertyDto::with_images(property, Vec::new()))
    }

    /// Full replacement of the writable fields
    pub async fn replace(&self, id: Uuid, draft: PropertyDraft) -> Result<PropertyDto> {
        self.find(id).await?;
        self.save(id, draft).await
    }

    /// Partial update merged onto the stored record, then validated as a whole
    pub async fn patch(&self, id: Uuid, changes: UpdatePropertyDto) -> Result<PropertyDto> {
        let current = self.find(id).await?;
        let mut draft = PropertyDraft::from(&current);
        changes.apply_to(&mut draft);
        self.save(id, draft).await
    }

    pub async fn delete(&self, id: Uuid) -> Result<()> {
        let result = sqlx::query("DELETE FROM properties WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to delete property: {:?}", e);
                AppError::Database(e)
            })?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Property {} not found", id)));
        }

        tracing::info!("Property deleted: id={}", id);
        Ok(())
    }

    // =========================================================================
    // HELPERS
    // =========================================================================

    async fn find(&self, id: Uuid) -> Result<Property> {
        sqlx::query_as::<_, Property>(&format!(
            "SELECT {} FROM properties WHERE id = $1",
            PROPERTY_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Property {} not found", id)))
    }

    /// Normalize, validate, then geocode when coordinates are missing
    async fn prepare(&self, mut draft: PropertyDraft) -> Result<PropertyDraft> {
        draft.normalize();
        draft.validate_full().map_err(AppError::FieldValidation)?;

        if let Some(geocoder) = &self.geocoder {
            fill_missing_coordinates(geocoder.as_ref(), &mut draft).await;
        }

        Ok(draft)
    }

    /// `published_at` is left alone on update
    async fn save(&self, id: Uuid, draft: PropertyDraft) -> Result<PropertyDto> {
        let draft = self.prepare(draft).await?;

        let property = sqlx::query_as::<_, Property>(&format!(
            r#"
            UPDATE properties SET
                title = $2,
                description = $3,
                price = $4,
                address = $5,
                municipality = $6,
                state = $7,
                postal_code = $8,
                latitude = $9,
                longitude = $10,
                status = $11,
                bedrooms = $12,
                bathrooms = $13,
                surface_m2 = $14,
                updated_at = NOW()
            WHERE id = $1
            RETURNING {}
            "#,
            PROPERTY_COLUMNS
        ))
        .bind(id)
        .bind(&draft.title)
        .bind(&draft.description)
        .bind(draft.price)
        .bind(&draft.address)
        .bind(&draft.municipality)
        .bind(&draft.state)
        .bind(&draft.postal_code)
        .bind(draft.latitude)
        .bind(draft.longitude)
        .bind(draft.status)
        .bind(draft.bedrooms)
        .bind(draft.bathrooms)
        .bind(draft.surface_m2)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to update property: {:?}", e);
            AppError::Database(e)
        })?
        .ok_or_else(|| AppError::NotFound(format!("Property {} not found", id)))?;

        tracing::info!("Property updated: id={}", property.id);

        let mut images = self.gallery.images_for_properties(&[id]).await?;
        Ok(PropertyDto::with_images(
            property,
            images.remove(&id).unwrap_or_default(),
        ))
    }

    async fn attach_images(&self, rows: Vec<Property>) -> Result<Vec<PropertyDto>> {
        let ids: Vec<Uuid> = rows.iter().map(|p| p.id).collect();
        let mut images = self.gallery.images_for_properties(&ids).await?;

        Ok(rows
            .into_iter()
            .map(|p| {
                let own = images.remove(&p.id).unwrap_or_default();
                PropertyDto::with_images(p, own)
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use async_trait::async_trait;
    use rust_decimal::Decimal;

    use super::*;
    use crate::features::properties::models::draft_fixtures::draft;
    use crate::features::properties::services::geocoding_service::{
        Coordinates, GeocodingError,
    };
    use crate::shared::test_helpers::lazy_pool;

    #[test]
    fn test_contains_pattern_escapes_wildcards() {
        assert_eq!(contains_pattern(" Zapopan "), "%Zapopan%");
        assert_eq!(contains_pattern("100%"), "%100\\%%");
        assert_eq!(contains_pattern("a_b"), "%a\\_b%");
        assert_eq!(contains_pattern("c:\\x"), "%c:\\\\x%");
    }

    struct FixedGeocoder(Option<Coordinates>);

    #[async_trait]
    impl Geocoder for FixedGeocoder {
        async fn geocode(&self, _query: &str) -> std::result::Result<Coordinates, GeocodingError> {
            self.0.ok_or(GeocodingError::NoResults)
        }
    }

    fn service(pool: PgPool, coords: Option<Coordinates>) -> PropertyService {
        PropertyService::new(
            pool.clone(),
            Arc::new(GalleryService::new(pool)),
            Some(Arc::new(FixedGeocoder(coords))),
        )
    }

    fn zapopan() -> Coordinates {
        Coordinates {
            latitude: Decimal::from_str("20.72000000").unwrap(),
            longitude: Decimal::from_str("-103.39000000").unwrap(),
        }
    }

    #[sqlx::test(migrations = "./migrations")]
    #[ignore = "requires DATABASE_URL"]
    async fn test_create_geocodes_missing_coordinates(pool: PgPool) {
        let created = service(pool, Some(zapopan()))
            .create(draft())
            .await
            .unwrap();

        assert_eq!(created.latitude, Some(zapopan().latitude));
        assert_eq!(created.longitude, Some(zapopan().longitude));
    }

    #[sqlx::test(migrations = "./migrations")]
    #[ignore = "requires DATABASE_URL"]
    async fn test_create_persists_when_geocoding_fails(pool: PgPool) {
        let svc = service(pool, None);
        let created = svc.create(draft()).await.unwrap();

        assert_eq!(created.latitude, None);
        assert_eq!(created.longitude, None);
        assert_eq!(svc.get(created.id).await.unwrap().title, "Casa en Chapalita");
    }

    #[sqlx::test(migrations = "./migrations")]
    #[ignore = "requires DATABASE_URL"]
    async fn test_create_rejects_invalid_draft_with_field_errors(pool: PgPool) {
        let mut d = draft();
        d.postal_code = Some("123".to_string());

        match service(pool, None).create(d).await {
            Err(AppError::FieldValidation(errors)) => assert!(errors.contains_key("postal_code")),
            other => panic!("expected field validation error, got {:?}", other.map(|p| p.id)),
        }
    }

    #[sqlx::test(migrations = "./migrations")]
    #[ignore = "requires DATABASE_URL"]
    async fn test_price_range_filter_is_inclusive(pool: PgPool) {
        let svc = service(pool, None);
        for (title, price) in [
            ("below", "999999.99"),
            ("low edge", "1000000"),
            ("inside", "1500000"),
            ("high edge", "2000000"),
            ("above", "2000000.01"),
        ] {
            let mut d = draft();
            d.title = title.to_string();
            d.price = Decimal::from_str(price).unwrap();
            svc.create(d).await.unwrap();
        }
        let mut sold = draft();
        sold.title = "sold inside".to_string();
        sold.status = PropertyStatus::Sold;
        svc.create(sold).await.unwrap();

        let filters = ListingQuery {
            min_price: Some(Decimal::from(1_000_000)),
            max_price: Some(Decimal::from(2_000_000)),
            ..Default::default()
        };
        let mut titles: Vec<String> = svc
            .list_for_sale(&filters)
            .await
            .unwrap()
            .into_iter()
            .map(|p| p.title)
            .collect();
        titles.sort();

        assert_eq!(titles, vec!["high edge", "inside", "low edge"]);
    }

    #[sqlx::test(migrations = "./migrations")]
    #[ignore = "requires DATABASE_URL"]
    async fn test_patch_keeps_published_at(pool: PgPool) {
        let svc = service(pool, None);
        let created = svc.create(draft()).await.unwrap();

        let changes = UpdatePropertyDto {
            status: Some(PropertyStatus::Sold),
            ..Default::default()
        };
        let updated = svc.patch(created.id, changes).await.unwrap();

        assert_eq!(updated.status, PropertyStatus::Sold);
        assert_eq!(updated.published_at, created.published_at);
    }

    #[sqlx::test(migrations = "./migrations")]
    #[ignore = "requires DATABASE_URL"]
    async fn test_deleting_property_keeps_gallery_images(pool: PgPool) {
        let gallery = Arc::new(GalleryService::new(pool.clone()));
        let svc = PropertyService::new(pool.clone(), gallery.clone(), None);

        let property = svc.create(draft()).await.unwrap();
        let image = gallery
            .upload(crate::features::gallery::models::CreateGalleryImage {
                name: "Facade".to_string(),
                data: vec![0xff, 0xd8, 0xff],
                content_type: "image/jpeg".to_string(),
                category: None,
            })
            .await
            .unwrap();
        gallery
            .attach(
                property.id,
                crate::features::gallery::dtos::AttachImageDto {
                    image_id: image.id,
                    alt_text: None,
                    display_order: None,
                },
            )
            .await
            .unwrap();
        assert_eq!(svc.get(property.id).await.unwrap().images.len(), 1);

        svc.delete(property.id).await.unwrap();

        let links: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM property_images")
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(links, 0);
        assert!(gallery.get(image.id).await.is_ok());
    }

    #[tokio::test]
    async fn test_search_requires_text() {
        assert!(matches!(
            service(lazy_pool(), None).search("  ").await,
            Err(AppError::BadRequest(_))
        ));
    }
}
