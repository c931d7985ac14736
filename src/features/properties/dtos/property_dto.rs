use std::collections::BTreeMap;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use crate::features::gallery::dtos::PropertyImageDto;
use crate::features::properties::models::{Property, PropertyDraft, PropertyStatus};
use crate::shared::serde_helpers::{deserialize_some, empty_string_as_none};

// =============================================================================
// WRITE DTOs
// =============================================================================

/// Request DTO for creating a property, also used for full replacement (PUT)
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CreatePropertyDto {
    #[schema(example = "Casa en Chapalita")]
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[schema(value_type = String, example = "1500000.00")]
    pub price: Decimal,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    #[schema(example = "Zapopan")]
    pub municipality: Option<String>,
    #[serde(default)]
    #[schema(example = "Jalisco")]
    pub state: Option<String>,
    #[serde(default)]
    #[schema(example = "45040")]
    pub postal_code: Option<String>,
    /// Filled in by geocoding when omitted and an address is given
    #[serde(default)]
    #[schema(value_type = Option<String>)]
    pub latitude: Option<Decimal>,
    #[serde(default)]
    #[schema(value_type = Option<String>)]
    pub longitude: Option<Decimal>,
    /// Defaults to `for_sale`
    #[serde(default)]
    pub status: Option<PropertyStatus>,
    #[serde(default)]
    pub bedrooms: Option<i32>,
    #[serde(default)]
    pub bathrooms: Option<i32>,
    #[serde(default)]
    pub surface_m2: Option<i32>,
}

impl From<CreatePropertyDto> for PropertyDraft {
    fn from(dto: CreatePropertyDto) -> Self {
        Self {
            title: dto.title,
            description: dto.description,
            price: dto.price,
            address: dto.address,
            municipality: dto.municipality,
            state: dto.state,
            postal_code: dto.postal_code,
            latitude: dto.latitude,
            longitude: dto.longitude,
            status: dto.status.unwrap_or_default(),
            bedrooms: dto.bedrooms,
            bathrooms: dto.bathrooms,
            surface_m2: dto.surface_m2,
        }
    }
}

/// Request DTO for a partial update (PATCH).
///
/// Absent keys keep the stored value; an explicit `null` clears an
/// optional field.
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct UpdatePropertyDto {
    pub title: Option<String>,
    #[serde(default, deserialize_with = "deserialize_some")]
    #[schema(value_type = Option<String>, nullable)]
    pub description: Option<Option<String>>,
    #[schema(value_type = Option<String>)]
    pub price: Option<Decimal>,
    #[serde(default, deserialize_with = "deserialize_some")]
    #[schema(value_type = Option<String>, nullable)]
    pub address: Option<Option<String>>,
    #[serde(default, deserialize_with = "deserialize_some")]
    #[schema(value_type = Option<String>, nullable)]
    pub municipality: Option<Option<String>>,
    #[serde(default, deserialize_with = "deserialize_some")]
    #[schema(value_type = Option<String>, nullable)]
    pub state: Option<Option<String>>,
    #[serde(default, deserialize_with = "deserialize_some")]
    #[schema(value_type = Option<String>, nullable)]
    pub postal_code: Option<Option<String>>,
    #[serde(default, deserialize_with = "deserialize_some")]
    #[schema(value_type = Option<String>, nullable)]
    pub latitude: Option<Option<Decimal>>,
    #[serde(default, deserialize_with = "deserialize_some")]
    #[schema(value_type = Option<String>, nullable)]
    pub longitude: Option<Option<Decimal>>,
    pub status: Option<PropertyStatus>,
    #[serde(default, deserialize_with = "deserialize_some")]
    #[schema(value_type = Option<i32>, nullable)]
    pub bedrooms: Option<Option<i32>>,
    #[serde(default, deserialize_with = "deserialize_some")]
    #[schema(value_type = Option<i32>, nullable)]
    pub bathrooms: Option<Option<i32>>,
    #[serde(default, deserialize_with = "deserialize_some")]
    #[schema(value_type = Option<i32>, nullable)]
    pub surface_m2: Option<Option<i32>>,
}

impl UpdatePropertyDto {
    /// Merges the provided fields onto a draft of the stored record
    pub fn apply_to(self, draft: &mut PropertyDraft) {
        fn merge<T>(target: &mut T, value: Option<T>) {
            if let Some(v) = value {
                *target = v;
            }
        }

        merge(&mut draft.title, self.title);
        merge(&mut draft.description, self.description);
        merge(&mut draft.price, self.price);
        merge(&mut draft.address, self.address);
        merge(&mut draft.municipality, self.municipality);
        merge(&mut draft.state, self.state);
        merge(&mut draft.postal_code, self.postal_code);
        merge(&mut draft.latitude, self.latitude);
        merge(&mut draft.longitude, self.longitude);
        merge(&mut draft.status, self.status);
        merge(&mut draft.bedrooms, self.bedrooms);
        merge(&mut draft.bathrooms, self.bathrooms);
        merge(&mut draft.surface_m2, self.surface_m2);
    }
}

// =============================================================================
// READ DTOs
// =============================================================================

/// Property with its ordered images
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct PropertyDto {
    pub id: Uuid,
    pub title: String,
    pub description: Option<String>,
    #[schema(value_type = String)]
    pub price: Decimal,
    pub address: Option<String>,
    pub municipality: Option<String>,
    pub state: Option<String>,
    pub postal_code: Option<String>,
    #[schema(value_type = Option<String>)]
    pub latitude: Option<Decimal>,
    #[schema(value_type = Option<String>)]
    pub longitude: Option<Decimal>,
    pub status: PropertyStatus,
    pub status_label: String,
    pub bedrooms: Option<i32>,
    pub bathrooms: Option<i32>,
    pub surface_m2: Option<i32>,
    pub location_label: String,
    pub published_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub images: Vec<PropertyImageDto>,
}

impl PropertyDto {
    pub fn with_images(p: Property, images: Vec<PropertyImageDto>) -> Self {
        let location_label = p.location_label();
        Self {
            id: p.id,
            title: p.title,
            description: p.description,
            price: p.price,
            address: p.address,
            municipality: p.municipality,
            state: p.state,
            postal_code: p.postal_code,
            latitude: p.latitude,
            longitude: p.longitude,
            status: p.status,
            status_label: p.status.label().to_string(),
            bedrooms: p.bedrooms,
            bathrooms: p.bathrooms,
            surface_m2: p.surface_m2,
            location_label,
            published_at: p.published_at,
            updated_at: p.updated_at,
            images,
        }
    }
}

/// Compact entry of the "latest movements" strip
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct LatestMovementDto {
    pub id: Uuid,
    pub title: String,
    #[schema(value_type = String)]
    pub price: Decimal,
    pub status: PropertyStatus,
    pub municipality: Option<String>,
    pub state: Option<String>,
    pub published_at: DateTime<Utc>,
}

impl From<Property> for LatestMovementDto {
    fn from(p: Property) -> Self {
        Self {
            id: p.id,
            title: p.title,
            price: p.price,
            status: p.status,
            municipality: p.municipality,
            state: p.state,
            published_at: p.published_at,
        }
    }
}

/// Public listing page: for-sale properties plus the latest movements
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ListingPageDto {
    pub properties: Vec<PropertyDto>,
    pub latest_movements: Vec<LatestMovementDto>,
    /// Filters as applied, echoed back so clients can keep the form state
    pub filters: ListingQuery,
}

/// Technical sheet of one property
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct PropertyFicheDto {
    /// Suggested file name, `Ficha_Tecnica_Casa_<id>`
    pub document_name: String,
    pub generated_at: DateTime<Utc>,
    pub location_label: String,
    pub property: PropertyDto,
}

impl PropertyFicheDto {
    pub fn new(property: PropertyDto) -> Self {
        Self {
            document_name: format!("Ficha_Tecnica_Casa_{}", property.id),
            generated_at: Utc::now(),
            location_label: property.location_label.clone(),
            property,
        }
    }
}

// =============================================================================
// QUERY PARAMETERS
// =============================================================================

/// Filters of the public for-sale listing. Blank values are ignored.
#[derive(Debug, Clone, Default, Serialize, Deserialize, IntoParams, ToSchema)]
#[into_params(parameter_in = Query)]
pub struct ListingQuery {
    /// Municipality contains (case-insensitive)
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub municipality: Option<String>,
    /// State contains (case-insensitive)
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub state: Option<String>,
    /// Postal code contains
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub postal_code: Option<String>,
    /// Exact number of bedrooms
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub bedrooms: Option<i32>,
    /// Exact number of bathrooms
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub bathrooms: Option<i32>,
    /// Minimum price, inclusive
    #[serde(default, deserialize_with = "empty_string_as_none")]
    #[param(value_type = Option<String>)]
    #[schema(value_type = Option<String>)]
    pub min_price: Option<Decimal>,
    /// Maximum price, inclusive
    #[serde(default, deserialize_with = "empty_string_as_none")]
    #[param(value_type = Option<String>)]
    #[schema(value_type = Option<String>)]
    pub max_price: Option<Decimal>,
    /// Free text over title, description and address
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub q: Option<String>,
}

#[derive(Debug, Clone, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct SearchQuery {
    /// Text to look for in title, description and address
    pub q: Option<String>,
}

/// One exact-match condition of `/api/properties/filter`
#[derive(Debug, Clone, PartialEq)]
pub enum FieldMatch {
    Title(String),
    Status(PropertyStatus),
    Municipality(String),
    State(String),
    PostalCode(String),
    Bedrooms(i32),
    Bathrooms(i32),
    SurfaceM2(i32),
    Price(Decimal),
}

impl FieldMatch {
    pub const FIELDS: [&'static str; 9] = [
        "title",
        "status",
        "municipality",
        "state",
        "postal_code",
        "bedrooms",
        "bathrooms",
        "surface_m2",
        "price",
    ];

    pub fn parse(field: &str, value: &str) -> Result<Self, String> {
        fn number<T: FromStr>(field: &str, value: &str) -> Result<T, String> {
            value
                .trim()
                .parse()
                .map_err(|_| format!("Invalid value '{}' for field '{}'", value, field))
        }

        match field {
            "title" => Ok(Self::Title(value.to_string())),
            "status" => value.parse().map(Self::Status),
            "municipality" => Ok(Self::Municipality(value.to_string())),
            "state" => Ok(Self::State(value.to_string())),
            "postal_code" => Ok(Self::PostalCode(value.to_string())),
            "bedrooms" => number(field, value).map(Self::Bedrooms),
            "bathrooms" => number(field, value).map(Self::Bathrooms),
            "surface_m2" => number(field, value).map(Self::SurfaceM2),
            "price" => number(field, value).map(Self::Price),
            other => Err(format!(
                "Unknown filter field '{}'. Allowed fields: {}",
                other,
                Self::FIELDS.join(", ")
            )),
        }
    }

    /// Parses every query pair, in field-name order
    pub fn parse_all(params: BTreeMap<String, String>) -> Result<Vec<Self>, String> {
        params
            .iter()
            .map(|(field, value)| Self::parse(field, value))
            .collect()
    }

    pub fn column(&self) -> &'static str {
        match self {
            Self::Title(_) => "title",
            Self::Status(_) => "status",
            Self::Municipality(_) => "municipality",
            Self::State(_) => "state",
            Self::PostalCode(_) => "postal_code",
            Self::Bedrooms(_) => "bedrooms",
            Self::Bathrooms(_) => "bathrooms",
            Self::SurfaceM2(_) => "surface_m2",
            Self::Price(_) => "price",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::properties::models::draft_fixtures::draft;

    #[test]
    fn test_create_dto_defaults_status_to_for_sale() {
        let dto: CreatePropertyDto =
            serde_json::from_str(r#"{"title": "Casa", "price": "950000"}"#).unwrap();
        let d = PropertyDraft::from(dto);
        assert_eq!(d.status, PropertyStatus::ForSale);
        assert_eq!(d.price, Decimal::from(950_000));
        assert_eq!(d.latitude, None);
    }

    #[test]
    fn test_patch_keeps_absent_and_clears_null() {
        let patch: UpdatePropertyDto = serde_json::from_str(
            r#"{"price": "2100000", "description": null, "status": "sold"}"#,
        )
        .unwrap();

        let mut d = draft();
        patch.apply_to(&mut d);

        assert_eq!(d.price, Decimal::from(2_100_000));
        assert_eq!(d.description, None);
        assert_eq!(d.status, PropertyStatus::Sold);
        // untouched
        assert_eq!(d.title, "Casa en Chapalita");
        assert_eq!(d.municipality.as_deref(), Some("Zapopan"));
    }

    #[test]
    fn test_listing_query_ignores_blank_values() {
        let q: ListingQuery = serde_json::from_str(
            r#"{"municipality": "", "bedrooms": "3", "min_price": "1000000", "q": "  "}"#,
        )
        .unwrap();
        assert_eq!(q.municipality, None);
        assert_eq!(q.bedrooms, Some(3));
        assert_eq!(q.min_price, Some(Decimal::from(1_000_000)));
        assert_eq!(q.q, None);
    }

    #[test]
    fn test_field_match_parse() {
        assert_eq!(
            FieldMatch::parse("bedrooms", "3"),
            Ok(FieldMatch::Bedrooms(3))
        );
        assert_eq!(
            FieldMatch::parse("status", "sold"),
            Ok(FieldMatch::Status(PropertyStatus::Sold))
        );
        assert!(FieldMatch::parse("bedrooms", "three").is_err());
        assert!(FieldMatch::parse("status", "rented").is_err());

        let err = FieldMatch::parse("owner", "me").unwrap_err();
        assert!(err.contains("Unknown filter field 'owner'"));
    }

    #[test]
    fn test_field_match_parse_all_is_ordered_by_field() {
        let params = BTreeMap::from([
            ("state".to_string(), "Jalisco".to_string()),
            ("bedrooms".to_string(), "2".to_string()),
        ]);
        let matches = FieldMatch::parse_all(params).unwrap();
        let columns: Vec<&str> = matches.iter().map(FieldMatch::column).collect();
        assert_eq!(columns, vec!["bedrooms", "state"]);
    }

    #[test]
    fn test_fiche_document_name() {
        let p = crate::features::properties::models::property_fixtures::property(
            "Casa",
            "1200000",
            PropertyStatus::ForSale,
        );
        let id = p.id;
        let fiche = PropertyFicheDto::new(PropertyDto::with_images(p, vec![]));
        assert_eq!(fiche.document_name, format!("Ficha_Tecnica_Casa_{}", id));
        assert_eq!(fiche.location_label, "Location not specified");
    }
}
