use std::str::FromStr;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, Type};
use utoipa::ToSchema;
use uuid::Uuid;

/// Listing status enum matching database enum
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, Type, ToSchema,
)]
#[sqlx(type_name = "property_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum PropertyStatus {
    #[default]
    ForSale,
    Sold,
}

impl PropertyStatus {
    pub const ALL: [PropertyStatus; 2] = [PropertyStatus::ForSale, PropertyStatus::Sold];

    /// Human label used in dashboards and reports
    pub fn label(&self) -> &'static str {
        match self {
            PropertyStatus::ForSale => "For Sale",
            PropertyStatus::Sold => "Sold",
        }
    }
}

impl std::fmt::Display for PropertyStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PropertyStatus::ForSale => write!(f, "for_sale"),
            PropertyStatus::Sold => write!(f, "sold"),
        }
    }
}

impl FromStr for PropertyStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "for_sale" => Ok(PropertyStatus::ForSale),
            "sold" => Ok(PropertyStatus::Sold),
            other => Err(format!(
                "Unknown status '{}', expected 'for_sale' or 'sold'",
                other
            )),
        }
    }
}

/// Database model for a property listing
#[derive(Debug, Clone, FromRow)]
pub struct Property {
    pub id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub price: Decimal,
    pub address: Option<String>,
    pub municipality: Option<String>,
    pub state: Option<String>,
    pub postal_code: Option<String>,
    pub latitude: Option<Decimal>,
    pub longitude: Option<Decimal>,
    pub status: PropertyStatus,
    pub bedrooms: Option<i32>,
    pub bathrooms: Option<i32>,
    pub surface_m2: Option<i32>,
    pub published_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Column list shared by every query that maps into [`Property`]
pub const PROPERTY_COLUMNS: &str = "id, title, description, price, address, municipality, \
     state, postal_code, latitude, longitude, status, bedrooms, bathrooms, surface_m2, \
     published_at, updated_at";

impl Property {
    /// "Street 1, Zapopan, Jalisco, CP: 45000", skipping empty parts
    pub fn location_label(&self) -> String {
        let mut parts: Vec<String> = [&self.address, &self.municipality, &self.state]
            .into_iter()
            .flatten()
            .filter(|s| !s.is_empty())
            .cloned()
            .collect();
        if let Some(cp) = self.postal_code.as_deref().filter(|s| !s.is_empty()) {
            parts.push(format!("CP: {}", cp));
        }

        if parts.is_empty() {
            "Location not specified".to_string()
        } else {
            parts.join(", ")
        }
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    use super::*;
    use std::str::FromStr;

    pub fn property(title: &str, price: &str, status: PropertyStatus) -> Property {
        let now = Utc::now();
        Property {
            id: Uuid::now_v7(),
            title: title.to_string(),
            description: None,
            price: Decimal::from_str(price).unwrap(),
            address: None,
            municipality: None,
            state: None,
            postal_code: None,
            latitude: None,
            longitude: None,
            status,
            bedrooms: None,
            bathrooms: None,
            surface_m2: None,
            published_at: now,
            updated_at: now,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::fixtures::property;
    use super::*;

    #[test]
    fn test_status_round_trips_through_str() {
        for status in PropertyStatus::ALL {
            assert_eq!(status.to_string().parse::<PropertyStatus>(), Ok(status));
        }
        assert!("en venta".parse::<PropertyStatus>().is_err());
    }

    #[test]
    fn test_location_label_joins_present_parts() {
        let mut p = property("Casa", "1", PropertyStatus::ForSale);
        assert_eq!(p.location_label(), "Location not specified");

        p.address = Some("Av. Juárez 12".to_string());
        p.municipality = Some("Zapopan".to_string());
        p.state = Some("Jalisco".to_string());
        p.postal_code = Some("45000".to_string());
        assert_eq!(
            p.location_label(),
            "Av. Juárez 12, Zapopan, Jalisco, CP: 45000"
        );

        p.address = None;
        assert_eq!(p.location_label(), "Zapopan, Jalisco, CP: 45000");
    }
}
