use rust_decimal::Decimal;
use validator::Validate;

use crate::core::error::FieldErrors;
use crate::features::properties::models::{Property, PropertyStatus};
use crate::shared::validation::{push_field_error, to_field_errors, POSTAL_CODE_REGEX};

/// Exclusive upper bound of NUMERIC(10, 2)
const MAX_PRICE: Decimal = Decimal::from_parts(100_000_000, 0, 0, false, 0);
const PRICE_DECIMAL_PLACES: u32 = 2;
const COORDINATE_DECIMAL_PLACES: u32 = 8;

/// Writable fields of a property, as they will be persisted.
///
/// Every create and update goes through [`PropertyDraft::validate_full`] before
/// it reaches the database.
#[derive(Debug, Clone, PartialEq, Validate)]
pub struct PropertyDraft {
    #[validate(length(max = 255, message = "Title must not exceed 255 characters"))]
    pub title: String,

    pub description: Option<String>,

    pub price: Decimal,

    #[validate(length(max = 255, message = "Address must not exceed 255 characters"))]
    pub address: Option<String>,

    #[validate(length(max = 100, message = "Municipality must not exceed 100 characters"))]
    pub municipality: Option<String>,

    #[validate(length(max = 100, message = "State must not exceed 100 characters"))]
    pub state: Option<String>,

    #[validate(regex(
        path = *POSTAL_CODE_REGEX,
        message = "Postal code must have exactly 5 digits"
    ))]
    pub postal_code: Option<String>,

    pub latitude: Option<Decimal>,

    pub longitude: Option<Decimal>,

    pub status: PropertyStatus,

    #[validate(range(min = 1, message = "Bedrooms must be greater than 0"))]
    pub bedrooms: Option<i32>,

    #[validate(range(min = 1, message = "Bathrooms must be greater than 0"))]
    pub bathrooms: Option<i32>,

    #[validate(range(min = 1, message = "Surface must be greater than 0"))]
    pub surface_m2: Option<i32>,
}

impl From<&Property> for PropertyDraft {
    fn from(p: &Property) -> Self {
        Self {
            title: p.title.clone(),
            description: p.description.clone(),
            price: p.price,
            address: p.address.clone(),
            municipality: p.municipality.clone(),
            state: p.state.clone(),
            postal_code: p.postal_code.clone(),
            latitude: p.latitude,
            longitude: p.longitude,
            status: p.status,
            bedrooms: p.bedrooms,
            bathrooms: p.bathrooms,
            surface_m2: p.surface_m2,
        }
    }
}

fn blank_to_none(value: &mut Option<String>) {
    if let Some(s) = value.take() {
        let trimmed = s.trim();
        if !trimmed.is_empty() {
            *value = Some(trimmed.to_string());
        }
    }
}

fn has_more_places(value: Decimal, places: u32) -> bool {
    value.normalize().scale() > places
}

impl PropertyDraft {
    /// Trims text input; blank optional text is stored as NULL.
    pub fn normalize(&mut self) {
        self.title = self.title.trim().to_string();
        blank_to_none(&mut self.description);
        blank_to_none(&mut self.address);
        blank_to_none(&mut self.municipality);
        blank_to_none(&mut self.state);
        blank_to_none(&mut self.postal_code);
    }

    /// Field rules, range rules and paired-field rules, collected into one error set.
    pub fn validate_full(&self) -> Result<(), FieldErrors> {
        let mut errors = match self.validate() {
            Ok(()) => FieldErrors::new(),
            Err(e) => to_field_errors(&e),
        };

        if self.title.trim().is_empty() {
            push_field_error(&mut errors, "title", "Title is required");
        }

        if self.price <= Decimal::ZERO {
            push_field_error(&mut errors, "price", "Price must be greater than 0");
        } else if self.price >= MAX_PRICE {
            push_field_error(&mut errors, "price", "Price must be less than 100,000,000");
        }
        if has_more_places(self.price, PRICE_DECIMAL_PLACES) {
            push_field_error(
                &mut errors,
                "price",
                "Price must have at most 2 decimal places",
            );
        }

        if let Some(lat) = self.latitude {
            if lat < Decimal::from(-90) || lat > Decimal::from(90) {
                push_field_error(&mut errors, "latitude", "Latitude must be between -90 and 90");
            }
            if has_more_places(lat, COORDINATE_DECIMAL_PLACES) {
                push_field_error(
                    &mut errors,
                    "latitude",
                    "Latitude must have at most 8 decimal places",
                );
            }
        }
        if let Some(lon) = self.longitude {
            if lon < Decimal::from(-180) || lon > Decimal::from(180) {
                push_field_error(
                    &mut errors,
                    "longitude",
                    "Longitude must be between -180 and 180",
                );
            }
            if has_more_places(lon, COORDINATE_DECIMAL_PLACES) {
                push_field_error(
                    &mut errors,
                    "longitude",
                    "Longitude must have at most 8 decimal places",
                );
            }
        }

        if self.latitude.is_some() != self.longitude.is_some() {
            let msg = "Coordinates require both latitude and longitude";
            push_field_error(&mut errors, "latitude", msg);
            push_field_error(&mut errors, "longitude", msg);
        }

        if self.municipality.is_some() != self.state.is_some() {
            push_field_error(
                &mut errors,
                "municipality",
                "A municipality requires the state as well",
            );
            push_field_error(
                &mut errors,
                "state",
                "A state requires the municipality as well",
            );
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    /// No coordinates yet, but enough address to look them up
    pub fn needs_geocoding(&self) -> bool {
        self.latitude.is_none()
            && self.longitude.is_none()
            && (self.address.is_some() || self.municipality.is_some() || self.state.is_some())
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    use super::*;

    pub fn draft() -> PropertyDraft {
        PropertyDraft {
            title: "Casa en Chapalita".to_string(),
            description: Some("Three bedrooms with garden".to_string()),
            price: Decimal::new(1_500_000, 0),
            address: Some("Av. Guadalupe 1200".to_string()),
            municipality: Some("Zapopan".to_string()),
            state: Some("Jalisco".to_string()),
            postal_code: Some("45040".to_string()),
            latitude: None,
            longitude: None,
            status: PropertyStatus::ForSale,
            bedrooms: Some(3),
            bathrooms: Some(2),
            surface_m2: Some(180),
        }
    }
}
