use std::str::FromStr;
use std::time::Duration;

use async_trait::async_trait;
use rust_decimal::Decimal;
use serde::Deserialize;
use thiserror::Error;

use crate::core::config::GeocodingConfig;
use crate::features::properties::models::PropertyDraft;

const COORDINATE_DECIMAL_PLACES: u32 = 8;

/// A resolved point
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Coordinates {
    pub latitude: Decimal,
    pub longitude: Decimal,
}

#[derive(Debug, Error)]
pub enum GeocodingError {
    #[error("geocoding request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("geocoding provider returned status {0}")]
    Status(u16),

    #[error("no geocoding candidates for query")]
    NoResults,

    #[error("invalid coordinates in geocoding response: {0}")]
    InvalidCoordinates(String),
}

/// Address to coordinates lookup
#[async_trait]
pub trait Geocoder: Send + Sync {
    async fn geocode(&self, query: &str) -> Result<Coordinates, GeocodingError>;
}

/// One entry of a Nominatim `/search` response
#[derive(Debug, Deserialize)]
struct NominatimResult {
    lat: String,
    lon: String,
}

/// Geocoder backed by a Nominatim (OpenStreetMap) instance
pub struct NominatimGeocoder {
    client: reqwest::Client,
    base_url: String,
    country_suffix: String,
    country_codes: String,
    request_delay: Duration,
}

impl NominatimGeocoder {
    pub fn new(config: &GeocodingConfig) -> Result<Self, GeocodingError> {
        let client = reqwest::Client::builder()
            .user_agent(config.user_agent.clone())
            .timeout(config.timeout)
            .build()?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            country_suffix: config.country_suffix.clone(),
            country_codes: config.country_codes.clone(),
            request_delay: config.request_delay,
        })
    }

    fn full_query(&self, query: &str) -> String {
        if self.country_suffix.is_empty() {
            query.to_string()
        } else {
            format!("{}, {}", query, self.country_suffix)
        }
    }

    fn search_url(&self, query: &str) -> String {
        format!(
            "{}/search?q={}&format=json&limit=1&countrycodes={}",
            self.base_url,
            urlencoding::encode(&self.full_query(query)),
            urlencoding::encode(&self.country_codes)
        )
    }
}

#[async_trait]
impl Geocoder for NominatimGeocoder {
    async fn geocode(&self, query: &str) -> Result<Coordinates, GeocodingError> {
        let url = self.search_url(query);
        tracing::debug!("Geocoding: {} -> {}", query, url);

        let response = self.client.get(&url).send().await;

        // Courtesy pause toward the provider, taken before the answer is used
        if !self.request_delay.is_zero() {
            tokio::time::sleep(self.request_delay).await;
        }

        let response = response?;
        let status = response.status();
        if !status.is_success() {
            return Err(GeocodingError::Status(status.as_u16()));
        }

        let results: Vec<NominatimResult> = response.json().await?;
        let first = results.into_iter().next().ok_or(GeocodingError::NoResults)?;

        parse_coordinates(&first.lat, &first.lon)
    }
}

fn parse_coordinates(lat: &str, lon: &str) -> Result<Coordinates, GeocodingError> {
    let parse = |raw: &str| {
        Decimal::from_str(raw.trim())
            .map(|d| d.round_dp(COORDINATE_DECIMAL_PLACES))
            .map_err(|_| GeocodingError::InvalidCoordinates(raw.to_string()))
    };

    let latitude = parse(lat)?;
    let longitude = parse(lon)?;

    if latitude.abs() > Decimal::from(90) || longitude.abs() > Decimal::from(180) {
        return Err(GeocodingError::InvalidCoordinates(format!("{}, {}", lat, lon)));
    }

    Ok(Coordinates {
        latitude,
        longitude,
    })
}

/// Free-form query from the address parts present on the draft, in
/// address, municipality, state, postal code order.
pub fn address_query(draft: &PropertyDraft) -> Option<String> {
    let parts: Vec<&str> = [
        draft.address.as_deref(),
        draft.municipality.as_deref(),
        draft.state.as_deref(),
        draft.postal_code.as_deref(),
    ]
    .into_iter()
    .flatten()
    .map(str::trim)
    .filter(|s| !s.is_empty())
    .collect();

    if parts.is_empty() {
        None
    } else {
        Some(parts.join(", "))
    }
}

/// Best effort: looks up coordinates for a draft that has an address but no
/// coordinates. Failures are logged and leave the draft untouched.
///
/// Returns whether coordinates were filled in.
pub async fn fill_missing_coordinates(geocoder: &dyn Geocoder, draft: &mut PropertyDraft) -> bool {
    if !draft.needs_geocoding() {
        return false;
    }
    let Some(query) = address_query(draft) else {
        return false;
    };

    match geocoder.geocode(&query).await {
        Ok(coords) => {
            tracing::info!(
                "Geocoded '{}' -> ({}, {})",
                query,
                coords.latitude,
                coords.longitude
            );
            draft.latitude = Some(coords.latitude);
            draft.longitude = Some(coords.longitude);
            true
        }
        Err(e) => {
            tracing::warn!("Geocoding failed for '{}': {}", query, e);
            false
        }
    }
}
