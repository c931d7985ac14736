pub mod geocoding_service;
mod property_service;

pub use geocoding_service::{Geocoder, NominatimGeocoder};
pub use property_service::PropertyService;
pub(crate) use property_service::contains_pattern;
