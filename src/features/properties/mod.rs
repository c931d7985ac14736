//! Property listings ("casas").
//!
//! Holds the entity, its validation rules and the save pipeline with
//! best-effort geocoding, plus every read surface: the public for-sale
//! listing, free-text search, the field filter and the fiche.

pub mod dtos;
pub mod handlers;
pub mod models;
pub mod routes;
pub mod services;

pub use services::{Geocoder, NominatimGeocoder, PropertyService};
