mod property_dto;

pub use property_dto::*;
