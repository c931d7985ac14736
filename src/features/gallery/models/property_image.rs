use sqlx::FromRow;
use uuid::Uuid;

/// Database model for a property-image link
#[derive(Debug, Clone, FromRow)]
pub struct PropertyImage {
    pub id: Uuid,
    pub property_id: Uuid,
    pub image_id: Uuid,
    pub alt_text: Option<String>,
    pub display_order: i32,
}

/// Link joined with the gallery image it points to
#[derive(Debug, Clone, FromRow)]
pub struct PropertyImageWithData {
    pub id: Uuid,
    pub property_id: Uuid,
    pub image_id: Uuid,
    pub alt_text: Option<String>,
    pub display_order: i32,
    pub image_name: String,
    pub content_type: String,
    pub data: Vec<u8>,
}

/// Data for linking a gallery image to a property
#[derive(Debug)]
pub struct CreatePropertyImage {
    pub property_id: Uuid,
    pub image_id: Uuid,
    pub alt_text: Option<String>,
    pub display_order: i32,
}
