use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

/// Database model for a gallery image, payload included
#[derive(Debug, Clone, FromRow)]
pub struct GalleryImage {
    pub id: Uuid,
    pub name: String,
    pub data: Vec<u8>,
    pub content_type: String,
    pub category: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Gallery image without its payload, for listings
#[derive(Debug, Clone, FromRow)]
pub struct GalleryImageSummary {
    pub id: Uuid,
    pub name: String,
    pub content_type: String,
    pub category: Option<String>,
    pub size_bytes: i32,
    pub created_at: DateTime<Utc>,
}

/// Data for storing a new gallery image
#[derive(Debug)]
pub struct CreateGalleryImage {
    pub name: String,
    pub data: Vec<u8>,
    pub content_type: String,
    pub category: Option<String>,
}

/// Inline `data:` URI for an image payload.
///
/// Returns `None` when there is nothing to render.
pub fn image_data_uri(content_type: &str, data: &[u8]) -> Option<String> {
    if data.is_empty() || content_type.is_empty() {
        return None;
    }
    Some(format!("data:{};base64,{}", content_type, BASE64.encode(data)))
}

impl GalleryImage {
    pub fn src(&self) -> Option<String> {
        image_data_uri(&self.content_type, &self.data)
    }
}
