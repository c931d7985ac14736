use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::features::gallery::models::{
    image_data_uri, GalleryImage, GalleryImageSummary, PropertyImage, PropertyImageWithData,
};

/// Upload request for OpenAPI documentation.
/// The handler reads the multipart stream directly.
#[derive(Debug, ToSchema)]
#[allow(dead_code)]
pub struct UploadGalleryImageDto {
    /// The image file
    #[schema(format = Binary, content_media_type = "application/octet-stream")]
    pub file: String,
    /// Descriptive name; defaults to the uploaded file name
    #[schema(example = "Front facade")]
    pub name: Option<String>,
    /// Optional category, e.g. exterior, interior, garden
    #[schema(example = "exterior")]
    pub category: Option<String>,
}

/// Gallery image metadata (no payload)
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct GalleryImageDto {
    pub id: Uuid,
    pub name: String,
    pub content_type: String,
    pub category: Option<String>,
    pub size_bytes: i32,
    pub created_at: DateTime<Utc>,
}

impl From<GalleryImageSummary> for GalleryImageDto {
    fn from(g: GalleryImageSummary) -> Self {
        Self {
            id: g.id,
            name: g.name,
            content_type: g.content_type,
            category: g.category,
            size_bytes: g.size_bytes,
            created_at: g.created_at,
        }
    }
}

/// Gallery image with its inline `data:` URI
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct GalleryImageDetailDto {
    pub id: Uuid,
    pub name: String,
    pub content_type: String,
    pub category: Option<String>,
    pub size_bytes: i32,
    pub src: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<GalleryImage> for GalleryImageDetailDto {
    fn from(g: GalleryImage) -> Self {
        let src = g.src();
        Self {
            id: g.id,
            size_bytes: i32::try_from(g.data.len()).unwrap_or(i32::MAX),
            name: g.name,
            content_type: g.content_type,
            category: g.category,
            src,
            created_at: g.created_at,
        }
    }
}

/// An image shown on a property, in display order
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct PropertyImageDto {
    pub id: Uuid,
    pub image_id: Uuid,
    pub image_name: String,
    pub alt_text: Option<String>,
    pub display_order: i32,
    /// `data:<mime>;base64,<payload>`
    pub src: Option<String>,
}

impl From<PropertyImageWithData> for PropertyImageDto {
    fn from(r: PropertyImageWithData) -> Self {
        let src = image_data_uri(&r.content_type, &r.data);
        Self {
            id: r.id,
            image_id: r.image_id,
            image_name: r.image_name,
            alt_text: r.alt_text,
            display_order: r.display_order,
            src,
        }
    }
}

/// Request DTO for attaching a gallery image to a property
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct AttachImageDto {
    pub image_id: Uuid,

    #[validate(length(max = 100, message = "Alt text must not exceed 100 characters"))]
    pub alt_text: Option<String>,

    /// Sort key; defaults to 0
    pub display_order: Option<i32>,
}

/// Response DTO for a created link
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct PropertyImageLinkDto {
    pub id: Uuid,
    pub property_id: Uuid,
    pub image_id: Uuid,
    pub alt_text: Option<String>,
    pub display_order: i32,
}

impl From<PropertyImage> for PropertyImageLinkDto {
    fn from(l: PropertyImage) -> Self {
        Self {
            id: l.id,
            property_id: l.property_id,
            image_id: l.image_id,
            alt_text: l.alt_text,
            display_order: l.display_order,
        }
    }
}
