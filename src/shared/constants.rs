/// Default page size for pagination
pub const DEFAULT_PAGE_SIZE: i64 = 20;

/// Maximum page size allowed
pub const MAX_PAGE_SIZE: i64 = 100;

/// Number of entries in the "latest movements" strip next to the public listing
pub const LATEST_MOVEMENTS_LIMIT: i64 = 5;

// =============================================================================
// ROLE CONSTANTS
// =============================================================================

/// Admin role - dashboard, reports and every mutation endpoint
pub const ROLE_ADMIN: &str = "admin";

// =============================================================================
// GALLERY
// =============================================================================

/// Maximum size of a stored gallery image (10MB)
pub const MAX_IMAGE_SIZE: usize = 10 * 1024 * 1024;

/// MIME types accepted into the gallery
pub const ALLOWED_IMAGE_MIME_TYPES: &[&str] = &["image/jpeg", "image/png", "image/gif", "image/webp"];
