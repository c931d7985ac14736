//! Central image gallery and the ordered links between properties and images.
//!
//! Images are stored in the database and handed to clients as inline
//! `data:` URIs. One image can be linked to any number of properties.
//!
//! ## Endpoints (admin)
//!
//! | Method | Endpoint | Description |
//! |--------|----------|-------------|
//! | GET/POST | `/api/admin/gallery` | List / upload |
//! | GET/DELETE | `/api/admin/gallery/{id}` | Get / delete |
//! | POST | `/api/admin/properties/{id}/images` | Attach image to property |
//! | DELETE | `/api/admin/property-images/{id}` | Remove link |

pub mod dtos;
pub mod handlers;
pub mod models;
pub mod routes;
pub mod services;

pub use routes::routes;
pub use services::GalleryService;
