mod gallery_image;
mod property_image;

pub use gallery_image::*;
pub use property_image::*;
