pub mod property_handler;
pub mod public_handler;

pub use property_handler::*;
pub use public_handler::*;
