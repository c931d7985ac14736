mod property;
mod property_draft;

pub use property::*;
pub use property_draft::*;

#[cfg(test)]
pub(crate) use property::fixtures as property_fixtures;
#[cfg(test)]
pub(crate) use property_draft::fixtures as draft_fixtures;
