//! Format catalog, quality scoring and matching

pub mod descriptor;
pub mod matcher;
pub mod request;
pub mod scorer;

pub use descriptor::{EncodingDescriptor, FormatCatalog};
pub use matcher::match_encoding;
pub use request::{AudioTier, QualityRequest, QualityTier};
pub use scorer::score;
