//! Error type, configuration, directories and platform classification

pub mod config;
pub mod error;
pub mod paths;
pub mod platform;

pub use config::AppSettings;
pub use error::{MediaError, ParseQualityError};
pub use platform::{classify, SourcePlatform};
