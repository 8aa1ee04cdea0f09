//! # sowonee-gallery
//!
//! Host side of SOWONEE Gallery: record sources, the debounced fetch
//! coordinator, configuration, and the [`Gallery`] facade that combines the
//! filter engine with engagement statistics and favorites.

pub mod config;
pub mod fetch;
pub mod gallery;
pub mod source;

pub use config::{ConfigError, ConfigResult, GalleryConfig, StorageKind};
pub use fetch::{FetchCoordinator, FetchState};
pub use gallery::{Badges, FacetSummary, Gallery};
pub use source::{ImageSource, JsonFileSource, StaticSource};
