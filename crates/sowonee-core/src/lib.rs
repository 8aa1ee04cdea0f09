//! # sowonee-core
//!
//! Core types, vocabularies, and the query/filter engine for SOWONEE Gallery.
//!
//! This crate performs no I/O. It consumes an already fetched list of
//! [`ImageRecord`]s and a [`FilterSpec`] and produces the ordered subset the
//! gallery displays, plus the facet counts shown next to each filter option.

pub mod defaults;
pub mod error;
pub mod facets;
pub mod filter;
pub mod logging;
pub mod models;
pub mod vocab;

// Re-export commonly used types at crate root
pub use error::{Error, Result};
pub use facets::{
    action_counts, active_filters, character_counts, emotion_counts, scene_counts, ActiveFilter,
    FilterKey,
};
pub use filter::{apply_special_filter, filter_images, matches, FilterSpec, SortOrder, SpecialFilter};
pub use models::ImageRecord;
pub use vocab::*;
