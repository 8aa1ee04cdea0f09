//! Centralized default constants for SOWONEE Gallery.
//!
//! Crates reference these constants instead of defining their own magic
//! numbers.

// =============================================================================
// PERSISTENCE
// =============================================================================

/// Prefix shared by every persisted key.
pub const STORAGE_PREFIX: &str = "sowonee_";

/// Key holding the per-image view counters.
pub const KEY_IMAGE_VIEWS: &str = "sowonee_image_views";

/// Key holding the per-image download counters.
pub const KEY_IMAGE_DOWNLOADS: &str = "sowonee_image_downloads";

/// Key holding the search log.
pub const KEY_SEARCH_HISTORY: &str = "sowonee_search_history";

/// Key holding the favorite image ids.
pub const KEY_FAVORITES: &str = "sowonee_favorites";

/// Directory name used under the platform data dir for file storage.
pub const STORAGE_DIR_NAME: &str = "sowonee";

// =============================================================================
// ENGAGEMENT
// =============================================================================

/// Maximum number of entries kept in the search log.
pub const SEARCH_HISTORY_CAP: usize = 100;

/// Weight of one view in the engagement popularity score.
pub const VIEW_WEIGHT: u64 = 1;

/// Weight of one download in the engagement popularity score.
pub const DOWNLOAD_WEIGHT: u64 = 3;

/// Default limit for `top_viewed` / `top_downloaded` / `top_searches`.
pub const TOP_LIMIT: usize = 10;

/// Default limit for `popular_image_ids`.
pub const POPULAR_LIMIT: usize = 20;

/// Default limit for `recent_searches`.
pub const RECENT_SEARCH_LIMIT: usize = 5;

// =============================================================================
// GALLERY
// =============================================================================

/// Number of engagement-ranked ids used by the main view's "popular" filter.
pub const POPULAR_VIEW_LIMIT: usize = 50;

/// Quiescence window before a filter change triggers a fetch.
pub const SEARCH_DEBOUNCE_MS: u64 = 300;
