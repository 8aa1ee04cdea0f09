//! Structured logging field name constants for SOWONEE Gallery.
//!
//! Field names shared by every crate's log events. Span fields recorded after
//! creation go through these constants; event macros spell the same names.
//!
//! ## Log Level Contract
//!
//! | Level | Usage |
//! |-------|-------|
//! | ERROR | Host-side failure the user will see (fetch failed) |
//! | WARN  | Recoverable issue, automatic fallback applied (storage write failed, corrupt value) |
//! | INFO  | Lifecycle events (startup, stats cleared), operation completions |
//! | DEBUG | Decision points, intermediate values, config choices |
//! | TRACE | Per-item iteration, high-volume data (filter passes, counter bumps) |

// ─── Identity fields ───────────────────────────────────────────────────────

/// Subsystem originating the log event.
/// Values: "core", "stats", "gallery"
pub const SUBSYSTEM: &str = "subsystem";

/// Component within a subsystem.
/// Examples: "filter", "engagement", "favorites", "fetch", "storage"
pub const COMPONENT: &str = "component";

// ─── Entity fields ─────────────────────────────────────────────────────────

/// Image id being operated on.
pub const IMAGE_ID: &str = "image_id";

/// Search query text.
pub const QUERY: &str = "query";

/// Persistence key being read or written.
pub const STORAGE_KEY: &str = "storage_key";

/// Fetch generation counter in the fetch coordinator.
pub const GENERATION: &str = "generation";

// ─── Measurement fields ────────────────────────────────────────────────────

/// Wall-clock duration in milliseconds.
pub const DURATION_MS: &str = "duration_ms";

/// Number of records returned by a filter or fetch.
pub const RESULT_COUNT: &str = "result_count";

/// Number of records given to a filter.
pub const INPUT_COUNT: &str = "input_count";

// ─── Outcome fields ────────────────────────────────────────────────────────

/// Error message when an operation fails.
pub const ERROR_MSG: &str = "error";
