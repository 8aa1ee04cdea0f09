//! # sowonee-stats
//!
//! Browser-local style persistence for SOWONEE Gallery: per-image view and
//! download counters, the search log, and the favorites list.
//!
//! Both stores take an injected [`StorageBackend`]. Construct each store once
//! per session and clone it to share; clones observe one state and every
//! mutation is a read-modify-write of the full structure followed by a
//! synchronous save. Save failures are logged and swallowed, so the in-memory
//! state stays authoritative for the rest of the session.

pub mod clock;
pub mod engagement;
pub mod favorites;
pub mod storage;

pub use clock::{Clock, ManualClock, SystemClock};
pub use engagement::{EngagementTracker, ImageCount, ImageStats, LocalStats, SearchEntry};
pub use favorites::Favorites;
pub use storage::{FileStorage, MemoryStorage, StorageBackend};
