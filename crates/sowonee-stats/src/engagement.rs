//! Engagement tracker: view/download counters and the search log.
//!
//! Three independently persisted values back the tracker:
//!
//! | Key | Shape |
//! |-----|-------|
//! | `sowonee_image_views` | `{ "<image id>": count }` |
//! | `sowonee_image_downloads` | `{ "<image id>": count }` |
//! | `sowonee_search_history` | `[{ "query", "timestamp", "count" }]`, newest insertion first |
//!
//! State loads lazily on first use. Each mutation rewrites the touched value
//! before returning.
//!
//! Engagement popularity (`views + 3 * downloads`) is unrelated to the
//! record's own `likes` column used by the `popular` sort order.

use std::cmp::Reverse;
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, PoisonError};

use serde::{Deserialize, Serialize};
use tracing::{debug, info, trace};

use sowonee_core::defaults::{
    DOWNLOAD_WEIGHT, KEY_IMAGE_DOWNLOADS, KEY_IMAGE_VIEWS, KEY_SEARCH_HISTORY,
    SEARCH_HISTORY_CAP, VIEW_WEIGHT,
};

use crate::clock::{Clock, SystemClock};
use crate::storage::{load_json, remove_key, save_json, StorageBackend};

/// Per-image counters keyed by image id.
pub type ImageStats = BTreeMap<String, u64>;

/// One search-log entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchEntry {
    pub query: String,
    /// Milliseconds since the Unix epoch of the latest occurrence.
    pub timestamp: i64,
    pub count: u64,
}

/// Full tracker state.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct LocalStats {
    pub views: ImageStats,
    pub downloads: ImageStats,
    pub searches: Vec<SearchEntry>,
}

impl LocalStats {
    fn load(storage: &dyn StorageBackend) -> Self {
        let stats = Self {
            views: load_json(storage, KEY_IMAGE_VIEWS),
            downloads: load_json(storage, KEY_IMAGE_DOWNLOADS),
            searches: load_json(storage, KEY_SEARCH_HISTORY),
        };
        debug!(
            views = stats.views.len(),
            downloads = stats.downloads.len(),
            searches = stats.searches.len(),
            "Engagement stats loaded"
        );
        stats
    }
}

/// An image id with a single-metric count.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ImageCount {
    pub id: String,
    pub count: u64,
}

/// Shared handle to the engagement store.
///
/// Clones share state. Construct one per session.
#[derive(Clone)]
pub struct EngagementTracker {
    inner: Arc<TrackerInner>,
}

struct TrackerInner {
    storage: Arc<dyn StorageBackend>,
    clock: Arc<dyn Clock>,
    state: Mutex<Option<LocalStats>>,
}

impl EngagementTracker {
    pub fn new(storage: Arc<dyn StorageBackend>) -> Self {
        Self::with_clock(storage, Arc::new(SystemClock))
    }

    pub fn with_clock(storage: Arc<dyn StorageBackend>, clock: Arc<dyn Clock>) -> Self {
        Self {
            inner: Arc::new(TrackerInner {
                storage,
                clock,
                state: Mutex::new(None),
            }),
        }
    }

    /// Run `f` against the loaded state while holding the lock.
    fn with_stats<R>(&self, f: impl FnOnce(&mut LocalStats, &dyn StorageBackend) -> R) -> R {
        let storage = self.inner.storage.as_ref();
        let mut guard = self
            .inner
            .state
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        let stats = guard.get_or_insert_with(|| LocalStats::load(storage));
        f(stats, storage)
    }

    /// Whether persisted state has been read yet.
    pub fn is_loaded(&self) -> bool {
        self.inner
            .state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }

    /// Copy of the full state.
    pub fn snapshot(&self) -> LocalStats {
        self.with_stats(|stats, _| stats.clone())
    }

    // =========================================================================
    // MUTATIONS
    // =========================================================================

    /// Count one lightbox open of `image_id`.
    pub fn track_view(&self, image_id: &str) {
        self.with_stats(|stats, storage| {
            let count = stats.views.entry(image_id.to_string()).or_insert(0);
            *count = count.saturating_add(1);
            trace!(image_id, count = *count, "View tracked");
            save_json(storage, KEY_IMAGE_VIEWS, &stats.views);
        });
    }

    /// Count one download of `image_id`.
    pub fn track_download(&self, image_id: &str) {
        self.with_stats(|stats, storage| {
            let count = stats.downloads.entry(image_id.to_string()).or_insert(0);
            *count = count.saturating_add(1);
            trace!(image_id, count = *count, "Download tracked");
            save_json(storage, KEY_IMAGE_DOWNLOADS, &stats.downloads);
        });
    }

    /// Record a search.
    ///
    /// Blank queries are ignored. A query already in the log (compared
    /// case-insensitively) has its count bumped and timestamp refreshed in
    /// place; a new query is prepended and the log is cut to its cap.
    pub fn track_search(&self, query: &str) {
        if query.trim().is_empty() {
            return;
        }
        let now = self.inner.clock.now_millis();
        let folded = query.to_lowercase();

        self.with_stats(|stats, storage| {
            let existing = stats
                .searches
                .iter()
                .position(|entry| entry.query.to_lowercase() == folded);
            match existing {
                Some(index) => {
                    let entry = &mut stats.searches[index];
                    entry.count = entry.count.saturating_add(1);
                    entry.timestamp = now;
                    trace!(query, count = entry.count, "Repeat search tracked");
                }
                None => {
                    stats.searches.insert(
                        0,
                        SearchEntry {
                            query: query.to_string(),
                            timestamp: now,
                            count: 1,
                        },
                    );
                    stats.searches.truncate(SEARCH_HISTORY_CAP);
                    trace!(query, "New search tracked");
                }
            }
            save_json(storage, KEY_SEARCH_HISTORY, &stats.searches);
        });
    }

    /// Reset every counter and erase the persisted values.
    pub fn clear_stats(&self) {
        self.with_stats(|stats, storage| {
            *stats = LocalStats::default();
            remove_key(storage, KEY_IMAGE_VIEWS);
            remove_key(storage, KEY_IMAGE_DOWNLOADS);
            remove_key(storage, KEY_SEARCH_HISTORY);
        });
        info!("Engagement stats cleared");
    }

    // =========================================================================
    // QUERIES
    // =========================================================================

    pub fn view_count(&self, image_id: &str) -> u64 {
        self.with_stats(|stats, _| stats.views.get(image_id).copied().unwrap_or(0))
    }

    pub fn download_count(&self, image_id: &str) -> u64 {
        self.with_stats(|stats, _| stats.downloads.get(image_id).copied().unwrap_or(0))
    }

    /// Most viewed images, highest first.
    pub fn top_viewed(&self, limit: usize) -> Vec<ImageCount> {
        self.with_stats(|stats, _| rank_counts(&stats.views, limit))
    }

    /// Most downloaded images, highest first.
    pub fn top_downloaded(&self, limit: usize) -> Vec<ImageCount> {
        self.with_stats(|stats, _| rank_counts(&stats.downloads, limit))
    }

    /// Image ids ranked by `views + 3 * downloads`, highest first.
    ///
    /// Ties keep id order.
    pub fn popular_image_ids(&self, limit: usize) -> Vec<String> {
        self.with_stats(|stats, _| {
            let mut combined: BTreeMap<&str, u64> = BTreeMap::new();
            for (id, count) in &stats.views {
                let score = combined.entry(id.as_str()).or_insert(0);
                *score = score.saturating_add(count.saturating_mul(VIEW_WEIGHT));
            }
            for (id, count) in &stats.downloads {
                let score = combined.entry(id.as_str()).or_insert(0);
                *score = score.saturating_add(count.saturating_mul(DOWNLOAD_WEIGHT));
            }

            let mut scored: Vec<(&str, u64)> = combined.into_iter().collect();
            scored.sort_by_key(|(_, score)| Reverse(*score));
            scored
                .into_iter()
                .take(limit)
                .map(|(id, _)| id.to_string())
                .collect()
        })
    }

    /// Search-log entries with the highest counts.
    pub fn top_searches(&self, limit: usize) -> Vec<SearchEntry> {
        self.with_stats(|stats, _| {
            let mut searches = stats.searches.clone();
            searches.sort_by_key(|entry| Reverse(entry.count));
            searches.truncate(limit);
            searches
        })
    }

    /// Most recently touched search-log entries.
    pub fn recent_searches(&self, limit: usize) -> Vec<SearchEntry> {
        self.with_stats(|stats, _| {
            let mut searches = stats.searches.clone();
            searches.sort_by_key(|entry| Reverse(entry.timestamp));
            searches.truncate(limit);
            searches
        })
    }
}

fn rank_counts(counts: &ImageStats, limit: usize) -> Vec<ImageCount> {
    let mut ranked: Vec<ImageCount> = counts
        .iter()
        .map(|(id, &count)| ImageCount {
            id: id.clone(),
            count,
        })
        .collect();
    ranked.sort_by_key(|entry| Reverse(entry.count));
    ranked.truncate(limit);
    ranked
}

impl std::fmt::Debug for EngagementTracker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EngagementTracker")
            .field("loaded", &self.is_loaded())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::storage::MemoryStorage;

    fn tracker() -> (EngagementTracker, Arc<MemoryStorage>, Arc<ManualClock>) {
        let storage = Arc::new(MemoryStorage::new());
        let clock = Arc::new(ManualClock::new(1_000));
        let tracker = EngagementTracker::with_clock(storage.clone(), clock.clone());
        (tracker, storage, clock)
    }

    #[test]
    fn test_lazy_load() {
        let (tracker, _, _) = tracker();
        assert!(!tracker.is_loaded());
        assert_eq!(tracker.view_count("a"), 0);
        assert!(tracker.is_loaded());
    }

    #[test]
    fn test_track_view_initializes_and_increments() {
        let (tracker, storage, _) = tracker();
        tracker.track_view("a");
        tracker.track_view("a");
        tracker.track_view("b");

        assert_eq!(tracker.view_count("a"), 2);
        assert_eq!(tracker.view_count("b"), 1);
        assert_eq!(tracker.download_count("a"), 0);
        assert_eq!(
            storage.raw(KEY_IMAGE_VIEWS).as_deref(),
            Some(r#"{"a":2,"b":1}"#)
        );
    }

    #[test]
    fn test_track_download_persists_separately() {
        let (tracker, storage, _) = tracker();
        tracker.track_download("x");
        assert_eq!(tracker.download_count("x"), 1);
        assert!(storage.contains_key(KEY_IMAGE_DOWNLOADS));
        assert!(!storage.contains_key(KEY_IMAGE_VIEWS));
    }

    #[test]
    fn test_blank_search_is_ignored() {
        let (tracker, storage, _) = tracker();
        tracker.track_search("");
        tracker.track_search("   \t");
        assert!(tracker.snapshot().searches.is_empty());
        assert!(!storage.contains_key(KEY_SEARCH_HISTORY));
    }

    #[test]
    fn test_repeat_search_keeps_position_and_first_casing() {
        let (tracker, _, clock) = tracker();
        tracker.track_search("Sowon");
        clock.advance(10);
        tracker.track_search("dance");
        clock.advance(10);
        tracker.track_search("SOWON");

        let searches = tracker.snapshot().searches;
        assert_eq!(searches.len(), 2);
        assert_eq!(searches[0].query, "dance");
        assert_eq!(searches[1].query, "Sowon");
        assert_eq!(searches[1].count, 2);
        assert_eq!(searches[1].timestamp, 1_020);
    }

    #[test]
    fn test_top_and_recent_searches() {
        let (tracker, _, clock) = tracker();
        for q in ["a", "b", "b", "c", "c", "c"] {
            tracker.track_search(q);
            clock.advance(1);
        }
        tracker.track_search("a");

        let top: Vec<String> = tracker.top_searches(2).into_iter().map(|s| s.query).collect();
        assert_eq!(top, vec!["c", "b"]);

        let recent: Vec<String> = tracker
            .recent_searches(5)
            .into_iter()
            .map(|s| s.query)
            .collect();
        assert_eq!(recent, vec!["a", "c", "b"]);
    }

    #[test]
    fn test_top_viewed_and_downloaded() {
        let (tracker, _, _) = tracker();
        for id in ["a", "b", "b", "c", "c", "c"] {
            tracker.track_view(id);
        }
        tracker.track_download("a");

        let top = tracker.top_viewed(2);
        assert_eq!(
            top,
            vec![
                ImageCount { id: "c".into(), count: 3 },
                ImageCount { id: "b".into(), count: 2 },
            ]
        );
        assert_eq!(tracker.top_downloaded(10).len(), 1);
        assert!(tracker.top_viewed(0).is_empty());
    }

    #[test]
    fn test_search_log_is_capped_newest_first() {
        let (tracker, _, clock) = tracker();
        for i in 0..=SEARCH_HISTORY_CAP {
            tracker.track_search(&format!("query {i}"));
            clock.advance(1);
        }

        let searches = tracker.snapshot().searches;
        assert_eq!(searches.len(), SEARCH_HISTORY_CAP);
        assert_eq!(searches[0].query, format!("query {SEARCH_HISTORY_CAP}"));
        assert!(searches.iter().all(|s| s.query != "query 0"));
    }

    #[test]
    fn test_popular_weights_downloads() {
        let (tracker, _, _) = tracker();
        for _ in 0..2 {
            tracker.track_view("a");
        }
        for _ in 0..5 {
            tracker.track_view("b");
        }
        for _ in 0..3 {
            tracker.track_download("a");
        }

        assert_eq!(tracker.popular_image_ids(20), vec!["a", "b"]);
        assert_eq!(tracker.popular_image_ids(1), vec!["a"]);
    }

    #[test]
    fn test_corrupt_value_loads_as_empty_per_key() {
        let storage = Arc::new(MemoryStorage::new());
        storage.insert_raw(KEY_IMAGE_VIEWS, "{not json");
        storage.insert_raw(KEY_IMAGE_DOWNLOADS, r#"{"a":4}"#);
        let tracker = EngagementTracker::new(storage);

        assert_eq!(tracker.view_count("a"), 0);
        assert_eq!(tracker.download_count("a"), 4);
        tracker.track_view("a");
        assert_eq!(tracker.view_count("a"), 1);
    }

    #[test]
    fn test_failed_write_keeps_memory_authoritative() {
        let storage = Arc::new(MemoryStorage::with_quota(8));
        let tracker = EngagementTracker::new(storage.clone());

        tracker.track_view("a");
        tracker.track_view("long-image-id");

        assert_eq!(tracker.view_count("a"), 1);
        assert_eq!(tracker.view_count("long-image-id"), 1);
        assert_eq!(storage.raw(KEY_IMAGE_VIEWS).as_deref(), Some(r#"{"a":1}"#));
    }

    #[test]
    fn test_counters_saturate_on_huge_persisted_values() {
        let storage = Arc::new(MemoryStorage::new());
        storage.insert_raw(KEY_IMAGE_VIEWS, r#"{"a": 18446744073709551615}"#);
        storage.insert_raw(KEY_IMAGE_DOWNLOADS, r#"{"a": 7000000000000000000, "b": 1}"#);
        let tracker = EngagementTracker::new(storage);

        tracker.track_view("a");
        tracker.track_download("a");
        assert_eq!(tracker.view_count("a"), u64::MAX);
        assert_eq!(tracker.download_count("a"), 7_000_000_000_000_000_001);
        assert_eq!(tracker.popular_image_ids(10), vec!["a", "b"]);
    }

    #[test]
    fn test_search_count_saturates() {
        let storage = Arc::new(MemoryStorage::new());
        storage.insert_raw(
            KEY_SEARCH_HISTORY,
            r#"[{"query": "sowon", "timestamp": 1, "count": 18446744073709551615}]"#,
        );
        let tracker = EngagementTracker::new(storage);

        tracker.track_search("Sowon");
        assert_eq!(tracker.top_searches(1)[0].count, u64::MAX);
    }

    #[test]
    fn test_popular_ties_keep_id_order() {
        let (tracker, _, _) = tracker();
        tracker.track_view("b");
        tracker.track_view("a");
        tracker.track_view("c");
        tracker.track_view("c");

        assert_eq!(tracker.popular_image_ids(10), vec!["c", "a", "b"]);
    }

    #[test]
    fn test_clear_stats_erases_keys() {
        let (tracker, storage, _) = tracker();
        tracker.track_view("a");
        tracker.track_download("a");
        tracker.track_search("q");

        tracker.clear_stats();

        assert_eq!(tracker.snapshot(), LocalStats::default());
        assert!(!storage.contains_key(KEY_IMAGE_VIEWS));
        assert!(!storage.contains_key(KEY_IMAGE_DOWNLOADS));
        assert!(!storage.contains_key(KEY_SEARCH_HISTORY));
    }

    #[test]
    fn test_clones_share_state() {
        let (tracker, _, _) = tracker();
        let other = tracker.clone();
        tracker.track_view("a");
        other.track_view("a");
        assert_eq!(tracker.view_count("a"), 2);
        assert_eq!(other.view_count("a"), 2);
    }
}
