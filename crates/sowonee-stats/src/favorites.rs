//! Persisted set of favorite image ids.
//!
//! Stored under `sowonee_favorites` as a JSON array in insertion order.

use std::sync::{Arc, Mutex, PoisonError};

use tracing::{debug, info, trace};

use sowonee_core::defaults::KEY_FAVORITES;

use crate::storage::{load_json, remove_key, save_json, StorageBackend};

/// Shared handle to the favorites list. Clones share state.
#[derive(Clone)]
pub struct Favorites {
    inner: Arc<FavoritesInner>,
}

struct FavoritesInner {
    storage: Arc<dyn StorageBackend>,
    ids: Mutex<Option<Vec<String>>>,
}

impl Favorites {
    pub fn new(storage: Arc<dyn StorageBackend>) -> Self {
        Self {
            inner: Arc::new(FavoritesInner {
                storage,
                ids: Mutex::new(None),
            }),
        }
    }

    fn with_ids<R>(&self, f: impl FnOnce(&mut Vec<String>, &dyn StorageBackend) -> R) -> R {
        let storage = self.inner.storage.as_ref();
        let mut guard = self
            .inner
            .ids
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        let ids = guard.get_or_insert_with(|| {
            let ids: Vec<String> = load_json(storage, KEY_FAVORITES);
            debug!(count = ids.len(), "Favorites loaded");
            ids
        });
        f(ids, storage)
    }

    pub fn is_loaded(&self) -> bool {
        self.inner
            .ids
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }

    pub fn is_favorite(&self, image_id: &str) -> bool {
        self.with_ids(|ids, _| ids.iter().any(|id| id == image_id))
    }

    /// Flip membership of `image_id`. Returns the new membership.
    pub fn toggle(&self, image_id: &str) -> bool {
        self.with_ids(|ids, storage| {
            let now_favorite = match ids.iter().position(|id| id == image_id) {
                Some(index) => {
                    ids.remove(index);
                    false
                }
                None => {
                    ids.push(image_id.to_string());
                    true
                }
            };
            trace!(image_id, favorite = now_favorite, "Favorite toggled");
            save_json(storage, KEY_FAVORITES, &*ids);
            now_favorite
        })
    }

    /// Add `image_id` if absent. Returns whether it was added.
    pub fn add(&self, image_id: &str) -> bool {
        self.with_ids(|ids, storage| {
            if ids.iter().any(|id| id == image_id) {
                return false;
            }
            ids.push(image_id.to_string());
            save_json(storage, KEY_FAVORITES, &*ids);
            true
        })
    }

    /// Remove `image_id` if present. Returns whether it was removed.
    pub fn remove(&self, image_id: &str) -> bool {
        self.with_ids(|ids, storage| {
            let before = ids.len();
            ids.retain(|id| id != image_id);
            if ids.len() == before {
                return false;
            }
            save_json(storage, KEY_FAVORITES, &*ids);
            true
        })
    }

    pub fn clear(&self) {
        self.with_ids(|ids, storage| {
            ids.clear();
            remove_key(storage, KEY_FAVORITES);
        });
        info!("Favorites cleared");
    }

    /// Favorite ids in the order they were added.
    pub fn ids(&self) -> Vec<String> {
        self.with_ids(|ids, _| ids.clone())
    }

    pub fn count(&self) -> usize {
        self.with_ids(|ids, _| ids.len())
    }
}

impl std::fmt::Debug for Favorites {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Favorites")
            .field("loaded", &self.is_loaded())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStorage;

    #[test]
    fn test_toggle_twice_restores_membership() {
        let storage = Arc::new(MemoryStorage::new());
        let favorites = Favorites::new(storage.clone());

        assert!(favorites.toggle("a"));
        assert!(favorites.is_favorite("a"));
        assert_eq!(storage.raw(KEY_FAVORITES).as_deref(), Some(r#"["a"]"#));

        assert!(!favorites.toggle("a"));
        assert!(!favorites.is_favorite("a"));
        assert_eq!(storage.raw(KEY_FAVORITES).as_deref(), Some("[]"));
    }

    #[test]
    fn test_add_and_remove_are_idempotent() {
        let favorites = Favorites::new(Arc::new(MemoryStorage::new()));
        assert!(favorites.add("x"));
        assert!(!favorites.add("x"));
        assert!(favorites.add("y"));
        assert_eq!(favorites.ids(), vec!["x", "y"]);

        assert!(favorites.remove("x"));
        assert!(!favorites.remove("x"));
        assert_eq!(favorites.count(), 1);
    }

    #[test]
    fn test_loads_existing_list_and_recovers_from_corruption() {
        let storage = Arc::new(MemoryStorage::new());
        storage.insert_raw(KEY_FAVORITES, r#"["p","q"]"#);
        assert_eq!(Favorites::new(storage).ids(), vec!["p", "q"]);

        let corrupt = Arc::new(MemoryStorage::new());
        corrupt.insert_raw(KEY_FAVORITES, "{\"p\": 1}");
        let favorites = Favorites::new(corrupt);
        assert_eq!(favorites.count(), 0);
        assert!(favorites.toggle("p"));
    }

    #[test]
    fn test_clear_removes_key() {
        let storage = Arc::new(MemoryStorage::new());
        let favorites = Favorites::new(storage.clone());
        favorites.add("a");
        favorites.clear();
        assert_eq!(favorites.count(), 0);
        assert!(!storage.contains_key(KEY_FAVORITES));
    }

    #[test]
    fn test_unavailable_storage_still_tracks_in_memory() {
        let favorites = Favorites::new(Arc::new(MemoryStorage::disabled()));
        assert!(favorites.toggle("a"));
        assert!(favorites.is_favorite("a"));
    }
}
