//! The gallery facade: engagement, favorites and the filter engine together.

use std::collections::BTreeMap;

use serde::Serialize;
use tracing::debug;

use sowonee_core::defaults::POPULAR_VIEW_LIMIT;
use sowonee_core::{
    action_counts, active_filters, apply_special_filter, character_counts, emotion_counts,
    filter_images, scene_counts, ActiveFilter, FilterSpec, ImageRecord, SpecialFilter,
};
use sowonee_stats::{EngagementTracker, Favorites};

/// Counts shown on the special-filter toggles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Badges {
    pub favorites: usize,
    pub popular: usize,
}

/// Everything the filter panel displays next to its options.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FacetSummary {
    pub characters: BTreeMap<String, usize>,
    pub emotions: BTreeMap<String, usize>,
    pub actions: BTreeMap<String, usize>,
    pub scenes: BTreeMap<String, usize>,
    pub active: Vec<ActiveFilter>,
    pub has_active_filters: bool,
}

#[derive(Debug, Clone)]
pub struct Gallery {
    tracker: EngagementTracker,
    favorites: Favorites,
    popular_limit: usize,
}

impl Gallery {
    pub fn new(tracker: EngagementTracker, favorites: Favorites) -> Self {
        Self {
            tracker,
            favorites,
            popular_limit: POPULAR_VIEW_LIMIT,
        }
    }

    /// Override how many engagement-ranked ids the popular filter considers.
    pub fn with_popular_limit(mut self, limit: usize) -> Self {
        self.popular_limit = limit;
        self
    }

    pub fn tracker(&self) -> &EngagementTracker {
        &self.tracker
    }

    pub fn favorites(&self) -> &Favorites {
        &self.favorites
    }

    /// Records to display for `spec`.
    ///
    /// The popular ranking is computed over all tracked images and then
    /// intersected with the records passing the regular filters.
    pub fn view<'a>(&self, records: &'a [ImageRecord], spec: &FilterSpec) -> Vec<&'a ImageRecord> {
        let filtered = filter_images(records, spec);
        self.apply_special(filtered, spec.special_filter)
    }

    /// Apply only the special-filter pass to already filtered `images`.
    pub fn apply_special<'a>(
        &self,
        images: Vec<&'a ImageRecord>,
        special: SpecialFilter,
    ) -> Vec<&'a ImageRecord> {
        match special {
            SpecialFilter::None => images,
            SpecialFilter::Popular => {
                let popular = self.tracker.popular_image_ids(self.popular_limit);
                apply_special_filter(images, special, &[], &popular)
            }
            SpecialFilter::Favorites => {
                let favorites = self.favorites.ids();
                apply_special_filter(images, special, &favorites, &[])
            }
        }
    }

    pub fn badges(&self) -> Badges {
        Badges {
            favorites: self.favorites.count(),
            popular: self.tracker.popular_image_ids(self.popular_limit).len(),
        }
    }

    /// Facet counts over `records` plus the chips for `spec`.
    pub fn facets(&self, records: &[ImageRecord], spec: &FilterSpec) -> FacetSummary {
        FacetSummary {
            characters: character_counts(records),
            emotions: emotion_counts(records)
                .into_iter()
                .map(|(k, v)| (k.value().to_string(), v))
                .collect(),
            actions: action_counts(records)
                .into_iter()
                .map(|(k, v)| (k.value().to_string(), v))
                .collect(),
            scenes: scene_counts(records)
                .into_iter()
                .map(|(k, v)| (k.value().to_string(), v))
                .collect(),
            active: active_filters(spec),
            has_active_filters: spec.has_active_filters(),
        }
    }

    pub fn open_lightbox(&self, image_id: &str) {
        debug!(image_id, "Lightbox opened");
        self.tracker.track_view(image_id);
    }

    pub fn download(&self, image_id: &str) {
        self.tracker.track_download(image_id);
    }

    /// Record a submitted search. Returns the spec with `query` applied.
    pub fn search(&self, spec: &FilterSpec, query: &str) -> FilterSpec {
        self.tracker.track_search(query);
        spec.clone().with_search(query)
    }

    pub fn toggle_favorite(&self, image_id: &str) -> bool {
        self.favorites.toggle(image_id)
    }
}
