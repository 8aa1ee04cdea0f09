//! Query/filter engine over an in-memory record set.
//!
//! [`FilterSpec`] is the user's current combination of filter and sort
//! selections. [`filter_images`] is a pure function of `(records, spec)`:
//!
//! - **Character**: exact equality on `character`
//! - **Emotion / Action / Scene**: description contains any keyword of the
//!   selected value (OR within the dimension, case-insensitive)
//! - **Legacy tags**: exact equality on `image_type` / `image_mood` /
//!   `image_shape` / `image_purpose`
//! - **Search**: title OR description contains the text, case-insensitive
//!
//! Dimensions combine with AND; an empty string leaves a dimension
//! unconstrained. Hidden records are never returned.
//!
//! The special filters (`popular`, `favorites`) need engagement and favorites
//! state that lives outside this crate, so they run as a second pass through
//! [`apply_special_filter`].
//!
//! # Example
//!
//! ```
//! use sowonee_core::{filter_images, FilterSpec, ImageRecord, SortOrder};
//!
//! let records = vec![
//!     ImageRecord::new("a", "Sowon smiling", "2025-01-01T00:00:00Z")
//!         .with_character("sowon")
//!         .with_description("미소짓는 소원이"),
//!     ImageRecord::new("b", "Mom at work", "2025-01-02T00:00:00Z")
//!         .with_character("mom")
//!         .with_description("working at the office"),
//! ];
//!
//! let spec = FilterSpec::new().with_emotion("happy").with_sort(SortOrder::Newest);
//! let shown = filter_images(&records, &spec);
//! assert_eq!(shown.len(), 1);
//! assert_eq!(shown[0].id, "a");
//! ```

use std::cmp::Reverse;
use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::models::ImageRecord;
use crate::vocab::{action_keywords, emotion_keywords, scene_keywords, text_matches_keywords};

// =============================================================================
// SORT ORDER
// =============================================================================

/// Display order of the filtered records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", from = "String")]
pub enum SortOrder {
    /// Descending by `created_at`.
    #[default]
    Newest,
    /// Ascending by `created_at`.
    Oldest,
    /// Descending by the record's own `likes`, not engagement popularity.
    Popular,
    /// Ascending ordinal compare on `title`.
    Title,
}

impl SortOrder {
    pub const ALL: &'static [SortOrder] = &[Self::Newest, Self::Oldest, Self::Popular, Self::Title];

    pub fn value(&self) -> &'static str {
        match self {
            Self::Newest => "newest",
            Self::Oldest => "oldest",
            Self::Popular => "popular",
            Self::Title => "title",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Newest => "최신순",
            Self::Oldest => "오래된순",
            Self::Popular => "인기순",
            Self::Title => "이름순",
        }
    }
}

/// Unknown values fall back to `newest`.
impl From<String> for SortOrder {
    fn from(s: String) -> Self {
        match s.to_lowercase().as_str() {
            "oldest" => Self::Oldest,
            "popular" => Self::Popular,
            "title" => Self::Title,
            _ => Self::Newest,
        }
    }
}

impl std::str::FromStr for SortOrder {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::from(s.to_string()))
    }
}

impl std::fmt::Display for SortOrder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.value())
    }
}

// =============================================================================
// SPECIAL FILTER
// =============================================================================

/// Client-side restriction applied after the regular filter pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "String")]
pub enum SpecialFilter {
    #[default]
    #[serde(rename = "")]
    None,
    /// Restrict to the engagement top-N, ordered by engagement rank.
    #[serde(rename = "popular")]
    Popular,
    /// Restrict to favorited ids.
    #[serde(rename = "favorites")]
    Favorites,
}

impl SpecialFilter {
    pub fn value(&self) -> &'static str {
        match self {
            Self::None => "",
            Self::Popular => "popular",
            Self::Favorites => "favorites",
        }
    }

    pub fn is_none(&self) -> bool {
        matches!(self, Self::None)
    }
}

/// Unknown values mean no special filter.
impl From<String> for SpecialFilter {
    fn from(s: String) -> Self {
        match s.to_lowercase().as_str() {
            "popular" => Self::Popular,
            "favorites" => Self::Favorites,
            _ => Self::None,
        }
    }
}

impl std::str::FromStr for SpecialFilter {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::from(s.to_string()))
    }
}

// =============================================================================
// FILTER SPEC
// =============================================================================

/// The user's current filter and sort selections.
///
/// Empty strings mean "no constraint on that dimension".
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterSpec {
    pub character: String,
    pub emotion: String,
    pub action: String,
    pub scene: String,
    pub search: String,
    pub sort: SortOrder,
    #[serde(rename = "specialFilter")]
    pub special_filter: SpecialFilter,

    /// Legacy `image_type` constraint.
    #[serde(rename = "type")]
    pub image_type: String,
    /// Legacy `image_mood` constraint.
    pub mood: String,
    /// Legacy `image_shape` constraint.
    pub shape: String,
    /// Legacy `image_purpose` constraint.
    pub purpose: String,
}

impl FilterSpec {
    /// Create an empty spec (matches every visible record, newest first).
    pub fn new() -> Self {
        Self::default()
    }

    // =========================================================================
    // BUILDER METHODS
    // =========================================================================

    pub fn with_character(mut self, character: impl Into<String>) -> Self {
        self.character = character.into();
        self
    }

    pub fn with_emotion(mut self, emotion: impl Into<String>) -> Self {
        self.emotion = emotion.into();
        self
    }

    pub fn with_action(mut self, action: impl Into<String>) -> Self {
        self.action = action.into();
        self
    }

    pub fn with_scene(mut self, scene: impl Into<String>) -> Self {
        self.scene = scene.into();
        self
    }

    pub fn with_search(mut self, search: impl Into<String>) -> Self {
        self.search = search.into();
        self
    }

    pub fn with_sort(mut self, sort: SortOrder) -> Self {
        self.sort = sort;
        self
    }

    pub fn with_special_filter(mut self, special: SpecialFilter) -> Self {
        self.special_filter = special;
        self
    }

    pub fn with_type(mut self, image_type: impl Into<String>) -> Self {
        self.image_type = image_type.into();
        self
    }

    pub fn with_mood(mut self, mood: impl Into<String>) -> Self {
        self.mood = mood.into();
        self
    }

    pub fn with_shape(mut self, shape: impl Into<String>) -> Self {
        self.shape = shape.into();
        self
    }

    pub fn with_purpose(mut self, purpose: impl Into<String>) -> Self {
        self.purpose = purpose.into();
        self
    }

    // =========================================================================
    // CONSTRAINT CHECKS
    // =========================================================================

    /// True when no dimension is constrained. Sort order is not a constraint.
    pub fn is_empty(&self) -> bool {
        self.active_dimension_count() == 0
    }

    /// Number of constrained dimensions, the special filter included.
    pub fn active_dimension_count(&self) -> usize {
        [
            &self.character,
            &self.emotion,
            &self.action,
            &self.scene,
            &self.search,
            &self.image_type,
            &self.mood,
            &self.shape,
            &self.purpose,
        ]
        .iter()
        .filter(|v| !v.is_empty())
        .count()
            + usize::from(!self.special_filter.is_none())
    }

    /// Whether the filter panel should offer a reset.
    ///
    /// Only the panel's own dimensions count here; search and the legacy tags
    /// are reset elsewhere.
    pub fn has_active_filters(&self) -> bool {
        !self.character.is_empty()
            || !self.emotion.is_empty()
            || !self.action.is_empty()
            || !self.scene.is_empty()
            || !self.special_filter.is_none()
    }
}

// =============================================================================
// MATCHING
// =============================================================================

fn optional_equals(field: &Option<String>, wanted: &str) -> bool {
    wanted.is_empty() || field.as_deref() == Some(wanted)
}

fn keywords_match(record: &ImageRecord, wanted: &str, lookup: fn(&str) -> &'static [&'static str]) -> bool {
    wanted.is_empty() || text_matches_keywords(record.description_text(), lookup(wanted))
}

fn search_matches(record: &ImageRecord, search: &str) -> bool {
    if search.is_empty() {
        return true;
    }
    let needle = search.to_lowercase();
    record.title.to_lowercase().contains(&needle)
        || record.description_text().to_lowercase().contains(&needle)
}

/// Whether one record satisfies every constrained dimension of `spec`.
///
/// Visibility and the special filter are not checked here.
pub fn matches(record: &ImageRecord, spec: &FilterSpec) -> bool {
    optional_equals(&record.character, &spec.character)
        && keywords_match(record, &spec.emotion, emotion_keywords)
        && keywords_match(record, &spec.action, action_keywords)
        && keywords_match(record, &spec.scene, scene_keywords)
        && optional_equals(&record.image_type, &spec.image_type)
        && optional_equals(&record.image_mood, &spec.mood)
        && optional_equals(&record.image_shape, &spec.shape)
        && optional_equals(&record.image_purpose, &spec.purpose)
        && search_matches(record, &spec.search)
}

/// Stable in-place sort by the given order.
pub fn sort_images(images: &mut [&ImageRecord], order: SortOrder) {
    match order {
        // Unparseable timestamps compare as None, i.e. oldest.
        SortOrder::Newest => images.sort_by_cached_key(|r| Reverse(r.created_at_parsed())),
        SortOrder::Oldest => images.sort_by_cached_key(|r| r.created_at_parsed()),
        SortOrder::Popular => images.sort_by_key(|r| Reverse(r.likes)),
        SortOrder::Title => images.sort_by(|a, b| a.title.cmp(&b.title)),
    }
}

/// Filter and sort `records` by `spec`.
///
/// Returns references into `records`; no record is copied or altered.
/// `spec.special_filter` is ignored here, see [`apply_special_filter`].
pub fn filter_images<'a>(records: &'a [ImageRecord], spec: &FilterSpec) -> Vec<&'a ImageRecord> {
    let mut images: Vec<&ImageRecord> = records
        .iter()
        .filter(|r| r.is_visible && matches(r, spec))
        .collect();
    sort_images(&mut images, spec.sort);

    trace!(
        input_count = records.len(),
        result_count = images.len(),
        sort = %spec.sort,
        "Filter pass complete"
    );
    images
}

/// Second, client-side pass for `popular` / `favorites`.
///
/// `popular_ids` is the engagement ranking, most popular first. With
/// [`SpecialFilter::Popular`] the result follows that ranking and the
/// earlier sort order is discarded.
pub fn apply_special_filter<'a>(
    images: Vec<&'a ImageRecord>,
    special: SpecialFilter,
    favorites: &[String],
    popular_ids: &[String],
) -> Vec<&'a ImageRecord> {
    match special {
        SpecialFilter::None => images,
        SpecialFilter::Favorites => {
            let favorites: HashSet<&str> = favorites.iter().map(String::as_str).collect();
            images
                .into_iter()
                .filter(|r| favorites.contains(r.id.as_str()))
                .collect()
        }
        SpecialFilter::Popular => {
            let rank: HashMap<&str, usize> = popular_ids
                .iter()
                .enumerate()
                .map(|(i, id)| (id.as_str(), i))
                .collect();
            let mut popular: Vec<(usize, &ImageRecord)> = images
                .into_iter()
                .filter_map(|r| rank.get(r.id.as_str()).map(|&i| (i, r)))
                .collect();
            popular.sort_by_key(|(i, _)| *i);
            popular.into_iter().map(|(_, r)| r).collect()
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================
