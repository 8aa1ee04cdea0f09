//! Facet counts and active-filter chips for the filter panel.
//!
//! Counts are computed over the unfiltered visible record set so each option
//! shows how many images it would select on its own.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::filter::{FilterSpec, SpecialFilter};
use crate::models::ImageRecord;
use crate::vocab::{text_matches_keywords, Action, Character, Emotion, Scene};

/// Number of visible records per character value.
///
/// Records without a character are not counted.
pub fn character_counts(records: &[ImageRecord]) -> BTreeMap<String, usize> {
    let mut counts = BTreeMap::new();
    for character in records
        .iter()
        .filter(|r| r.is_visible)
        .filter_map(|r| r.character.as_deref())
    {
        *counts.entry(character.to_string()).or_insert(0) += 1;
    }
    counts
}

fn keyword_counts<T: Copy + Ord>(
    records: &[ImageRecord],
    values: &[T],
    keywords: impl Fn(T) -> &'static [&'static str],
) -> BTreeMap<T, usize> {
    values
        .iter()
        .map(|&value| {
            let words = keywords(value);
            let count = records
                .iter()
                .filter(|r| r.is_visible && text_matches_keywords(r.description_text(), words))
                .count();
            (value, count)
        })
        .collect()
}

/// Number of visible records matching each emotion's keywords.
pub fn emotion_counts(records: &[ImageRecord]) -> BTreeMap<Emotion, usize> {
    keyword_counts(records, Emotion::ALL, |e| e.keywords())
}

/// Number of visible records matching each action's keywords.
pub fn action_counts(records: &[ImageRecord]) -> BTreeMap<Action, usize> {
    keyword_counts(records, Action::ALL, |a| a.keywords())
}

/// Number of visible records matching each scene's keywords.
pub fn scene_counts(records: &[ImageRecord]) -> BTreeMap<Scene, usize> {
    keyword_counts(records, Scene::ALL, |s| s.keywords())
}

/// Which spec field a chip clears when removed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum FilterKey {
    SpecialFilter,
    Character,
    Emotion,
    Action,
    Scene,
}

/// A removable chip describing one active filter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ActiveFilter {
    pub key: FilterKey,
    pub label: String,
}

/// Chips for the active panel filters, in display order.
///
/// Values that are not part of a vocabulary produce no chip.
pub fn active_filters(spec: &FilterSpec) -> Vec<ActiveFilter> {
    let mut chips = Vec::new();

    match spec.special_filter {
        SpecialFilter::Popular => chips.push(ActiveFilter {
            key: FilterKey::SpecialFilter,
            label: "🔥 인기".to_string(),
        }),
        SpecialFilter::Favorites => chips.push(ActiveFilter {
            key: FilterKey::SpecialFilter,
            label: "❤️ 즐겨찾기".to_string(),
        }),
        SpecialFilter::None => {}
    }

    if let Some(character) = Character::from_value(&spec.character) {
        chips.push(ActiveFilter {
            key: FilterKey::Character,
            label: character.label().to_string(),
        });
    }
    if let Some(emotion) = Emotion::from_value(&spec.emotion) {
        chips.push(ActiveFilter {
            key: FilterKey::Emotion,
            label: format!("{} {}", emotion.emoji(), emotion.label()),
        });
    }
    if let Some(action) = Action::from_value(&spec.action) {
        chips.push(ActiveFilter {
            key: FilterKey::Action,
            label: action.label().to_string(),
        });
    }
    if let Some(scene) = Scene::from_value(&spec.scene) {
        chips.push(ActiveFilter {
            key: FilterKey::Scene,
            label: scene.label().to_string(),
        });
    }

    chips
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gallery() -> Vec<ImageRecord> {
        vec![
            ImageRecord::new("1", "a", "2025-01-01")
                .with_character("sowon")
                .with_description("smile at home"),
            ImageRecord::new("2", "b", "2025-01-01")
                .with_character("sowon")
                .with_description("office conference"),
            ImageRecord::new("3", "c", "2025-01-01")
                .with_character("mom")
                .with_description("휴식 중"),
            ImageRecord::new("4", "d", "2025-01-01").with_description("smile"),
            ImageRecord::new("5", "e", "2025-01-01")
                .with_character("mom")
                .with_description("smile")
                .hidden(),
        ]
    }

    #[test]
    fn test_character_counts_skip_missing_and_hidden() {
        let counts = character_counts(&gallery());
        assert_eq!(counts.get("sowon"), Some(&2));
        assert_eq!(counts.get("mom"), Some(&1));
        assert_eq!(counts.len(), 2);
    }

    #[test]
    fn test_emotion_counts() {
        let counts = emotion_counts(&gallery());
        assert_eq!(counts[&Emotion::Happy], 2);
        assert_eq!(counts[&Emotion::Calm], 1);
        assert_eq!(counts[&Emotion::Worried], 0);
        assert_eq!(counts.len(), Emotion::ALL.len());
    }

    #[test]
    fn test_action_and_scene_counts_overlap() {
        let records = gallery();
        let actions = action_counts(&records);
        assert_eq!(actions[&Action::Talking], 1);
        assert_eq!(actions[&Action::Resting], 1);
        let scenes = scene_counts(&records);
        assert_eq!(scenes[&Scene::Office], 1);
        assert_eq!(scenes[&Scene::Home], 1);
        assert_eq!(scenes[&Scene::Street], 0);
    }

    #[test]
    fn test_active_filter_chips_in_order() {
        let spec = FilterSpec::new()
            .with_scene("office")
            .with_emotion("love")
            .with_character("grandma")
            .with_special_filter(SpecialFilter::Popular);
        let chips = active_filters(&spec);
        let keys: Vec<FilterKey> = chips.iter().map(|c| c.key).collect();
        assert_eq!(
            keys,
            vec![
                FilterKey::SpecialFilter,
                FilterKey::Character,
                FilterKey::Emotion,
                FilterKey::Scene
            ]
        );
        assert_eq!(chips[1].label, "할머니");
        assert_eq!(chips[2].label, "💕 사랑");
    }

    #[test]
    fn test_unknown_values_produce_no_chip() {
        let spec = FilterSpec::new().with_character("uncle").with_action("flying");
        assert!(active_filters(&spec).is_empty());
    }
}
