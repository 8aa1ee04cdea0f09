//! Behavioural properties of the filter engine over realistic record sets.

use sowonee_core::{
    apply_special_filter, filter_images, Action, Emotion, FilterSpec, ImageRecord, Scene,
    SortOrder, SpecialFilter,
};

fn ids(images: &[&ImageRecord]) -> Vec<String> {
    images.iter().map(|r| r.id.clone()).collect()
}

fn sample_gallery() -> Vec<ImageRecord> {
    vec![
        ImageRecord::new("s1", "소원 미소", "2025-02-01T10:00:00Z")
            .with_character("sowon")
            .with_description("미소짓는 소원이")
            .with_likes(3),
        ImageRecord::new("s2", "소원 인사", "2025-02-03T10:00:00Z")
            .with_character("sowon")
            .with_description("greeting bow at home")
            .with_likes(10),
        ImageRecord::new("m1", "엄마 회의", "2025-02-02T10:00:00Z")
            .with_character("mom")
            .with_description("conference at the office")
            .with_likes(5),
        ImageRecord::new("d1", "아빠 쇼핑", "2025-01-15T10:00:00Z")
            .with_character("dad")
            .with_description("shopping on the street"),
        ImageRecord::new("h1", "숨김", "2025-03-01T10:00:00Z")
            .with_character("sowon")
            .with_description("smile")
            .hidden(),
    ]
}

#[test]
fn test_filter_is_pure_projection() {
    let records = sample_gallery();
    let spec = FilterSpec::new().with_character("sowon").with_sort(SortOrder::Popular);

    let first = ids(&filter_images(&records, &spec));
    let second = ids(&filter_images(&records, &spec));

    assert_eq!(first, second);
    assert_eq!(records, sample_gallery(), "records must not be mutated");
}

#[test]
fn test_identity_filter_returns_all_visible_sorted() {
    let records = sample_gallery();
    let shown = filter_images(&records, &FilterSpec::new());

    assert_eq!(shown.len(), 4);
    assert_eq!(ids(&shown), vec!["s2", "m1", "s1", "d1"]);

    let oldest = filter_images(&records, &FilterSpec::new().with_sort(SortOrder::Oldest));
    assert_eq!(ids(&oldest), vec!["d1", "s1", "m1", "s2"]);
}

#[test]
fn test_empty_input_yields_empty_output() {
    let spec = FilterSpec::new()
        .with_character("mom")
        .with_special_filter(SpecialFilter::Popular);
    assert!(filter_images(&[], &spec).is_empty());
    assert!(filter_images(&[], &FilterSpec::new()).is_empty());
}

#[test]
fn test_category_or_within_dimension() {
    let records = vec![ImageRecord::new("a", "t", "2025-01-01").with_description("미소짓는 소원이")];

    let happy = filter_images(&records, &FilterSpec::new().with_emotion("happy"));
    assert_eq!(ids(&happy), vec!["a"]);

    let worried = filter_images(&records, &FilterSpec::new().with_emotion("worried"));
    assert!(worried.is_empty());
}

#[test]
fn test_and_across_dimensions() {
    let records = sample_gallery();
    let spec = FilterSpec::new().with_character("sowon").with_search("bow");

    let shown = filter_images(&records, &spec);
    assert_eq!(ids(&shown), vec!["s2"]);

    let spec = FilterSpec::new().with_character("sowon").with_search("office");
    assert!(filter_images(&records, &spec).is_empty());
}

#[test]
fn test_newest_sort_is_stable_on_ties() {
    let records = vec![
        ImageRecord::new("first", "x", "2025-05-05T05:05:05Z"),
        ImageRecord::new("second", "y", "2025-05-05T05:05:05Z"),
        ImageRecord::new("third", "z", "2025-05-05T05:05:05Z"),
    ];
    let shown = filter_images(&records, &FilterSpec::new().with_sort(SortOrder::Newest));
    assert_eq!(ids(&shown), vec!["first", "second", "third"]);

    let shown = filter_images(&records, &FilterSpec::new().with_sort(SortOrder::Popular));
    assert_eq!(ids(&shown), vec!["first", "second", "third"]);
}

#[test]
fn test_hidden_record_never_reincluded_by_special_filter() {
    let records = sample_gallery();
    let shown = filter_images(&records, &FilterSpec::new());
    let popular = vec!["h1".to_string(), "s1".to_string()];
    let favorites = vec!["h1".to_string()];

    let by_popularity = apply_special_filter(shown.clone(), SpecialFilter::Popular, &favorites, &popular);
    assert_eq!(ids(&by_popularity), vec!["s1"]);

    let by_favorite = apply_special_filter(shown, SpecialFilter::Favorites, &favorites, &popular);
    assert!(by_favorite.is_empty());
}

#[test]
fn test_popular_special_filter_overrides_sort() {
    let records = sample_gallery();
    let spec = FilterSpec::new()
        .with_sort(SortOrder::Title)
        .with_special_filter(SpecialFilter::Popular);
    let popular = vec!["d1".to_string(), "s2".to_string(), "m1".to_string()];

    let shown = apply_special_filter(filter_images(&records, &spec), spec.special_filter, &[], &popular);
    assert_eq!(ids(&shown), vec!["d1", "s2", "m1"]);
}

#[test]
fn test_every_category_has_true_positive_and_true_negative() {
    let negative = ImageRecord::new("neg", "t", "2025-01-01").with_description("qqq unrelated");

    for emotion in Emotion::ALL {
        let keyword = emotion.keywords()[0];
        let positive = ImageRecord::new("pos", "t", "2025-01-01")
            .with_description(format!("a {} picture", keyword.to_uppercase()));
        let records = vec![positive, negative.clone()];
        let shown = filter_images(&records, &FilterSpec::new().with_emotion(emotion.value()));
        assert_eq!(ids(&shown), vec!["pos"], "emotion {}", emotion);
    }

    for action in Action::ALL {
        let keyword = action.keywords()[0];
        let positive = ImageRecord::new("pos", "t", "2025-01-01").with_description(keyword);
        let records = vec![positive, negative.clone()];
        let shown = filter_images(&records, &FilterSpec::new().with_action(action.value()));
        assert_eq!(ids(&shown), vec!["pos"], "action {}", action);
    }

    for scene in Scene::ALL {
        let keyword = scene.keywords()[0];
        let positive = ImageRecord::new("pos", "t", "2025-01-01").with_description(keyword);
        let records = vec![positive, negative.clone()];
        let shown = filter_images(&records, &FilterSpec::new().with_scene(scene.value()));
        assert_eq!(ids(&shown), vec!["pos"], "scene {}", scene);
    }
}

#[test]
fn test_korean_synonyms_match() {
    let records = vec![
        ImageRecord::new("k1", "t", "2025-01-01").with_description("소원이가 운동하는 모습"),
        ImageRecord::new("k2", "t", "2025-01-01").with_description("사무실에서 일하는 엄마"),
    ];
    let exercising = filter_images(&records, &FilterSpec::new().with_action("exercising"));
    assert_eq!(ids(&exercising), vec!["k1"]);

    let office = filter_images(&records, &FilterSpec::new().with_scene("office"));
    assert_eq!(ids(&office), vec!["k2"]);
}
