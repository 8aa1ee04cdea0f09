//! Fixed tag vocabularies and keyword tables.
//!
//! Characters, emotions, actions and scenes are closed enumerations. Emotion,
//! action and scene are not stored on the record: a record belongs to one of
//! them when its description contains any of the value's keywords (English and
//! Korean synonyms).
//!
//! Lookups by string never fail. An unknown value yields an empty keyword
//! slice, which matches nothing.

use serde::{Deserialize, Serialize};

/// Defines a closed vocabulary enum with its stored value and display label.
macro_rules! vocabulary {
    (
        $(#[$meta:meta])*
        $name:ident {
            $( $variant:ident => ($value:literal, $label:literal) ),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(rename_all = "lowercase")]
        pub enum $name {
            $( $variant ),+
        }

        impl $name {
            /// Every value, in display order.
            pub const ALL: &'static [$name] = &[ $( $name::$variant ),+ ];

            /// Stored/spec value.
            pub fn value(&self) -> &'static str {
                match self {
                    $( Self::$variant => $value ),+
                }
            }

            /// Korean display label.
            pub fn label(&self) -> &'static str {
                match self {
                    $( Self::$variant => $label ),+
                }
            }

            /// Look up a value, `None` when it is not part of the vocabulary.
            pub fn from_value(value: &str) -> Option<Self> {
                match value {
                    $( $value => Some(Self::$variant), )+
                    _ => None,
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.value())
            }
        }

        impl std::str::FromStr for $name {
            type Err = String;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Self::from_value(&s.to_lowercase())
                    .ok_or_else(|| format!("Invalid {}: {}", stringify!($name), s))
            }
        }
    };
}

vocabulary! {
    /// Family characters appearing in the gallery.
    Character {
        Sowon => ("sowon", "소원"),
        Mom => ("mom", "엄마"),
        Dad => ("dad", "아빠"),
        Grandma => ("grandma", "할머니"),
        Grandpa => ("grandpa", "할아버지"),
        Baby => ("baby", "아기"),
    }
}

vocabulary! {
    /// Emotion / expression categories. Also the legacy mood vocabulary.
    Emotion {
        Happy => ("happy", "기쁨"),
        Excited => ("excited", "신남"),
        Love => ("love", "사랑"),
        Surprised => ("surprised", "놀람"),
        Confused => ("confused", "당황"),
        Worried => ("worried", "걱정"),
        Thinking => ("thinking", "생각중"),
        Proud => ("proud", "뿌듯"),
        Touched => ("touched", "감동"),
        Calm => ("calm", "평온"),
    }
}

vocabulary! {
    /// Action / situation categories.
    Action {
        Greeting => ("greeting", "인사"),
        Working => ("working", "일하기"),
        Playing => ("playing", "놀기"),
        Celebrating => ("celebrating", "축하"),
        Exercising => ("exercising", "운동"),
        Resting => ("resting", "휴식"),
        Shopping => ("shopping", "쇼핑"),
        Talking => ("talking", "대화"),
        Posing => ("posing", "포즈"),
    }
}

vocabulary! {
    /// Scene / background categories.
    Scene {
        Home => ("home", "집"),
        Outdoor => ("outdoor", "야외"),
        Office => ("office", "사무실"),
        Street => ("street", "거리"),
        Simple => ("simple", "단순배경"),
    }
}

vocabulary! {
    /// Legacy `image_type` values.
    ImageType {
        Photo => ("photo", "사진"),
        Illustration => ("illustration", "일러스트"),
        Icon => ("icon", "아이콘"),
        Graphic => ("graphic", "그래픽"),
        Character => ("character", "캐릭터"),
    }
}

vocabulary! {
    /// Legacy `image_shape` values.
    ImageShape {
        Square => ("square", "정사각형"),
        Portrait => ("portrait", "세로형"),
        Landscape => ("landscape", "가로형"),
        Banner => ("banner", "배너형"),
        Story => ("story", "스토리형"),
    }
}

vocabulary! {
    /// Legacy `image_purpose` values.
    ImagePurpose {
        Sns => ("sns", "SNS"),
        Blog => ("blog", "블로그"),
        Profile => ("profile", "프로필"),
        Wallpaper => ("wallpaper", "배경화면"),
        Print => ("print", "인쇄물"),
        Presentation => ("presentation", "프레젠테이션"),
    }
}

// =============================================================================
// KEYWORD TABLES
// =============================================================================

impl Emotion {
    pub fn emoji(&self) -> &'static str {
        match self {
            Self::Happy => "😊",
            Self::Excited => "🎉",
            Self::Love => "💕",
            Self::Surprised => "😲",
            Self::Confused => "😅",
            Self::Worried => "😟",
            Self::Thinking => "🤔",
            Self::Proud => "😤",
            Self::Touched => "🥹",
            Self::Calm => "😌",
        }
    }

    pub fn keywords(&self) -> &'static [&'static str] {
        match self {
            Self::Happy => &["smile", "cute", "laugh", "미소", "웃음", "귀여움"],
            Self::Excited => &["dance", "celebrate", "excited", "춤", "축하", "신남"],
            Self::Love => &["heart", "love", "하트", "사랑"],
            Self::Surprised => &["surprised", "shocked", "놀람", "충격"],
            Self::Confused => &["confused", "혼란", "당황"],
            Self::Worried => &["worried", "걱정"],
            Self::Thinking => &["thinking", "curious", "memo", "생각", "호기심", "메모"],
            Self::Proud => &["proud", "thumbsup", "자랑", "엄지척", "뿌듯"],
            Self::Touched => &["touched", "감동"],
            Self::Calm => &["rest", "calm", "dreaming", "휴식", "평온", "꿈꾸는"],
        }
    }
}

impl Action {
    pub fn keywords(&self) -> &'static [&'static str] {
        match self {
            Self::Greeting => &["greeting", "bow", "인사"],
            Self::Working => &["working", "memo", "conference", "일하는", "메모", "회의"],
            Self::Playing => &["dance", "playing", "춤", "놀기"],
            Self::Celebrating => &["celebrate", "party", "축하"],
            Self::Exercising => &["exercise", "운동"],
            Self::Resting => &["rest", "dreaming", "휴식", "꿈꾸는"],
            Self::Shopping => &["shopping", "쇼핑"],
            Self::Talking => &["talking", "conference", "대화", "회의"],
            Self::Posing => &["selfie", "default", "posing", "셀피", "기본", "포즈"],
        }
    }
}

impl Scene {
    pub fn keywords(&self) -> &'static [&'static str] {
        match self {
            Self::Home => &["home", "홈", "집"],
            Self::Outdoor => &["street", "outdoor", "거리", "야외"],
            Self::Office => &["conference", "office", "working", "회의", "사무실", "일하는"],
            Self::Street => &["street", "거리"],
            Self::Simple => &["default", "simple", "기본", "단순"],
        }
    }
}

/// Keywords for an emotion spec value; empty for unknown values.
pub fn emotion_keywords(value: &str) -> &'static [&'static str] {
    Emotion::from_value(value).map(|e| e.keywords()).unwrap_or(&[])
}

/// Keywords for an action spec value; empty for unknown values.
pub fn action_keywords(value: &str) -> &'static [&'static str] {
    Action::from_value(value).map(|a| a.keywords()).unwrap_or(&[])
}

/// Keywords for a scene spec value; empty for unknown values.
pub fn scene_keywords(value: &str) -> &'static [&'static str] {
    Scene::from_value(value).map(|s| s.keywords()).unwrap_or(&[])
}

/// True if `text` contains any keyword, ignoring case.
///
/// An empty keyword list never matches.
pub fn text_matches_keywords(text: &str, keywords: &[&str]) -> bool {
    let haystack = text.to_lowercase();
    keywords
        .iter()
        .any(|keyword| haystack.contains(&keyword.to_lowercase()))
}

// =============================================================================
// TAG OPTIONS
// =============================================================================

/// A selectable filter option as presented to the user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TagOption {
    pub value: &'static str,
    pub label: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub emoji: Option<&'static str>,
}

/// Every option list the filter panel renders.
#[derive(Debug, Clone, Serialize)]
pub struct TagOptions {
    pub characters: Vec<TagOption>,
    pub emotions: Vec<TagOption>,
    pub actions: Vec<TagOption>,
    pub scenes: Vec<TagOption>,
    pub types: Vec<TagOption>,
    pub moods: Vec<TagOption>,
    pub shapes: Vec<TagOption>,
    pub purposes: Vec<TagOption>,
}

fn plain_options(pairs: impl Iterator<Item = (&'static str, &'static str)>) -> Vec<TagOption> {
    pairs
        .map(|(value, label)| TagOption {
            value,
            label,
            emoji: None,
        })
        .collect()
}

impl TagOptions {
    pub fn all() -> Self {
        Self {
            characters: plain_options(Character::ALL.iter().map(|c| (c.value(), c.label()))),
            emotions: Emotion::ALL
                .iter()
                .map(|e| TagOption {
                    value: e.value(),
                    label: e.label(),
                    emoji: Some(e.emoji()),
                })
                .collect(),
            actions: plain_options(Action::ALL.iter().map(|a| (a.value(), a.label()))),
            scenes: plain_options(Scene::ALL.iter().map(|s| (s.value(), s.label()))),
            types: plain_options(ImageType::ALL.iter().map(|t| (t.value(), t.label()))),
            moods: plain_options(Emotion::ALL.iter().map(|e| (e.value(), e.label()))),
            shapes: plain_options(ImageShape::ALL.iter().map(|s| (s.value(), s.label()))),
            purposes: plain_options(ImagePurpose::ALL.iter().map(|p| (p.value(), p.label()))),
        }
    }
}
