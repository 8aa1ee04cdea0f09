//! Gallery record types.
//!
//! [`ImageRecord`] mirrors one row of the externally hosted `images` table.
//! The core never mutates records; filtering returns references into the
//! caller's slice.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

/// One gallery image's metadata row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageRecord {
    /// Opaque unique identifier.
    pub id: String,
    pub title: String,
    /// Free text; also the substrate for emotion/action/scene matching.
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub file_path: String,
    #[serde(default)]
    pub file_name: String,
    #[serde(default)]
    pub width: Option<u32>,
    #[serde(default)]
    pub height: Option<u32>,
    /// One of the [`Character`](crate::vocab::Character) values, or absent.
    #[serde(default)]
    pub character: Option<String>,
    #[serde(default)]
    pub image_type: Option<String>,
    #[serde(default)]
    pub image_mood: Option<String>,
    #[serde(default)]
    pub image_shape: Option<String>,
    #[serde(default)]
    pub image_purpose: Option<String>,
    #[serde(default)]
    pub tags: Option<Vec<String>>,
    /// Stored like counter, used by the `popular` sort order.
    #[serde(default)]
    pub likes: u32,
    #[serde(default = "default_visible")]
    pub is_visible: bool,
    pub created_at: String,
    #[serde(default)]
    pub updated_at: String,
}

fn default_visible() -> bool {
    true
}

impl ImageRecord {
    /// Create a visible record with the given id, title and creation time.
    pub fn new(
        id: impl Into<String>,
        title: impl Into<String>,
        created_at: impl Into<String>,
    ) -> Self {
        let created_at = created_at.into();
        Self {
            id: id.into(),
            title: title.into(),
            description: None,
            file_path: String::new(),
            file_name: String::new(),
            width: None,
            height: None,
            character: None,
            image_type: None,
            image_mood: None,
            image_shape: None,
            image_purpose: None,
            tags: None,
            likes: 0,
            is_visible: true,
            updated_at: created_at.clone(),
            created_at,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_character(mut self, character: impl Into<String>) -> Self {
        self.character = Some(character.into());
        self
    }

    pub fn with_likes(mut self, likes: u32) -> Self {
        self.likes = likes;
        self
    }

    pub fn with_type(mut self, image_type: impl Into<String>) -> Self {
        self.image_type = Some(image_type.into());
        self
    }

    pub fn with_mood(mut self, mood: impl Into<String>) -> Self {
        self.image_mood = Some(mood.into());
        self
    }

    pub fn with_shape(mut self, shape: impl Into<String>) -> Self {
        self.image_shape = Some(shape.into());
        self
    }

    pub fn with_purpose(mut self, purpose: impl Into<String>) -> Self {
        self.image_purpose = Some(purpose.into());
        self
    }

    /// Mark the record hidden.
    pub fn hidden(mut self) -> Self {
        self.is_visible = false;
        self
    }

    /// Description as text, empty when absent.
    pub fn description_text(&self) -> &str {
        self.description.as_deref().unwrap_or("")
    }

    /// Parse `created_at`.
    ///
    /// Accepts RFC 3339, `YYYY-MM-DD HH:MM:SS[.frac]` (taken as UTC) and a bare
    /// `YYYY-MM-DD`. Returns `None` for anything else.
    pub fn created_at_parsed(&self) -> Option<DateTime<Utc>> {
        parse_timestamp(&self.created_at)
    }
}

/// Parse a stored timestamp string into UTC.
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    for fmt in ["%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S%.f"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, fmt) {
            return Some(naive.and_utc());
        }
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}
