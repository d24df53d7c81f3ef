use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};

use crate::extract::NO_TEXT_NOTICE;

/// Top-level keys written next to the category lists. No category may use them.
pub const RESERVED_KEYS: &[&str] = &["when_to_see_a_doctor", "notes", "notice"];

/// A document submitted for extraction.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawDocument {
    pub title: Option<String>,
    pub summary: Option<String>,
    /// Article body, may contain HTML markup
    #[serde(default)]
    pub body: String,
}

impl RawDocument {
    pub fn from_body(body: impl Into<String>) -> Self {
        Self {
            body: body.into(),
            ..Self::default()
        }
    }

    /// Title, summary and body joined by blank lines, skipping blank parts.
    pub fn combined_text(&self) -> String {
        [self.title.as_deref(), self.summary.as_deref(), Some(self.body.as_str())]
            .into_iter()
            .flatten()
            .filter(|part| !part.trim().is_empty())
            .collect::<Vec<_>>()
            .join("\n\n")
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Origin {
    Sentence,
    Bullet,
}

/// A candidate unit of text: one sentence or one bullet fragment.
#[derive(Debug, Clone, PartialEq)]
pub struct Segment {
    /// Trimmed text in its original case
    pub text: String,
    /// Lowercase view used for keyword matching
    pub lower: String,
    pub origin: Origin,
    /// Index within the split that produced it; only used to break ties
    pub position: usize,
}

impl Segment {
    pub fn new(text: &str, origin: Origin, position: usize) -> Self {
        Self {
            text: text.to_string(),
            lower: text.to_lowercase(),
            origin,
            position,
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct ScoredCandidate<'a> {
    pub segment: &'a Segment,
    pub score: f64,
}

/// One category's slot in a result.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Section {
    pub category: String,
    pub fragments: Vec<String>,
}

/// Per-category fragments plus the fixed advisory fields.
///
/// Serializes as a flat JSON object: one array per category in configuration order,
/// then `when_to_see_a_doctor`, `notes`, and `notice` when present.
#[derive(Debug, Clone, PartialEq)]
pub struct ExtractionResult {
    pub sections: Vec<Section>,
    pub when_to_see_a_doctor: String,
    pub notes: String,
    /// Why the result is degraded, or which fallback produced it
    pub notice: Option<String>,
}

impl ExtractionResult {
    pub fn get(&self, category: &str) -> Option<&[String]> {
        self.sections
            .iter()
            .find(|s| s.category == category)
            .map(|s| s.fragments.as_slice())
    }

    /// True only when there was no usable text. A fallback notice alone does not count.
    pub fn is_degraded(&self) -> bool {
        self.notice.as_deref() == Some(NO_TEXT_NOTICE)
    }

    pub fn is_empty(&self) -> bool {
        self.sections.iter().all(|s| s.fragments.is_empty())
    }
}

impl Serialize for ExtractionResult {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let len = self.sections.len() + 2 + usize::from(self.notice.is_some());
        let mut map = serializer.serialize_map(Some(len))?;
        for section in &self.sections {
            map.serialize_entry(&section.category, &section.fragments)?;
        }
        map.serialize_entry("when_to_see_a_doctor", &self.when_to_see_a_doctor)?;
        map.serialize_entry("notes", &self.notes)?;
        if let Some(notice) = &self.notice {
            map.serialize_entry("notice", notice)?;
        }
        map.end()
    }
}
