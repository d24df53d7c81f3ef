//! Category configuration for the extraction engine.
//!
//! A `CategoryConfig` is built once at startup (from the built-in dictionary or a JSON
//! file), validated, and then shared read-only across every extraction call.

use std::collections::HashSet;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::dictionary::{DEFAULT_NOTES, DEFAULT_WHEN_TO_SEE_A_DOCTOR, MEDICAL_SECTIONS};
use crate::error::ConfigError;
use crate::model::RESERVED_KEYS;

/// A clinical category and the keywords that select text for it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategorySpec {
    /// Output key, e.g. "symptoms"
    pub name: String,
    /// Lowercase match strings, tried in order
    pub keywords: Vec<String>,
    /// Score contributed by each matching keyword
    #[serde(default = "default_weight")]
    pub weight: f64,
    /// Per-category override of `ExtractionOptions::max_per_category`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limit: Option<usize>,
}

fn default_weight() -> f64 {
    1.0
}

impl CategorySpec {
    pub fn new(name: impl Into<String>, keywords: &[&str]) -> Self {
        Self {
            name: name.into(),
            keywords: keywords.iter().map(|k| k.to_string()).collect(),
            weight: default_weight(),
            limit: None,
        }
    }

    pub fn with_weight(mut self, weight: f64) -> Self {
        self.weight = weight;
        self
    }

    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }
}

/// Static advisory text attached to every result. Never derived from the input.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Advisory {
    pub when_to_see_a_doctor: String,
    pub notes: String,
}

impl Default for Advisory {
    fn default() -> Self {
        Self {
            when_to_see_a_doctor: DEFAULT_WHEN_TO_SEE_A_DOCTOR.to_string(),
            notes: DEFAULT_NOTES.to_string(),
        }
    }
}

/// How a keyword is located inside a segment.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchMode {
    /// Plain substring containment. "test" matches "contest".
    #[default]
    Substring,
    /// Substring whose neighbours are not alphanumeric.
    WordBoundary,
}

/// Pipeline tunables. Every field has a default so a config file may set only a few.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractionOptions {
    /// Final cap on fragments per category
    pub max_per_category: usize,
    /// Cap on the scored-sentence list before bullets are merged in
    pub primary_limit: usize,
    /// Sentences with fewer characters are ignored
    pub min_sentence_chars: usize,
    /// Bullet fragments with fewer characters are ignored
    pub min_bullet_chars: usize,
    /// Only the first `max_bullets` bullet fragments are considered
    pub max_bullets: usize,
    /// Sum weights over every matching keyword instead of scoring a single hit
    pub weighted_scoring: bool,
    /// Union keyword-matching bullet fragments into each category
    pub bullet_merge: bool,
    pub match_mode: MatchMode,
}

impl Default for ExtractionOptions {
    fn default() -> Self {
        Self {
            max_per_category: 10,
            primary_limit: 8,
            min_sentence_chars: 7,
            min_bullet_chars: 5,
            max_bullets: 8,
            weighted_scoring: true,
            bullet_merge: true,
            match_mode: MatchMode::Substring,
        }
    }
}

impl ExtractionOptions {
    fn validate(&self) -> Result<(), ConfigError> {
        let positive = [
            ("max_per_category", self.max_per_category),
            ("primary_limit", self.primary_limit),
            ("min_sentence_chars", self.min_sentence_chars),
            ("min_bullet_chars", self.min_bullet_chars),
        ];
        for (name, value) in positive {
            if value == 0 {
                return Err(ConfigError::InvalidOption {
                    name,
                    message: "must be at least 1".to_string(),
                });
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CategoryConfig {
    categories: Vec<CategorySpec>,
    advisory: Advisory,
    options: ExtractionOptions,
}

/// On-disk shape of a category configuration file.
#[derive(Debug, Deserialize)]
struct ConfigFile {
    categories: Vec<CategorySpec>,
    #[serde(default)]
    advisory: Advisory,
    #[serde(default)]
    options: ExtractionOptions,
}

impl CategoryConfig {
    /// Validate and build a configuration.
    ///
    /// A category without keywords is accepted with a warning: it simply never matches.
    pub fn new(
        categories: Vec<CategorySpec>,
        advisory: Advisory,
        options: ExtractionOptions,
    ) -> Result<Self, ConfigError> {
        if categories.is_empty() {
            return Err(ConfigError::NoCategories);
        }
        options.validate()?;

        let mut names = HashSet::new();
        for spec in &categories {
            validate_spec(spec)?;
            if !names.insert(spec.name.as_str()) {
                return Err(ConfigError::DuplicateCategory(spec.name.clone()));
            }
            if spec.keywords.is_empty() {
                warn!(category = %spec.name, "category has no keywords and will always be empty");
            }
        }

        Ok(Self {
            categories,
            advisory,
            options,
        })
    }

    /// The built-in seven-section medical dictionary with default options.
    pub fn medical_default() -> Self {
        let categories = MEDICAL_SECTIONS
            .iter()
            .map(|(name, keywords)| CategorySpec::new(*name, keywords))
            .collect();
        Self {
            categories,
            advisory: Advisory::default(),
            options: ExtractionOptions::default(),
        }
    }

    pub fn from_json_str(content: &str, origin: &str) -> Result<Self, ConfigError> {
        let file: ConfigFile = serde_json::from_str(content).map_err(|e| ConfigError::Parse {
            path: origin.to_string(),
            source: e,
        })?;
        Self::new(file.categories, file.advisory, file.options)
    }

    pub fn from_path(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.display().to_string(),
            source: e,
        })?;
        Self::from_json_str(&content, &path.display().to_string())
    }

    pub fn with_advisory(mut self, advisory: Advisory) -> Self {
        self.advisory = advisory;
        self
    }

    pub fn categories(&self) -> &[CategorySpec] {
        &self.categories
    }

    pub fn advisory(&self) -> &Advisory {
        &self.advisory
    }

    pub fn options(&self) -> &ExtractionOptions {
        &self.options
    }

    /// Output cap for one category.
    pub fn cap_for(&self, spec: &CategorySpec) -> usize {
        spec.limit.unwrap_or(self.options.max_per_category)
    }
}

fn validate_spec(spec: &CategorySpec) -> Result<(), ConfigError> {
    if spec.name.trim().is_empty() {
        return Err(ConfigError::EmptyName);
    }
    if RESERVED_KEYS.contains(&spec.name.as_str()) {
        return Err(ConfigError::ReservedName(spec.name.clone()));
    }
    if !spec.weight.is_finite() || spec.weight <= 0.0 {
        return Err(ConfigError::InvalidWeight {
            category: spec.name.clone(),
            weight: spec.weight,
        });
    }
    if spec.limit == Some(0) {
        return Err(ConfigError::InvalidLimit(spec.name.clone()));
    }

    let mut seen = HashSet::new();
    for keyword in &spec.keywords {
        if keyword.trim().is_empty() || *keyword != keyword.to_lowercase() {
            return Err(ConfigError::InvalidKeyword {
                category: spec.name.clone(),
                keyword: keyword.clone(),
            });
        }
        if !seen.insert(keyword.as_str()) {
            return Err(ConfigError::DuplicateKeyword {
                category: spec.name.clone(),
                keyword: keyword.clone(),
            });
        }
    }
    Ok(())
}
