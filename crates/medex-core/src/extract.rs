//! Extraction coordinator.
//!
//! Runs the linear pipeline Normalize → Segment → {per category: Score → Rank → Merge}
//! → Assemble. The extractor holds only the shared, immutable configuration, so one
//! instance can serve any number of concurrent callers.

use std::collections::HashSet;
use std::sync::Arc;

use tracing::debug;

use crate::config::{CategoryConfig, CategorySpec};
use crate::merge::merge_bullets;
use crate::model::{ExtractionResult, RawDocument, Section, Segment};
use crate::normalize::normalize;
use crate::rank::rank;
use crate::score::score_segments;
use crate::segment;

pub const NO_TEXT_NOTICE: &str = "No text received.";

#[derive(Debug, Clone)]
pub struct Extractor {
    config: Arc<CategoryConfig>,
}

impl Extractor {
    pub fn new(config: Arc<CategoryConfig>) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &CategoryConfig {
        &self.config
    }

    pub fn extract(&self, document: &RawDocument) -> ExtractionResult {
        self.extract_text(&document.combined_text())
    }

    /// Extract from raw (possibly marked-up) text. Total: any input, including the empty
    /// string, yields a structurally complete result.
    pub fn extract_text(&self, raw: &str) -> ExtractionResult {
        let text = normalize(raw);
        if text.is_empty() {
            debug!("no usable text, returning degraded result");
            return self.degraded(NO_TEXT_NOTICE);
        }

        let options = self.config.options();
        let sentences = segment::sentences(&text, options.min_sentence_chars);
        let bullets = if options.bullet_merge {
            segment::bullets(&text, options.min_bullet_chars, options.max_bullets)
        } else {
            Vec::new()
        };

        let sections: Vec<Section> = self
            .config
            .categories()
            .iter()
            .map(|spec| Section {
                category: spec.name.clone(),
                fragments: self.extract_category(spec, &sentences, &bullets),
            })
            .collect();

        debug!(
            chars = text.len(),
            sentences = sentences.len(),
            bullets = bullets.len(),
            fragments = sections.iter().map(|s| s.fragments.len()).sum::<usize>(),
            "extraction complete"
        );

        self.assemble(sections, None)
    }

    fn extract_category(
        &self,
        spec: &CategorySpec,
        sentences: &[Segment],
        bullets: &[Segment],
    ) -> Vec<String> {
        let options = self.config.options();
        let policy = options.match_mode.policy();
        let cap = self.config.cap_for(spec);

        let candidates = score_segments(sentences, spec, policy, options.weighted_scoring);
        let primary = rank(candidates, options.primary_limit.min(cap));
        if bullets.is_empty() {
            return primary;
        }
        merge_bullets(primary, bullets, spec, policy, cap)
    }

    /// Every configured category with an empty list, plus `notice`.
    pub fn degraded(&self, notice: &str) -> ExtractionResult {
        let sections = self
            .config
            .categories()
            .iter()
            .map(|spec| Section {
                category: spec.name.clone(),
                fragments: Vec::new(),
            })
            .collect();
        self.assemble(sections, Some(notice.to_string()))
    }

    /// Build a result from fragments proposed by an outside source (such as a language
    /// model), holding them to the same invariants as keyword extraction.
    ///
    /// A fragment survives only if, once trimmed, it is a substring of the normalized
    /// `raw` text at least `min_bullet_chars` long and not already listed. Unknown
    /// categories are ignored and missing ones come back empty.
    pub fn verify<I>(&self, raw: &str, proposed: I) -> ExtractionResult
    where
        I: IntoIterator<Item = (String, Vec<String>)>,
    {
        let text = normalize(raw);
        if text.is_empty() {
            return self.degraded(NO_TEXT_NOTICE);
        }

        let mut proposed: Vec<(String, Vec<String>)> = proposed.into_iter().collect();
        let min_chars = self.config.options().min_bullet_chars;

        let sections = self
            .config
            .categories()
            .iter()
            .map(|spec| {
                let fragments = proposed
                    .iter_mut()
                    .find(|(category, _)| *category == spec.name)
                    .map(|(_, fragments)| std::mem::take(fragments))
                    .unwrap_or_default();

                let mut seen = HashSet::new();
                let verified: Vec<String> = fragments
                    .iter()
                    .map(|f| f.trim())
                    .filter(|f| f.chars().count() >= min_chars && text.contains(*f))
                    .filter(|f| seen.insert(f.to_string()))
                    .take(self.config.cap_for(spec))
                    .map(str::to_string)
                    .collect();

                if verified.len() < fragments.len() {
                    debug!(
                        category = %spec.name,
                        proposed = fragments.len(),
                        kept = verified.len(),
                        "dropped unverifiable fragments"
                    );
                }
                Section {
                    category: spec.name.clone(),
                    fragments: verified,
                }
            })
            .collect();

        self.assemble(sections, None)
    }

    fn assemble(&self, sections: Vec<Section>, notice: Option<String>) -> ExtractionResult {
        let advisory = self.config.advisory();
        ExtractionResult {
            sections,
            when_to_see_a_doctor: advisory.when_to_see_a_doctor.clone(),
            notes: advisory.notes.clone(),
            notice,
        }
    }
}
