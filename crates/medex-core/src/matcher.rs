//! Keyword matching policies.
//!
//! Scoring and bullet merging only ever ask a `MatchPolicy` whether a keyword occurs in a
//! lowercase segment, so swapping the policy changes matching everywhere at once.

use crate::config::MatchMode;

pub trait MatchPolicy: Send + Sync {
    /// `haystack` and `keyword` are both lowercase. An empty keyword never matches.
    fn matches(&self, haystack: &str, keyword: &str) -> bool;
}

/// Plain substring containment.
#[derive(Debug, Clone, Copy, Default)]
pub struct Substring;

impl MatchPolicy for Substring {
    fn matches(&self, haystack: &str, keyword: &str) -> bool {
        !keyword.is_empty() && haystack.contains(keyword)
    }
}

/// Substring whose surrounding characters are not alphanumeric.
#[derive(Debug, Clone, Copy, Default)]
pub struct WordBoundary;

impl MatchPolicy for WordBoundary {
    fn matches(&self, haystack: &str, keyword: &str) -> bool {
        if keyword.is_empty() {
            return false;
        }
        haystack.match_indices(keyword).any(|(start, found)| {
            let before = haystack[..start].chars().next_back();
            let after = haystack[start + found.len()..].chars().next();
            !before.is_some_and(char::is_alphanumeric) && !after.is_some_and(char::is_alphanumeric)
        })
    }
}

impl MatchMode {
    pub fn policy(self) -> &'static dyn MatchPolicy {
        match self {
            MatchMode::Substring => &Substring,
            MatchMode::WordBoundary => &WordBoundary,
        }
    }
}
