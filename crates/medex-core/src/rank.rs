use std::collections::HashSet;

use crate::model::ScoredCandidate;

/// Order candidates by descending score, earlier position first on ties, drop exact
/// duplicates and keep at most `limit` fragments.
pub fn rank(mut candidates: Vec<ScoredCandidate<'_>>, limit: usize) -> Vec<String> {
    candidates.sort_by(|a, b| {
        b.score
            .total_cmp(&a.score)
            .then_with(|| a.segment.position.cmp(&b.segment.position))
    });

    let mut seen = HashSet::new();
    let mut ranked = Vec::new();
    for candidate in candidates {
        if ranked.len() >= limit {
            break;
        }
        if seen.insert(candidate.segment.text.as_str()) {
            ranked.push(candidate.segment.text.clone());
        }
    }
    ranked
}
