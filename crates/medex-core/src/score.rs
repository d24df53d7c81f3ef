use crate::config::CategorySpec;
use crate::matcher::MatchPolicy;
use crate::model::{ScoredCandidate, Segment};

/// Relevance of one segment to one category.
///
/// Weighted: `weight` per matching keyword. Unweighted: `weight` once if any keyword
/// matches. Zero means no match.
pub fn score(segment: &Segment, spec: &CategorySpec, policy: &dyn MatchPolicy, weighted: bool) -> f64 {
    let mut hits = spec
        .keywords
        .iter()
        .filter(|keyword| policy.matches(&segment.lower, keyword));
    if weighted {
        hits.count() as f64 * spec.weight
    } else if hits.next().is_some() {
        spec.weight
    } else {
        0.0
    }
}

/// Score every segment, keeping only those with a positive score, in input order.
pub fn score_segments<'a>(
    segments: &'a [Segment],
    spec: &CategorySpec,
    policy: &dyn MatchPolicy,
    weighted: bool,
) -> Vec<ScoredCandidate<'a>> {
    segments
        .iter()
        .map(|segment| ScoredCandidate {
            segment,
            score: score(segment, spec, policy, weighted),
        })
        .filter(|candidate| candidate.score > 0.0)
        .collect()
}

pub fn matches_any(segment: &Segment, spec: &CategorySpec, policy: &dyn MatchPolicy) -> bool {
    spec.keywords
        .iter()
        .any(|keyword| policy.matches(&segment.lower, keyword))
}
