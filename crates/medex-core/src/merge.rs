use std::collections::HashSet;

use crate::config::CategorySpec;
use crate::matcher::MatchPolicy;
use crate::model::Segment;
use crate::score::matches_any;

/// Append bullet fragments matching any of the category's keywords to the ranked list.
///
/// The primary list keeps its order; new bullets follow in segmentation order, skipping
/// strings already present. The merged list is cut to `cap`.
pub fn merge_bullets(
    primary: Vec<String>,
    bullets: &[Segment],
    spec: &CategorySpec,
    policy: &dyn MatchPolicy,
    cap: usize,
) -> Vec<String> {
    let mut merged = primary;
    let mut seen: HashSet<String> = merged.iter().cloned().collect();

    for bullet in bullets {
        if merged.len() >= cap {
            break;
        }
        if matches_any(bullet, spec, policy) && seen.insert(bullet.text.clone()) {
            merged.push(bullet.text.clone());
        }
    }
    merged.truncate(cap);
    merged
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matcher::Substring;
    use crate::model::Origin;

    fn bullets(texts: &[&str]) -> Vec<Segment> {
        texts
            .iter()
            .enumerate()
            .map(|(i, t)| Segment::new(t, Origin::Bullet, i))
            .collect()
    }

    #[test]
    fn matching_bullets_follow_primary() {
        let spec = CategorySpec::new("symptoms", &["fever", "rash"]);
        let merged = merge_bullets(
            vec!["Symptoms include fever".to_string()],
            &bullets(&["Rash", "Fatigue", "High fever"]),
            &spec,
            &Substring,
            10,
        );
        assert_eq!(merged, ["Symptoms include fever", "Rash", "High fever"]);
    }

    #[test]
    fn existing_strings_are_not_repeated() {
        let spec = CategorySpec::new("symptoms", &["fever"]);
        let merged = merge_bullets(
            vec!["Fever".to_string()],
            &bullets(&["Fever", "Fever"]),
            &spec,
            &Substring,
            10,
        );
        assert_eq!(merged, ["Fever"]);
    }

    #[test]
    fn respects_cap() {
        let spec = CategorySpec::new("symptoms", &["fever"]);
        let merged = merge_bullets(
            vec!["fever one".to_string(), "fever two".to_string()],
            &bullets(&["fever three", "fever four"]),
            &spec,
            &Substring,
            3,
        );
        assert_eq!(merged, ["fever one", "fever two", "fever three"]);

        let over = merge_bullets(
            vec!["a".to_string(), "b".to_string(), "c".to_string()],
            &[],
            &spec,
            &Substring,
            2,
        );
        assert_eq!(over, ["a", "b"]);
    }
}
