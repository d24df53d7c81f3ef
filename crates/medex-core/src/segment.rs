//! Sentence and bullet segmentation over normalized text.
//!
//! The two passes use distinct delimiter sets and are independent of each other.
//! Positions are indexes into the raw split, so they stay stable when short pieces are
//! dropped.

use crate::model::{Origin, Segment};

const SENTENCE_DELIMITERS: &[char] = &['.', '!', '?', '\n'];
const BULLET_DELIMITERS: &[char] = &['\n', '•', '◦', '▪', '‣', '-', '–', '—'];

pub fn sentences(text: &str, min_chars: usize) -> Vec<Segment> {
    split(text, SENTENCE_DELIMITERS, Origin::Sentence, min_chars).collect()
}

/// Bullet-like fragments, at most `max` of them.
///
/// Text without a bullet delimiter comes back whole, as a single fragment.
pub fn bullets(text: &str, min_chars: usize, max: usize) -> Vec<Segment> {
    split(text, BULLET_DELIMITERS, Origin::Bullet, min_chars)
        .take(max)
        .collect()
}

fn split<'a>(
    text: &'a str,
    delimiters: &'a [char],
    origin: Origin,
    min_chars: usize,
) -> impl Iterator<Item = Segment> + 'a {
    text.split(delimiters)
        .enumerate()
        .map(|(position, piece)| (position, piece.trim()))
        .filter(move |(_, piece)| piece.chars().count() >= min_chars)
        .map(move |(position, piece)| Segment::new(piece, origin, position))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn texts(segments: &[Segment]) -> Vec<&str> {
        segments.iter().map(|s| s.text.as_str()).collect()
    }

    #[test]
    fn sentences_split_on_terminal_punctuation() {
        let segments = sentences("Fever is common. Is it serious? Yes! Rest well", 7);
        assert_eq!(texts(&segments), ["Fever is common", "Is it serious", "Rest well"]);
        assert_eq!(segments[0].lower, "fever is common");
        assert_eq!(segments[1].position, 1);
        assert_eq!(segments[2].position, 3);
        assert!(segments.iter().all(|s| s.origin == Origin::Sentence));
    }

    #[test]
    fn short_sentences_are_dropped() {
        let segments = sentences("Ok. Fine. A longer one.", 7);
        assert_eq!(texts(&segments), ["A longer one"]);
    }

    #[test]
    fn bullets_split_on_glyphs_and_dashes() {
        let segments = bullets("• Fever • Headache – Rash - Chills—Joint pain", 5, 8);
        assert_eq!(texts(&segments), ["Fever", "Headache", "Chills", "Joint pain"]);
        assert!(segments.iter().all(|s| s.origin == Origin::Bullet));
    }

    #[test]
    fn bullets_are_capped_in_order() {
        let text = "• alpha1 • alpha2 • alpha3 • alpha4";
        assert_eq!(texts(&bullets(text, 5, 2)), ["alpha1", "alpha2"]);
    }

    #[test]
    fn text_without_delimiters_is_one_bullet() {
        let segments = bullets("Symptoms include fever and cough.", 5, 8);
        assert_eq!(texts(&segments), ["Symptoms include fever and cough."]);
        assert_eq!(segments[0].position, 0);
    }

    #[test]
    fn hyphenated_words_split_bullets() {
        let segments = bullets("Fever is common. A well-known treatment is rest.", 5, 8);
        assert_eq!(
            texts(&segments),
            ["Fever is common. A well", "known treatment is rest."]
        );
    }

    #[test]
    fn length_counts_characters_not_bytes() {
        let segments = bullets("• ééééé • abc", 5, 8);
        assert_eq!(texts(&segments), ["ééééé"]);
    }

    #[test]
    fn deterministic() {
        let text = "One sentence here. Another one here. • item one • item two";
        assert_eq!(sentences(text, 7), sentences(text, 7));
        assert_eq!(bullets(text, 5, 8), bullets(text, 5, 8));
    }
}
