//! Text normalization and sentence segmentation shared across the pipelines.

use regex::Regex;
use std::sync::OnceLock;

static CITATION_MARKERS: OnceLock<Regex> = OnceLock::new();

fn citation_markers() -> &'static Regex {
    CITATION_MARKERS.get_or_init(|| Regex::new(r"\[\d+\]").expect("valid citation regex"))
}

/// Strip bracketed citation markers (`[12]`) and collapse whitespace runs.
///
/// Idempotent: normalizing already-normalized text is a no-op.
pub fn normalize(text: &str) -> String {
    let stripped = citation_markers().replace_all(text, "");
    stripped.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Count whitespace-separated words.
pub fn word_count(text: &str) -> usize {
    text.split_whitespace().count()
}

/// Split text into an ordered sequence of sentences.
///
/// Sentences end at `.`, `!`, or `?`; a trailing fragment without terminal punctuation is kept
/// as a final sentence. Side-effect-free and restartable.
pub fn split_sentences(text: &str) -> Vec<String> {
    let mut sentences = Vec::new();
    let mut current = String::new();

    for ch in text.chars() {
        current.push(ch);
        if matches!(ch, '.' | '!' | '?') {
            let trimmed = current.trim();
            if !trimmed.is_empty() {
                sentences.push(trimmed.to_string());
            }
            current.clear();
        }
    }

    let trimmed = current.trim();
    if !trimmed.is_empty() {
        sentences.push(trimmed.to_string());
    }

    sentences
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_citations_and_collapses_whitespace() {
        let raw = "The  reactor [12] was built\n\nin 1942. [3]";
        assert_eq!(normalize(raw), "The reactor was built in 1942.");
    }

    #[test]
    fn normalization_is_idempotent() {
        let raw = "Alpha [1]  beta\tgamma. [44] Delta.";
        let once = normalize(raw);
        assert_eq!(normalize(&once), once);
    }

    #[test]
    fn splits_on_terminal_punctuation() {
        let sentences = split_sentences("First one. Second one! Third one? Trailing fragment");
        assert_eq!(
            sentences,
            vec![
                "First one.",
                "Second one!",
                "Third one?",
                "Trailing fragment"
            ]
        );
    }

    #[test]
    fn empty_text_yields_no_sentences() {
        assert!(split_sentences("   ").is_empty());
        assert_eq!(word_count("  "), 0);
    }
}
