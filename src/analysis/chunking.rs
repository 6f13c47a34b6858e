//! Chunk-size heuristics for the map-reduce summarization pipeline.
//!
//! Chunking prefers the summarization model's own tokenizer when the handle advertises one
//! (see [`TokenBudget`]): the text is encoded once, split into windows below the model's
//! context window, and each window decoded back to text. When no tokenizer capability exists,
//! or a window fails to decode cleanly, chunking falls back to fixed-size whitespace-word
//! windows. Chunks are contiguous, ordered, and non-overlapping in both modes.

use crate::generation::TokenBudget;

/// Word-window size used when no tokenizer capability is available.
pub const DEFAULT_CHUNK_WORDS: usize = 750;

/// Ordered, contiguous segment of the normalized document text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chunk {
    /// Position of this chunk within the source text.
    pub index: usize,
    /// Chunk contents.
    pub text: String,
}

/// Split normalized text into token-bounded or word-bounded chunks.
///
/// Returns an empty vector only for whitespace-only input, which callers rule out upstream.
pub fn chunk_text(text: &str, token_budget: Option<&TokenBudget>, chunk_words: usize) -> Vec<Chunk> {
    if let Some(budget) = token_budget {
        if let Some(chunks) = chunk_by_tokens(text, budget) {
            return chunks;
        }
        tracing::debug!("Token-based chunking unavailable; falling back to word windows");
    }
    chunk_by_words(text, chunk_words)
}

fn chunk_by_tokens(text: &str, budget: &TokenBudget) -> Option<Vec<Chunk>> {
    let max_tokens = budget.max_tokens();
    if max_tokens == 0 {
        return None;
    }

    let tokens = budget.encode(text);
    let mut chunks = Vec::with_capacity(tokens.len() / max_tokens + 1);
    for (index, window) in tokens.chunks(max_tokens).enumerate() {
        // A window boundary can split a multi-token character; bail out to word chunking
        // rather than emit lossy text.
        let text = budget.decode(window)?;
        chunks.push(Chunk { index, text });
    }
    Some(chunks)
}

fn chunk_by_words(text: &str, chunk_words: usize) -> Vec<Chunk> {
    let words: Vec<&str> = text.split_whitespace().collect();
    words
        .chunks(chunk_words.max(1))
        .enumerate()
        .map(|(index, window)| Chunk {
            index,
            text: window.join(" "),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn word_budget() -> TokenBudget {
        let encoding = tiktoken_rs::cl100k_base().expect("encoding");
        TokenBudget::new(encoding, 8)
    }

    #[test]
    fn word_chunks_cover_text_in_order() {
        let text = "one two three four five six seven";
        let chunks = chunk_by_words(text, 3);
        assert_eq!(chunks.len(), 3);
        assert_eq!(chunks[0].text, "one two three");
        assert_eq!(chunks[2].text, "seven");
        let rejoined = chunks
            .iter()
            .map(|chunk| chunk.text.as_str())
            .collect::<Vec<_>>()
            .join(" ");
        assert_eq!(rejoined, text);
        for (position, chunk) in chunks.iter().enumerate() {
            assert_eq!(chunk.index, position);
        }
    }

    #[test]
    fn token_chunks_respect_budget_and_cover_text() {
        let text = "The quick brown fox jumps over the lazy dog near the river bank today.";
        let budget = word_budget();
        let chunks = chunk_by_tokens(text, &budget).expect("token chunks");
        assert!(chunks.len() > 1);
        for chunk in &chunks {
            assert!(budget.encode(&chunk.text).len() <= budget.max_tokens());
        }
        let rejoined: String = chunks.iter().map(|chunk| chunk.text.as_str()).collect();
        assert_eq!(rejoined, text);
    }

    #[test]
    fn missing_budget_falls_back_to_words() {
        let text = (0..20).map(|i| format!("w{i}")).collect::<Vec<_>>().join(" ");
        let chunks = chunk_text(&text, None, 6);
        assert_eq!(chunks.len(), 4);
    }

    #[test]
    fn empty_text_produces_no_chunks() {
        assert!(chunk_text("   ", None, DEFAULT_CHUNK_WORDS).is_empty());
    }
}
