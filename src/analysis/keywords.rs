//! Embedding-based keyword extraction.
//!
//! Mirrors the KeyBERT approach at a small scale: build stopword-filtered unigram and bigram
//! candidates, embed the document and every candidate, and rank candidates by cosine
//! similarity to the document vector.

use crate::embedding::EmbeddingClient;

const STOPWORDS: &[&str] = &[
    "a", "an", "the", "and", "or", "but", "if", "then", "than", "so", "of", "in", "on", "at",
    "to", "from", "by", "with", "for", "as", "is", "are", "was", "were", "be", "been", "being",
    "it", "its", "this", "that", "these", "those", "he", "she", "they", "them", "his", "her",
    "their", "we", "you", "i", "not", "no", "do", "does", "did", "have", "has", "had", "will",
    "would", "can", "could", "should", "may", "might", "into", "over", "under", "about", "after",
    "before", "between", "during", "through", "which", "who", "whom", "what", "when", "where",
    "why", "how", "all", "each", "more", "most", "some", "such", "only", "also", "very",
];

/// Cap on the candidate pool so pathological documents stay cheap to embed.
const MAX_CANDIDATES: usize = 512;

/// Ranks candidate phrases against the document embedding.
pub struct KeywordExtractor {
    embedder: Box<dyn EmbeddingClient + Send + Sync>,
    top_n: usize,
}

impl KeywordExtractor {
    /// Construct an extractor returning at most `top_n` keywords.
    pub fn new(embedder: Box<dyn EmbeddingClient + Send + Sync>, top_n: usize) -> Self {
        Self { embedder, top_n }
    }

    /// Extract the highest-ranked keywords and keyphrases from the document.
    ///
    /// Returns an empty list when the document has no usable candidates or the embedding
    /// backend fails; keyword extraction never blocks an analysis.
    pub async fn extract(&self, text: &str) -> Vec<String> {
        let candidates = candidate_phrases(text);
        if candidates.is_empty() {
            return Vec::new();
        }

        let mut inputs = Vec::with_capacity(candidates.len() + 1);
        inputs.push(text.to_string());
        inputs.extend(candidates.iter().cloned());

        let embeddings = match self.embedder.generate_embeddings(inputs).await {
            Ok(embeddings) => embeddings,
            Err(error) => {
                tracing::warn!(error = %error, "Keyword embedding failed; returning no keywords");
                return Vec::new();
            }
        };

        let Some((document_vector, candidate_vectors)) = embeddings.split_first() else {
            return Vec::new();
        };

        let mut scored: Vec<(f32, &String)> = candidate_vectors
            .iter()
            .zip(candidates.iter())
            .map(|(vector, candidate)| (cosine_similarity(document_vector, vector), candidate))
            .collect();
        scored.sort_by(|a, b| b.0.partial_cmp(&a.0).unwrap_or(std::cmp::Ordering::Equal));

        scored
            .into_iter()
            .take(self.top_n)
            .map(|(_, candidate)| candidate.clone())
            .collect()
    }
}

/// Build the ordered, deduplicated unigram and bigram candidate pool.
fn candidate_phrases(text: &str) -> Vec<String> {
    let words: Vec<String> = text
        .split_whitespace()
        .map(|token| {
            token
                .chars()
                .filter(|c| c.is_alphanumeric())
                .collect::<String>()
                .to_lowercase()
        })
        .collect();

    let mut candidates = Vec::new();
    let mut seen = std::collections::HashSet::new();

    let usable = |word: &String| word.len() > 2 && !STOPWORDS.contains(&word.as_str());

    for window in words.windows(2) {
        if candidates.len() >= MAX_CANDIDATES {
            break;
        }
        let (first, second) = (&window[0], &window[1]);
        if usable(first) && seen.insert(first.clone()) {
            candidates.push(first.clone());
        }
        if usable(first) && usable(second) {
            let bigram = format!("{first} {second}");
            if seen.insert(bigram.clone()) {
                candidates.push(bigram);
            }
        }
    }
    if let Some(last) = words.last() {
        if candidates.len() < MAX_CANDIDATES && usable(last) && seen.insert(last.clone()) {
            candidates.push(last.clone());
        }
    }

    candidates
}

fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    let dot: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    dot / (norm_a * norm_b)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn candidates_skip_stopwords_and_short_tokens() {
        let candidates = candidate_phrases("The mitochondria is the powerhouse of the cell");
        assert!(candidates.contains(&"mitochondria".to_string()));
        assert!(candidates.contains(&"powerhouse".to_string()));
        assert!(candidates.contains(&"cell".to_string()));
        assert!(!candidates.iter().any(|c| c == "the" || c == "of" || c == "is"));
    }

    #[test]
    fn bigrams_join_adjacent_content_words() {
        let candidates = candidate_phrases("quantum computing changes cryptography forever");
        assert!(candidates.contains(&"quantum computing".to_string()));
        assert!(candidates.contains(&"computing changes".to_string()));
    }

    #[test]
    fn cosine_handles_zero_vectors() {
        assert_eq!(cosine_similarity(&[0.0, 0.0], &[1.0, 0.0]), 0.0);
        assert!((cosine_similarity(&[1.0, 0.0], &[1.0, 0.0]) - 1.0).abs() < 1e-6);
    }

    #[test]
    fn empty_document_yields_no_candidates() {
        assert!(candidate_phrases("").is_empty());
    }
}
