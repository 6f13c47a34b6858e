//! Adaptive map-reduce summarization with proportional length budgets.
//!
//! The decision tree, in order: a missing model handle degrades to the extractive heuristic
//! immediately; short inputs pass through verbatim; everything else is chunked, each chunk
//! summarized with an intermediate budget, and the combined result compressed once more with
//! the tighter final-pass budget. Per-chunk failures substitute a heuristic summary of that
//! chunk only. The operation never fails for well-formed non-empty input.

use crate::analysis::chunking::{DEFAULT_CHUNK_WORDS, chunk_text};
use crate::analysis::normalize::{normalize, split_sentences, word_count};
use crate::generation::{LengthBudget, ModelOutcome, ModelSet};
use std::sync::Arc;

/// Inputs below this word count are returned verbatim instead of summarized.
pub const MIN_WORDS_FOR_SUMMARY: usize = 50;

/// Number of leading sentences used by the extractive heuristic.
const HEURISTIC_SENTENCE_COUNT: usize = 4;

/// Character-prefix length used when sentence segmentation finds nothing.
const PREFIX_FALLBACK_CHARS: usize = 400;

/// Upper bound on reduction rounds before the final compression runs regardless.
///
/// The combined intermediate summaries almost always fit in one chunk after a single round;
/// the cap keeps an adversarial input from looping.
const MAX_REDUCTION_PASSES: usize = 2;

/// Outcome of one summarization call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SummaryOutput {
    /// Final summary text; verbatim input for short documents.
    pub text: String,
    /// Number of chunks produced for the document (0 when chunking was bypassed).
    pub chunk_count: usize,
    /// Whether any part of the result came from a heuristic fallback.
    pub degraded: bool,
}

/// Orchestrates chunk-level summarization and recursive reduction.
pub struct Summarizer {
    models: Arc<ModelSet>,
    chunk_words: usize,
}

impl Summarizer {
    /// Build a summarizer over the given model set.
    ///
    /// `chunk_words_override` replaces the default word-window size used when the model
    /// advertises no tokenizer capability.
    pub fn new(models: Arc<ModelSet>, chunk_words_override: Option<usize>) -> Self {
        Self {
            models,
            chunk_words: chunk_words_override.unwrap_or(DEFAULT_CHUNK_WORDS),
        }
    }

    /// Summarize a document, degrading instead of failing.
    pub async fn summarize(&self, text: &str) -> SummaryOutput {
        let normalized = normalize(text);
        if normalized.is_empty() {
            return SummaryOutput {
                text: normalized,
                chunk_count: 0,
                degraded: false,
            };
        }

        if !self.models.summarizer_ready() {
            tracing::debug!("Summarization model absent; using extractive heuristic");
            return SummaryOutput {
                text: heuristic_summary(&normalized),
                chunk_count: 0,
                degraded: true,
            };
        }

        if word_count(&normalized) < MIN_WORDS_FOR_SUMMARY {
            return SummaryOutput {
                text: normalized,
                chunk_count: 0,
                degraded: false,
            };
        }

        let token_budget = self.models.token_budget();
        let chunks = chunk_text(&normalized, token_budget.as_ref(), self.chunk_words);
        let chunk_count = chunks.len();
        tracing::debug!(chunk_count, "Chunked document for summarization");
        let mut degraded = false;

        if chunk_count <= 1 {
            let budget = LengthBudget::final_pass(word_count(&normalized));
            let text = self.summarize_unit(&normalized, budget, &mut degraded).await;
            return SummaryOutput {
                text,
                chunk_count,
                degraded,
            };
        }

        let Some(mut current) = self.map_chunks(chunks, &mut degraded).await else {
            tracing::warn!("Every chunk summary came back empty; degrading to heuristic");
            return SummaryOutput {
                text: heuristic_summary(&normalized),
                chunk_count,
                degraded: true,
            };
        };

        // Combined intermediate summaries occasionally still exceed one chunk; reduce again
        // with intermediate budgets, bounded, before the final compression.
        for _ in 0..MAX_REDUCTION_PASSES {
            let chunks = chunk_text(&current, token_budget.as_ref(), self.chunk_words);
            if chunks.len() <= 1 {
                break;
            }
            match self.map_chunks(chunks, &mut degraded).await {
                Some(reduced) => current = reduced,
                None => {
                    return SummaryOutput {
                        text: heuristic_summary(&normalized),
                        chunk_count,
                        degraded: true,
                    };
                }
            }
        }

        let budget = LengthBudget::final_pass(word_count(&current));
        let text = self.summarize_unit(&current, budget, &mut degraded).await;
        SummaryOutput {
            text,
            chunk_count,
            degraded,
        }
    }

    /// Map step: summarize each chunk independently and join the non-empty results.
    ///
    /// Returns `None` when every chunk produced empty output.
    async fn map_chunks(
        &self,
        chunks: Vec<crate::analysis::chunking::Chunk>,
        degraded: &mut bool,
    ) -> Option<String> {
        let mut parts = Vec::with_capacity(chunks.len());
        for chunk in &chunks {
            let budget = LengthBudget::intermediate(word_count(&chunk.text));
            let summary = self.summarize_unit(&chunk.text, budget, degraded).await;
            let summary = summary.trim();
            if !summary.is_empty() {
                parts.push(summary.to_string());
            }
        }
        let combined = parts.join(" ");
        if combined.trim().is_empty() {
            None
        } else {
            Some(combined)
        }
    }

    /// Summarize one unit of text, substituting the heuristic on absence or failure.
    async fn summarize_unit(
        &self,
        text: &str,
        budget: LengthBudget,
        degraded: &mut bool,
    ) -> String {
        match self.models.summarize(text, budget).await {
            ModelOutcome::Generated(summary) => summary,
            ModelOutcome::Unavailable => {
                *degraded = true;
                heuristic_summary(text)
            }
            ModelOutcome::Failed(reason) => {
                tracing::warn!(reason, "Chunk summarization failed; substituting heuristic");
                *degraded = true;
                heuristic_summary(text)
            }
        }
    }
}

/// Extractive fallback: the first few sentences joined, or a character prefix as a last
/// resort when segmentation finds no sentences.
pub fn heuristic_summary(text: &str) -> String {
    let sentences = split_sentences(text);
    if sentences.is_empty() {
        return text.chars().take(PREFIX_FALLBACK_CHARS).collect::<String>();
    }
    sentences
        .into_iter()
        .take(HEURISTIC_SENTENCE_COUNT)
        .collect::<Vec<_>>()
        .join(" ")
}
