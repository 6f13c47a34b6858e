//! Core data types and error definitions for the analysis pipelines.

use crate::analysis::sentiment::Sentiment;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors surfaced by the analysis orchestration layer.
///
/// The summarization and quiz pipelines themselves never fail for well-formed non-empty
/// input; the only caller-visible failure is the precondition on extracted text.
#[derive(Debug, Error)]
pub enum AnalysisError {
    /// Extraction produced no text, or the caller supplied blank text.
    #[error("document contained no extractable text")]
    EmptyDocument,
}

/// One question/answer pair produced by a single generation tier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuizItem {
    /// Question text shown to the learner.
    pub question: String,
    /// Expected answer.
    pub answer: String,
}

/// Ordered quiz produced by the generation cascade.
///
/// An empty quiz is a valid terminal result, not an error; callers decide how to surface it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuizResult {
    /// Generated items, at most the requested count.
    #[serde(rename = "quiz")]
    pub items: Vec<QuizItem>,
}

impl QuizResult {
    /// Whether the cascade produced no usable items.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// Structured study material produced for one document.
#[derive(Debug, Clone, Serialize)]
pub struct AnalysisReport {
    /// Final summary paragraph.
    pub summary: String,
    /// Summary split into sentences for bullet-point rendering.
    pub summary_points: Vec<String>,
    /// Ranked keywords and keyphrases.
    pub keywords: Vec<String>,
    /// Overall polarity label.
    pub sentiment: Sentiment,
    /// Full extracted text echoed back to the caller.
    #[serde(rename = "fullText")]
    pub full_text: String,
}

/// Presence of each generative handle, reported by the health endpoint.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct ModelReadiness {
    /// Whether the summarization handle is present.
    pub summarizer: bool,
    /// Whether the question-generation handle is present.
    #[serde(rename = "quizModel")]
    pub question: bool,
}

impl ModelReadiness {
    /// Whether every generative capability is available.
    pub fn all_ready(&self) -> bool {
        self.summarizer && self.question
    }
}
