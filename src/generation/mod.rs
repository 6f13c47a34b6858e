//! Generative model handles and invocation outcomes.
//!
//! Both pipelines treat the models as optional capabilities: a handle may be absent (provider
//! `none`, or quiz generation disabled) and every invocation returns an explicit
//! [`ModelOutcome`] instead of unwinding. The fallback decision trees in the analysis layer
//! branch on those variants rather than catching errors.

pub mod ollama;

use crate::config::{GenerationProvider, get_config};
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;
use tiktoken_rs::CoreBPE;

/// Errors surfaced by generative model clients.
#[derive(Debug, Error)]
pub enum GenerationError {
    /// Provider was unreachable or refused the request.
    #[error("Generation provider unavailable: {0}")]
    ProviderUnavailable(String),
    /// Provider returned an error response.
    #[error("Failed to generate text: {0}")]
    GenerationFailed(String),
    /// Provider response could not be parsed.
    #[error("Malformed provider response: {0}")]
    InvalidResponse(String),
}

/// Word-count bounds requested from the summarization model.
///
/// Budgets scale with the input so that summary length tracks document length. The intermediate
/// pass compresses each chunk to roughly half its size; the final pass tightens to roughly a
/// third. Lower bounds keep very small chunks from producing single-sentence fragments.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LengthBudget {
    /// Upper word bound the model should honor best-effort.
    pub max_words: usize,
    /// Lower word bound the model should honor best-effort.
    pub min_words: usize,
}

impl LengthBudget {
    /// Budget for summarizing one chunk during the map step.
    pub fn intermediate(word_count: usize) -> Self {
        Self::clamped(60.max(word_count / 2), 30.max(word_count / 4))
    }

    /// Budget for the final reduction pass over the combined chunk summaries.
    pub fn final_pass(word_count: usize) -> Self {
        Self::clamped(100.max(word_count * 30 / 100), 50.max(word_count * 15 / 100))
    }

    fn clamped(max_words: usize, min_words: usize) -> Self {
        let min_words = if min_words >= max_words {
            max_words / 2
        } else {
            min_words
        };
        Self {
            max_words,
            min_words,
        }
    }
}

/// Tokenizer capability advertised by a summarization model.
///
/// Presence of a token budget switches the chunker from word counting to encoding-based
/// segmentation against the model's context window.
#[derive(Clone)]
pub struct TokenBudget {
    encoding: Arc<CoreBPE>,
    max_tokens: usize,
}

impl TokenBudget {
    /// Wrap a resolved encoding together with the model's maximum input size.
    pub fn new(encoding: CoreBPE, max_tokens: usize) -> Self {
        Self {
            encoding: Arc::new(encoding),
            max_tokens,
        }
    }

    /// Maximum number of tokens the model accepts in one request.
    pub fn max_tokens(&self) -> usize {
        self.max_tokens
    }

    /// Encode text into model tokens.
    pub fn encode(&self, text: &str) -> Vec<u32> {
        self.encoding.encode_ordinary(text)
    }

    /// Decode a token slice back into text; `None` when the slice is not decodable.
    pub fn decode(&self, tokens: &[u32]) -> Option<String> {
        self.encoding.decode(tokens.to_vec()).ok()
    }
}

impl std::fmt::Debug for TokenBudget {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenBudget")
            .field("max_tokens", &self.max_tokens)
            .finish_non_exhaustive()
    }
}

/// Interface implemented by abstractive summarization backends.
#[async_trait]
pub trait SummaryModel: Send + Sync {
    /// Produce a summary honoring the length budget best-effort.
    async fn summarize(&self, text: &str, budget: LengthBudget)
    -> Result<String, GenerationError>;

    /// Tokenizer capability used for chunk sizing; `None` selects word-based chunking.
    fn token_budget(&self) -> Option<TokenBudget> {
        None
    }
}

/// Interface implemented by question-generation backends.
///
/// Output is expected to embed `question:` and `answer:` markers; the quiz pipeline discards
/// responses that lack them.
#[async_trait]
pub trait QuestionModel: Send + Sync {
    /// Generate a question/answer pair derived from a single sentence.
    async fn generate(&self, sentence: &str) -> Result<String, GenerationError>;
}

/// Explicit result of one model invocation.
///
/// Absence of a handle is not an error, and a failed call never propagates; both conditions
/// steer the caller onto its fallback path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModelOutcome {
    /// The model produced non-empty output.
    Generated(String),
    /// No handle is configured for this capability.
    Unavailable,
    /// The invocation raised or produced unusable output.
    Failed(String),
}

/// Immutable set of generative handles constructed once at startup.
///
/// Handles are process-wide, read-only, and safe to invoke concurrently; requests never
/// mutate the set.
pub struct ModelSet {
    summarizer: Option<Box<dyn SummaryModel>>,
    question: Option<Box<dyn QuestionModel>>,
}

impl ModelSet {
    /// Build model handles based on the loaded configuration.
    pub fn from_config() -> Self {
        let config = get_config();
        match config.generation_provider {
            GenerationProvider::None => Self::disabled(),
            GenerationProvider::Ollama => {
                let base_url = config
                    .ollama_url
                    .clone()
                    .unwrap_or_else(|| ollama::DEFAULT_OLLAMA_URL.to_string());
                let summarizer: Option<Box<dyn SummaryModel>> = Some(Box::new(
                    ollama::OllamaSummaryModel::new(base_url.clone(), config.summarizer_model.clone()),
                ));
                let question: Option<Box<dyn QuestionModel>> = config.enable_quiz.then(|| {
                    Box::new(ollama::OllamaQuestionModel::new(
                        base_url,
                        config.question_model.clone(),
                    )) as Box<dyn QuestionModel>
                });
                Self::with_models(summarizer, question)
            }
        }
    }

    /// Build a set with both handles absent.
    pub fn disabled() -> Self {
        Self {
            summarizer: None,
            question: None,
        }
    }

    /// Build a set from explicit handles. Exists for tests and embedders.
    pub fn with_models(
        summarizer: Option<Box<dyn SummaryModel>>,
        question: Option<Box<dyn QuestionModel>>,
    ) -> Self {
        Self {
            summarizer,
            question,
        }
    }

    /// Whether a summarization handle is present.
    pub fn summarizer_ready(&self) -> bool {
        self.summarizer.is_some()
    }

    /// Whether a question-generation handle is present.
    pub fn question_ready(&self) -> bool {
        self.question.is_some()
    }

    /// Tokenizer capability of the summarization handle, when both exist.
    pub fn token_budget(&self) -> Option<TokenBudget> {
        self.summarizer
            .as_ref()
            .and_then(|model| model.token_budget())
    }

    /// Invoke the summarization model, mapping absence and failure to outcome variants.
    pub async fn summarize(&self, text: &str, budget: LengthBudget) -> ModelOutcome {
        let Some(model) = self.summarizer.as_ref() else {
            return ModelOutcome::Unavailable;
        };
        match model.summarize(text, budget).await {
            Ok(summary) if !summary.trim().is_empty() => {
                ModelOutcome::Generated(summary.trim().to_string())
            }
            Ok(_) => ModelOutcome::Failed("model returned empty output".to_string()),
            Err(error) => ModelOutcome::Failed(error.to_string()),
        }
    }

    /// Invoke the question-generation model, mapping absence and failure to outcome variants.
    pub async fn generate_question(&self, sentence: &str) -> ModelOutcome {
        let Some(model) = self.question.as_ref() else {
            return ModelOutcome::Unavailable;
        };
        match model.generate(sentence).await {
            Ok(output) if !output.trim().is_empty() => {
                ModelOutcome::Generated(output.trim().to_string())
            }
            Ok(_) => ModelOutcome::Failed("model returned empty output".to_string()),
            Err(error) => ModelOutcome::Failed(error.to_string()),
        }
    }
}
