//! Analysis service coordinating extraction, summarization, keywords, sentiment, and quizzes.

use crate::{
    analysis::{
        entities::{EntityTagger, HeuristicEntityTagger},
        keywords::KeywordExtractor,
        normalize::split_sentences,
        quiz::QuizGenerator,
        sentiment::analyze_sentiment,
        summarize::Summarizer,
        types::{AnalysisError, AnalysisReport, ModelReadiness, QuizResult},
    },
    config::get_config,
    embedding::get_embedding_client,
    extract::extract_text,
    generation::ModelSet,
    metrics::{AnalysisMetrics, MetricsSnapshot},
};
use async_trait::async_trait;
use std::sync::Arc;

/// Coordinates the full analysis pipeline for one process.
///
/// The service owns the generative model handles, the entity tagger, and the metrics
/// registry. Construct it once near process start and share it through an `Arc`; requests
/// never mutate it.
pub struct AnalysisService {
    models: Arc<ModelSet>,
    summarizer: Summarizer,
    quiz: QuizGenerator,
    keywords: KeywordExtractor,
    metrics: Arc<AnalysisMetrics>,
}

/// Abstraction over the analysis pipeline used by the HTTP surface.
#[async_trait]
pub trait AnalysisApi: Send + Sync {
    /// Analyze raw text into structured study material.
    async fn analyze_text(&self, text: &str) -> Result<AnalysisReport, AnalysisError>;

    /// Extract text from an uploaded file and analyze it.
    async fn analyze_file(&self, bytes: &[u8], filename: &str)
    -> Result<AnalysisReport, AnalysisError>;

    /// Generate up to `count` quiz items from raw text.
    async fn generate_quiz(&self, text: &str, count: usize) -> Result<QuizResult, AnalysisError>;

    /// Presence of each generative model handle.
    fn model_readiness(&self) -> ModelReadiness;

    /// Retrieve the current metrics snapshot for diagnostics.
    fn metrics_snapshot(&self) -> MetricsSnapshot;
}

impl AnalysisService {
    /// Build the service from the loaded configuration.
    pub fn new() -> Self {
        let config = get_config();
        tracing::info!(
            provider = ?config.generation_provider,
            "Initializing generative model handles"
        );
        let models = Arc::new(ModelSet::from_config());
        tracing::info!(
            summarizer_ready = models.summarizer_ready(),
            question_ready = models.question_ready(),
            "Model handles initialized"
        );
        let tagger: Arc<dyn EntityTagger> = Arc::new(HeuristicEntityTagger::new());
        Self::from_parts(models, Some(tagger))
    }

    /// Build the service from explicit components. Exists for tests and embedders.
    pub fn from_parts(models: Arc<ModelSet>, tagger: Option<Arc<dyn EntityTagger>>) -> Self {
        let config = get_config();
        Self {
            summarizer: Summarizer::new(models.clone(), config.summary_chunk_words),
            quiz: QuizGenerator::new(models.clone(), tagger),
            keywords: KeywordExtractor::new(get_embedding_client(), config.keyword_top_n),
            metrics: Arc::new(AnalysisMetrics::new()),
            models,
        }
    }
}

impl Default for AnalysisService {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl AnalysisApi for AnalysisService {
    async fn analyze_text(&self, text: &str) -> Result<AnalysisReport, AnalysisError> {
        if text.trim().is_empty() {
            return Err(AnalysisError::EmptyDocument);
        }

        tracing::info!(words = text.split_whitespace().count(), "Analyzing document");
        let sentiment = analyze_sentiment(text);
        let keywords = self.keywords.extract(text).await;
        let summary = self.summarizer.summarize(text).await;

        self.metrics.record_document(summary.chunk_count as u64);
        if summary.degraded {
            self.metrics.record_heuristic_fallback();
        }

        let summary_points = split_sentences(&summary.text);
        tracing::info!(
            chunks = summary.chunk_count,
            degraded = summary.degraded,
            keywords = keywords.len(),
            "Analysis completed"
        );

        Ok(AnalysisReport {
            summary: summary.text,
            summary_points,
            keywords,
            sentiment,
            full_text: text.to_string(),
        })
    }

    async fn analyze_file(
        &self,
        bytes: &[u8],
        filename: &str,
    ) -> Result<AnalysisReport, AnalysisError> {
        let text = extract_text(bytes, filename);
        self.analyze_text(&text).await
    }

    async fn generate_quiz(&self, text: &str, count: usize) -> Result<QuizResult, AnalysisError> {
        if text.trim().is_empty() {
            return Err(AnalysisError::EmptyDocument);
        }
        let quiz = self.quiz.generate(text, count).await;
        if !quiz.is_empty() {
            self.metrics.record_quiz();
        }
        tracing::info!(items = quiz.items.len(), requested = count, "Quiz generated");
        Ok(quiz)
    }

    fn model_readiness(&self) -> ModelReadiness {
        ModelReadiness {
            summarizer: self.models.summarizer_ready(),
            question: self.models.question_ready(),
        }
    }

    fn metrics_snapshot(&self) -> MetricsSnapshot {
        self.metrics.snapshot()
    }
}
