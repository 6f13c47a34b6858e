//! End-to-end pipeline tests driving the analysis service through its public API.

use async_trait::async_trait;
use axum::{
    body::{Body, to_bytes},
    http::{Method, Request, StatusCode},
};
use serde_json::json;
use std::sync::Arc;
use studylens::analysis::entities::{EntityTagger, HeuristicEntityTagger};
use studylens::analysis::{AnalysisApi, AnalysisService};
use studylens::api::create_router;
use studylens::config::{CONFIG, Config, GenerationProvider};
use studylens::generation::{
    GenerationError, LengthBudget, ModelSet, QuestionModel, SummaryModel,
};
use tower::ServiceExt;

fn ensure_test_config() {
    let _ = CONFIG.set(Config {
        generation_provider: GenerationProvider::None,
        ollama_url: None,
        summarizer_model: "test-summarizer".to_string(),
        question_model: "test-question".to_string(),
        enable_quiz: true,
        summary_chunk_words: None,
        embedding_dimension: 64,
        keyword_top_n: 5,
        server_port: None,
    });
}

/// Summarizer stub that truncates its input to the budgeted maximum.
struct TruncatingSummaryModel;

#[async_trait]
impl SummaryModel for TruncatingSummaryModel {
    async fn summarize(
        &self,
        text: &str,
        budget: LengthBudget,
    ) -> Result<String, GenerationError> {
        let words: Vec<&str> = text.split_whitespace().take(budget.max_words).collect();
        Ok(words.join(" "))
    }
}

/// Question stub that always emits a well-formed marker pair.
struct MarkerQuestionModel;

#[async_trait]
impl QuestionModel for MarkerQuestionModel {
    async fn generate(&self, sentence: &str) -> Result<String, GenerationError> {
        let first_word = sentence.split_whitespace().next().unwrap_or("it");
        Ok(format!(
            "question: What does the passage say about {first_word}?\nanswer: {sentence}"
        ))
    }
}

fn build_service() -> AnalysisService {
    ensure_test_config();
    let models = Arc::new(ModelSet::with_models(
        Some(Box::new(TruncatingSummaryModel)),
        Some(Box::new(MarkerQuestionModel)),
    ));
    let tagger: Arc<dyn EntityTagger> = Arc::new(HeuristicEntityTagger::new());
    AnalysisService::from_parts(models, Some(tagger))
}

fn long_document() -> String {
    let sentence = "The respiratory system moves oxygen from inhaled air into the bloodstream \
                    through the alveoli.";
    std::iter::repeat(sentence)
        .take(150)
        .collect::<Vec<_>>()
        .join(" ")
}

#[tokio::test]
async fn long_document_produces_condensed_summary() {
    let service = build_service();
    let document = long_document();
    let input_words = document.split_whitespace().count();
    assert!(input_words > 2000);

    let report = service
        .analyze_text(&document)
        .await
        .expect("analysis succeeds");

    let summary_words = report.summary.split_whitespace().count();
    assert!(!report.summary.is_empty());
    assert!(
        summary_words < input_words / 3,
        "summary of {summary_words} words did not condense {input_words} input words"
    );
    assert!(!report.summary_points.is_empty());
    assert_eq!(report.full_text, document);
}

#[tokio::test]
async fn quiz_honors_requested_count() {
    let service = build_service();
    let document = long_document();

    let quiz = service
        .generate_quiz(&document, 3)
        .await
        .expect("quiz generation succeeds");

    assert_eq!(quiz.items.len(), 3);
    for item in &quiz.items {
        assert!(item.question.starts_with("What does the passage say about"));
        assert!(!item.answer.is_empty());
    }
}

#[tokio::test]
async fn heuristic_quiz_covers_model_outage() {
    ensure_test_config();
    let models = Arc::new(ModelSet::disabled());
    let tagger: Arc<dyn EntityTagger> = Arc::new(HeuristicEntityTagger::new());
    let service = AnalysisService::from_parts(models, Some(tagger));

    let quiz = service
        .generate_quiz("Paris is the capital of France. The city hosts many museums.", 2)
        .await
        .expect("quiz generation succeeds");

    assert!(!quiz.is_empty());
    assert!(
        quiz.items
            .iter()
            .any(|item| item.question.contains("______")
                || item.question.starts_with("Is the following statement true"))
    );
}

#[tokio::test]
async fn router_serves_analysis_over_http() {
    let service = Arc::new(build_service());
    let app = create_router(service);

    let payload = json!({ "text": long_document() });
    let response = app
        .oneshot(
            Request::builder()
                .method(Method::POST)
                .uri("/analyze-text")
                .header("content-type", "application/json")
                .body(Body::from(payload.to_string()))
                .expect("request"),
        )
        .await
        .expect("router response");

    assert_eq!(response.status(), StatusCode::OK);
    let body = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body bytes");
    let json: serde_json::Value = serde_json::from_slice(&body).expect("json body");
    assert!(json["summary"].as_str().is_some_and(|s| !s.is_empty()));
    assert!(json["keywords"].as_array().is_some_and(|k| !k.is_empty()));
    assert_eq!(json["sentiment"], "neutral");
}
