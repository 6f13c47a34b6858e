//! HTTP surface for StudyLens.
//!
//! This module exposes a compact Axum router with a handful of endpoints:
//!
//! - `POST /analyze` – Upload a document (multipart `file` part), extract its text, and return
//!   the full analysis record (summary, bullet points, keywords, sentiment, full text).
//! - `POST /analyze-text` – Analyze raw text supplied as JSON.
//! - `POST /generate-quiz` – Produce quiz question/answer pairs from raw text.
//! - `GET /health` – Model readiness and uptime for liveness probes.
//! - `GET /metrics` – Observe analysis counters.
//! - `GET /commands` – Machine-readable command catalog for quick discovery by tools/hosts.
//!
//! Degraded-mode analysis (heuristic summaries, fallback quiz tiers) is invisible here; the
//! only client-visible failures are bad uploads and empty quiz results.

use crate::analysis::{AnalysisApi, AnalysisError, AnalysisReport, QuizResult};
use crate::metrics::MetricsSnapshot;
use axum::{
    Json, Router,
    extract::{Multipart, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::{Arc, OnceLock};
use std::time::Instant;

const DEFAULT_QUIZ_COUNT: usize = 5;

static START_TIME: OnceLock<Instant> = OnceLock::new();

/// Build the HTTP router exposing the analysis API surface.
pub fn create_router<S>(service: Arc<S>) -> Router
where
    S: AnalysisApi + 'static,
{
    START_TIME.get_or_init(Instant::now);
    Router::new()
        .route("/analyze", post(analyze_file::<S>))
        .route("/analyze-text", post(analyze_text::<S>))
        .route("/generate-quiz", post(generate_quiz::<S>))
        .route("/health", get(health::<S>))
        .route("/metrics", get(get_metrics::<S>))
        .route("/commands", get(get_commands))
        .with_state(service)
}

/// Analyze an uploaded file.
///
/// Accepts a multipart body with a `file` part; the filename extension selects the extraction
/// strategy. Returns 400 when no text could be extracted.
async fn analyze_file<S>(
    State(service): State<Arc<S>>,
    mut multipart: Multipart,
) -> Result<Json<AnalysisReport>, AppError>
where
    S: AnalysisApi,
{
    while let Some(field) = multipart.next_field().await.map_err(|error| {
        AppError::BadRequest(format!("Malformed multipart payload: {error}"))
    })? {
        if field.name() != Some("file") {
            continue;
        }
        let filename = field.file_name().unwrap_or("upload.txt").to_string();
        let bytes = field.bytes().await.map_err(|error| {
            AppError::BadRequest(format!("Failed to read uploaded file: {error}"))
        })?;
        tracing::info!(filename = %filename, size = bytes.len(), "Analyze request received");
        let report = service.analyze_file(&bytes, &filename).await.map_err(|_| {
            AppError::BadRequest(
                "Could not extract text from the file. It might be empty or corrupted."
                    .to_string(),
            )
        })?;
        return Ok(Json(report));
    }

    Err(AppError::BadRequest(
        "Missing 'file' part in multipart payload.".to_string(),
    ))
}

/// Request body for the `POST /analyze-text` endpoint.
#[derive(Deserialize)]
struct AnalyzeTextRequest {
    /// Raw text to analyze.
    text: String,
}

/// Analyze raw text into structured study material.
async fn analyze_text<S>(
    State(service): State<Arc<S>>,
    Json(request): Json<AnalyzeTextRequest>,
) -> Result<Json<AnalysisReport>, AppError>
where
    S: AnalysisApi,
{
    let report = service.analyze_text(&request.text).await?;
    Ok(Json(report))
}

/// Request body for the `POST /generate-quiz` endpoint.
#[derive(Deserialize)]
struct QuizRequest {
    /// Source text for quiz generation.
    text: String,
    /// Number of question/answer pairs requested.
    #[serde(default = "default_quiz_count")]
    count: usize,
}

fn default_quiz_count() -> usize {
    DEFAULT_QUIZ_COUNT
}

/// Generate quiz question/answer pairs from raw text.
///
/// An exhausted cascade (no usable sentences anywhere) surfaces as 404 so clients can
/// distinguish "nothing to quiz on" from a processing failure.
async fn generate_quiz<S>(
    State(service): State<Arc<S>>,
    Json(request): Json<QuizRequest>,
) -> Result<Json<QuizResult>, AppError>
where
    S: AnalysisApi,
{
    let quiz = service.generate_quiz(&request.text, request.count).await?;
    if quiz.is_empty() {
        return Err(AppError::NotFound(
            "Could not generate a quiz from the provided text.".to_string(),
        ));
    }
    Ok(Json(quiz))
}

/// Response body for `GET /health`.
#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
    #[serde(rename = "uptimeSeconds")]
    uptime_seconds: u64,
    models: crate::analysis::ModelReadiness,
    #[serde(rename = "allReady")]
    all_ready: bool,
}

/// Report model readiness and uptime.
async fn health<S>(State(service): State<Arc<S>>) -> Json<HealthResponse>
where
    S: AnalysisApi,
{
    let models = service.model_readiness();
    let all_ready = models.all_ready();
    Json(HealthResponse {
        status: if all_ready { "ok" } else { "degraded" },
        version: env!("CARGO_PKG_VERSION"),
        uptime_seconds: START_TIME
            .get_or_init(Instant::now)
            .elapsed()
            .as_secs(),
        models,
        all_ready,
    })
}

/// Return a concise metrics snapshot with analysis counters.
async fn get_metrics<S>(State(service): State<Arc<S>>) -> Json<MetricsSnapshot>
where
    S: AnalysisApi,
{
    Json(service.metrics_snapshot())
}

/// Descriptor for a single command in the discovery catalog.
#[derive(Serialize)]
struct CommandDescriptor {
    name: &'static str,
    method: &'static str,
    path: &'static str,
    description: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    request_example: Option<serde_json::Value>,
}

/// Response body for `GET /commands`.
#[derive(Serialize)]
struct CommandsResponse {
    commands: Vec<CommandDescriptor>,
}

/// Enumerate supported HTTP commands for discovery/UX in hosts and tools.
async fn get_commands() -> Json<CommandsResponse> {
    Json(CommandsResponse {
        commands: vec![
            CommandDescriptor {
                name: "analyze",
                method: "POST",
                path: "/analyze",
                description: "Upload a document (multipart 'file' part) and receive its summary, bullet points, keywords, and sentiment.",
                request_example: None,
            },
            CommandDescriptor {
                name: "analyze_text",
                method: "POST",
                path: "/analyze-text",
                description: "Analyze raw text and receive its summary, bullet points, keywords, and sentiment.",
                request_example: Some(json!({
                    "text": "Document contents"
                })),
            },
            CommandDescriptor {
                name: "generate_quiz",
                method: "POST",
                path: "/generate-quiz",
                description: "Generate quiz question/answer pairs from raw text. Returns 404 when no usable content exists.",
                request_example: Some(json!({
                    "text": "Document contents",
                    "count": 5
                })),
            },
            CommandDescriptor {
                name: "health",
                method: "GET",
                path: "/health",
                description: "Report readiness of the generative model handles and server uptime.",
                request_example: None,
            },
            CommandDescriptor {
                name: "metrics",
                method: "GET",
                path: "/metrics",
                description: "Return analysis counters useful for observability dashboards.",
                request_example: None,
            },
        ],
    })
}

enum AppError {
    /// Client supplied an unusable document or payload.
    BadRequest(String),
    /// The request was valid but produced nothing to return.
    NotFound(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match self {
            Self::BadRequest(message) => (StatusCode::BAD_REQUEST, message).into_response(),
            Self::NotFound(message) => (StatusCode::NOT_FOUND, message).into_response(),
        }
    }
}

impl From<AnalysisError> for AppError {
    fn from(inner: AnalysisError) -> Self {
        match inner {
            AnalysisError::EmptyDocument => Self::BadRequest("Text content is required.".into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{create_router, get_commands};
    use crate::analysis::{
        AnalysisApi, AnalysisError, AnalysisReport, ModelReadiness, QuizItem, QuizResult,
    };
    use crate::analysis::sentiment::Sentiment;
    use crate::metrics::MetricsSnapshot;
    use async_trait::async_trait;
    use axum::{
        body::{Body, to_bytes},
        http::{Method, Request, StatusCode},
    };
    use serde_json::json;
    use std::sync::Arc;
    use tower::ServiceExt;

    #[tokio::test]
    async fn commands_catalog_exposes_analysis_endpoints() {
        let response = get_commands().await;
        let commands = response.0.commands;
        let analyze = commands
            .iter()
            .find(|cmd| cmd.name == "analyze_text")
            .expect("analyze_text command present");

        assert_eq!(analyze.method, "POST");
        assert_eq!(analyze.path, "/analyze-text");
        assert!(commands.len() >= 4);
    }

    #[tokio::test]
    async fn analyze_text_route_returns_report() {
        let service = Arc::new(StubAnalysisService::with_quiz(vec![]));
        let app = create_router(service);

        let payload = json!({ "text": "Some document body" });
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
        assert_eq!(json["summary"], "A summary.");
        assert_eq!(json["sentiment"], "neutral");
        assert_eq!(json["fullText"], "Some document body");
    }

    #[tokio::test]
    async fn blank_text_is_rejected_with_400() {
        let service = Arc::new(StubAnalysisService::with_quiz(vec![]));
        let app = create_router(service);

        let payload = json!({ "text": "   " });
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

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn empty_quiz_surfaces_as_404() {
        let service = Arc::new(StubAnalysisService::with_quiz(vec![]));
        let app = create_router(service);

        let payload = json!({ "text": "Too thin to quiz." });
        let response = app
            .oneshot(
                Request::builder()
                    .method(Method::POST)
                    .uri("/generate-quiz")
                    .header("content-type", "application/json")
                    .body(Body::from(payload.to_string()))
                    .expect("request"),
            )
            .await
            .expect("router response");

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn quiz_route_returns_items() {
        let items = vec![QuizItem {
            question: "Fill in the blank: ______ is the capital of France.".into(),
            answer: "Paris".into(),
        }];
        let service = Arc::new(StubAnalysisService::with_quiz(items));
        let app = create_router(service);

        let payload = json!({ "text": "Paris is the capital of France.", "count": 1 });
        let response = app
            .oneshot(
                Request::builder()
                    .method(Method::POST)
                    .uri("/generate-quiz")
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
        assert_eq!(json["quiz"][0]["answer"], "Paris");
    }

    #[tokio::test]
    async fn health_reports_degraded_without_models() {
        let service = Arc::new(StubAnalysisService::with_quiz(vec![]));
        let app = create_router(service);

        let response = app
            .oneshot(
                Request::builder()
                    .method(Method::GET)
                    .uri("/health")
                    .body(Body::empty())
                    .expect("request"),
            )
            .await
            .expect("router response");

        assert_eq!(response.status(), StatusCode::OK);
        let body = to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body bytes");
        let json: serde_json::Value = serde_json::from_slice(&body).expect("json body");
        assert_eq!(json["status"], "degraded");
        assert_eq!(json["models"]["summarizer"], false);
        assert_eq!(json["allReady"], false);
    }

    struct StubAnalysisService {
        quiz_items: Vec<QuizItem>,
    }

    impl StubAnalysisService {
        fn with_quiz(quiz_items: Vec<QuizItem>) -> Self {
            Self { quiz_items }
        }
    }

    #[async_trait]
    impl AnalysisApi for StubAnalysisService {
        async fn analyze_text(&self, text: &str) -> Result<AnalysisReport, AnalysisError> {
            if text.trim().is_empty() {
                return Err(AnalysisError::EmptyDocument);
            }
            Ok(AnalysisReport {
                summary: "A summary.".into(),
                summary_points: vec!["A summary.".into()],
                keywords: vec!["summary".into()],
                sentiment: Sentiment::Neutral,
                full_text: text.to_string(),
            })
        }

        async fn analyze_file(
            &self,
            bytes: &[u8],
            _filename: &str,
        ) -> Result<AnalysisReport, AnalysisError> {
            self.analyze_text(&String::from_utf8_lossy(bytes)).await
        }

        async fn generate_quiz(
            &self,
            text: &str,
            count: usize,
        ) -> Result<QuizResult, AnalysisError> {
            if text.trim().is_empty() {
                return Err(AnalysisError::EmptyDocument);
            }
            Ok(QuizResult {
                items: self.quiz_items.iter().take(count).cloned().collect(),
            })
        }

        fn model_readiness(&self) -> ModelReadiness {
            ModelReadiness {
                summarizer: false,
                question: false,
            }
        }

        fn metrics_snapshot(&self) -> MetricsSnapshot {
            MetricsSnapshot {
                documents_analyzed: 0,
                quizzes_generated: 0,
                heuristic_fallbacks: 0,
                last_chunk_count: None,
            }
        }
    }
}
