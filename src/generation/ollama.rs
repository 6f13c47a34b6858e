//! Ollama-backed implementations of the generative model traits.
//!
//! Both clients issue plain HTTP requests to the runtime's `/api/generate` endpoint with
//! streaming disabled. Prompts keep the temperature low so identical inputs produce stable
//! study material.

use super::{GenerationError, LengthBudget, QuestionModel, SummaryModel, TokenBudget};
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use serde_json::json;
use tiktoken_rs::{CoreBPE, cl100k_base, get_bpe_from_model, o200k_base, p50k_base, r50k_base};

/// Default runtime address when `OLLAMA_URL` is unset.
pub const DEFAULT_OLLAMA_URL: &str = "http://127.0.0.1:11434";

/// Safety margin subtracted from the context window before chunking.
const CONTEXT_SAFETY_MARGIN: usize = 50;

/// Summarization model served by Ollama.
pub struct OllamaSummaryModel {
    http: Client,
    base_url: String,
    model: String,
}

impl OllamaSummaryModel {
    /// Construct a client for the given runtime URL and model name.
    pub fn new(base_url: String, model: String) -> Self {
        Self {
            http: build_http_client(),
            base_url,
            model,
        }
    }
}

#[async_trait]
impl SummaryModel for OllamaSummaryModel {
    async fn summarize(
        &self,
        text: &str,
        budget: LengthBudget,
    ) -> Result<String, GenerationError> {
        let prompt = format!(
            "Summarize the following text in a single paragraph of between {min} and {max} words. \
             Respond with the summary only.\n\n{text}",
            min = budget.min_words,
            max = budget.max_words,
        );
        generate(&self.http, &self.base_url, &self.model, prompt).await
    }

    fn token_budget(&self) -> Option<TokenBudget> {
        let encoding = resolve_encoding(&self.model)?;
        let window = context_window(&self.model);
        Some(TokenBudget::new(
            encoding,
            window.saturating_sub(CONTEXT_SAFETY_MARGIN),
        ))
    }
}

/// Question-generation model served by Ollama.
pub struct OllamaQuestionModel {
    http: Client,
    base_url: String,
    model: String,
}

impl OllamaQuestionModel {
    /// Construct a client for the given runtime URL and model name.
    pub fn new(base_url: String, model: String) -> Self {
        Self {
            http: build_http_client(),
            base_url,
            model,
        }
    }
}

#[async_trait]
impl QuestionModel for OllamaQuestionModel {
    async fn generate(&self, sentence: &str) -> Result<String, GenerationError> {
        let prompt = format!(
            "Write one quiz question and its answer based only on the following sentence. \
             Respond in exactly this format: question: <question> answer: <answer>\n\n\
             Sentence: {sentence}"
        );
        generate(&self.http, &self.base_url, &self.model, prompt).await
    }
}

fn build_http_client() -> Client {
    Client::builder()
        .user_agent("studylens/generation")
        .build()
        .expect("Failed to construct reqwest::Client for generation")
}

fn endpoint(base_url: &str) -> String {
    format!("{}/api/generate", base_url.trim_end_matches('/'))
}

#[derive(Debug, Deserialize)]
struct OllamaResponse {
    response: String,
    done: bool,
}

async fn generate(
    http: &Client,
    base_url: &str,
    model: &str,
    prompt: String,
) -> Result<String, GenerationError> {
    let payload = json!({
        "model": model,
        "prompt": prompt,
        "stream": false,
        "options": {
            "temperature": 0.1,
        }
    });

    let response = http
        .post(endpoint(base_url))
        .json(&payload)
        .send()
        .await
        .map_err(|error| {
            GenerationError::ProviderUnavailable(format!(
                "failed to reach Ollama at {base_url}: {error}"
            ))
        })?;

    if response.status() == StatusCode::NOT_FOUND {
        return Err(GenerationError::ProviderUnavailable(format!(
            "Ollama endpoint {} returned 404",
            endpoint(base_url)
        )));
    }

    if !response.status().is_success() {
        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        return Err(GenerationError::GenerationFailed(format!(
            "Ollama returned {status}: {body}"
        )));
    }

    let body: OllamaResponse = response.json().await.map_err(|error| {
        GenerationError::InvalidResponse(format!("failed to decode Ollama response: {error}"))
    })?;

    if !body.done {
        return Err(GenerationError::InvalidResponse(
            "Ollama response incomplete (streaming not supported)".into(),
        ));
    }

    Ok(body.response.trim().to_string())
}

/// Resolve a tiktoken encoding for the configured model.
///
/// Unlike a catch-all default, resolution failure is an explicit `None`: the chunker then
/// measures words instead of tokens. Locally aliased Ollama model names rarely resolve, which
/// is expected and logged at debug level.
fn resolve_encoding(model: &str) -> Option<CoreBPE> {
    let normalized = model.trim();
    if normalized.is_empty() {
        return None;
    }
    match get_bpe_from_model(normalized) {
        Ok(encoding) => Some(encoding),
        Err(model_err) => {
            tracing::debug!(
                model,
                error = %model_err,
                "Tokenizer model lookup failed; trying encoding name"
            );
            encoding_from_name(normalized)
        }
    }
}

fn encoding_from_name(name: &str) -> Option<CoreBPE> {
    match name {
        "cl100k_base" => cl100k_base().ok(),
        "o200k_base" => o200k_base().ok(),
        "p50k_base" => p50k_base().ok(),
        "r50k_base" | "gpt2" => r50k_base().ok(),
        _ => None,
    }
}

/// Estimate the context window for common local model families.
fn context_window(model: &str) -> usize {
    let normalized = model.to_lowercase();
    match normalized.as_str() {
        value if value.contains("llama3") => 8192,
        value if value.contains("llama2") => 4096,
        value if value.contains("mistral") || value.contains("mixtral") => 8192,
        value if value.contains("qwen") => 8192,
        value if value.contains("gpt-4o") => 128_000,
        _ => {
            tracing::trace!(model, "Using default Ollama context window estimate");
            4096
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::{Method::POST, MockServer};

    #[tokio::test]
    async fn summary_model_handles_successful_response() {
        let server = MockServer::start_async().await;
        let model = OllamaSummaryModel::new(server.base_url(), "llama3.2".into());

        let mock = server
            .mock_async(|when, then| {
                when.method(POST).path("/api/generate");
                then.status(200).json_body(json!({
                    "response": "A short summary.",
                    "done": true
                }));
            })
            .await;

        let summary = model
            .summarize("Some long document text.", LengthBudget::final_pass(200))
            .await
            .expect("summary");

        mock.assert();
        assert_eq!(summary, "A short summary.");
    }

    #[tokio::test]
    async fn summary_model_surfaces_error_status() {
        let server = MockServer::start_async().await;
        let model = OllamaSummaryModel::new(server.base_url(), "llama3.2".into());

        server
            .mock_async(|when, then| {
                when.method(POST).path("/api/generate");
                then.status(500).body("boom");
            })
            .await;

        let error = model
            .summarize("text", LengthBudget::final_pass(100))
            .await
            .expect_err("error response");
        assert!(matches!(error, GenerationError::GenerationFailed(message) if message.contains("500")));
    }

    #[tokio::test]
    async fn incomplete_response_is_invalid() {
        let server = MockServer::start_async().await;
        let model = OllamaQuestionModel::new(server.base_url(), "llama3.2".into());

        server
            .mock_async(|when, then| {
                when.method(POST).path("/api/generate");
                then.status(200).json_body(json!({
                    "response": "partial",
                    "done": false
                }));
            })
            .await;

        let error = model.generate("A sentence.").await.expect_err("incomplete");
        assert!(matches!(error, GenerationError::InvalidResponse(_)));
    }

    #[tokio::test]
    async fn question_model_passes_markers_through() {
        let server = MockServer::start_async().await;
        let model = OllamaQuestionModel::new(server.base_url(), "llama3.2".into());

        server
            .mock_async(|when, then| {
                when.method(POST).path("/api/generate");
                then.status(200).json_body(json!({
                    "response": "question: What is Rust? answer: A systems language.",
                    "done": true
                }));
            })
            .await;

        let output = model.generate("Rust is a systems language.").await.expect("output");
        assert!(output.contains("question:"));
        assert!(output.contains("answer:"));
    }

    #[test]
    fn aliased_model_names_have_no_token_budget() {
        let model = OllamaSummaryModel::new(DEFAULT_OLLAMA_URL.into(), "llama3.2".into());
        assert!(model.token_budget().is_none());
    }

    #[test]
    fn known_encoding_names_resolve() {
        let model = OllamaSummaryModel::new(DEFAULT_OLLAMA_URL.into(), "cl100k_base".into());
        let budget = model.token_budget().expect("token budget");
        assert_eq!(budget.max_tokens(), 4096 - 50);
        assert!(budget.encode("hello world").len() >= 2);
    }
}
