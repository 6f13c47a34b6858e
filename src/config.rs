use serde::Deserialize;
use std::env;
use std::sync::OnceLock;
use thiserror::Error;

/// Errors encountered while loading configuration from environment variables.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Required environment variable was not provided.
    #[error("Missing environment variable: {0}")]
    MissingVariable(String),
    /// Environment variable contained a value that could not be parsed.
    #[error("Invalid value for environment variable: {0}")]
    InvalidValue(String),
}

/// Runtime configuration for the StudyLens server.
#[derive(Debug, Deserialize)]
pub struct Config {
    /// Backend used for generative summarization and question generation.
    pub generation_provider: GenerationProvider,
    /// Base URL of the Ollama runtime when the provider is `ollama`.
    pub ollama_url: Option<String>,
    /// Model identifier used for abstractive summarization.
    pub summarizer_model: String,
    /// Model identifier used for quiz question generation.
    pub question_model: String,
    /// Whether the question-generation model should be constructed at all.
    pub enable_quiz: bool,
    /// Optional override for the word-based chunk size fallback.
    pub summary_chunk_words: Option<usize>,
    /// Dimensionality of the keyword-ranking embedding vectors.
    pub embedding_dimension: usize,
    /// Number of keywords returned per analysis.
    pub keyword_top_n: usize,
    /// Optional override for the HTTP server port.
    pub server_port: Option<u16>,
}

/// Supported generation backends for the analysis pipeline.
#[derive(Clone, Copy, Debug, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum GenerationProvider {
    /// No generative models; every pipeline runs in degraded heuristic mode.
    None,
    /// Local Ollama runtime.
    Ollama,
}

const DEFAULT_SUMMARIZER_MODEL: &str = "llama3.2";
const DEFAULT_QUESTION_MODEL: &str = "llama3.2";
const DEFAULT_EMBEDDING_DIMENSION: usize = 256;
const DEFAULT_KEYWORD_TOP_N: usize = 10;

impl Config {
    /// Load configuration from environment variables, performing validation along the way.
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            generation_provider: load_env("GENERATION_PROVIDER")?
                .parse()
                .map_err(|()| ConfigError::InvalidValue("GENERATION_PROVIDER".to_string()))?,
            ollama_url: load_env_optional("OLLAMA_URL"),
            summarizer_model: load_env_optional("SUMMARIZER_MODEL")
                .unwrap_or_else(|| DEFAULT_SUMMARIZER_MODEL.to_string()),
            question_model: load_env_optional("QUESTION_MODEL")
                .unwrap_or_else(|| DEFAULT_QUESTION_MODEL.to_string()),
            enable_quiz: load_env_optional("ENABLE_QUIZ")
                .map(|value| {
                    parse_bool(&value).ok_or(ConfigError::InvalidValue("ENABLE_QUIZ".to_string()))
                })
                .transpose()?
                .unwrap_or(true),
            summary_chunk_words: load_env_optional("SUMMARY_CHUNK_WORDS")
                .map(|value| {
                    value
                        .parse()
                        .map_err(|_| ConfigError::InvalidValue("SUMMARY_CHUNK_WORDS".to_string()))
                })
                .transpose()?,
            embedding_dimension: load_env_optional("EMBEDDING_DIMENSION")
                .map(|value| {
                    value
                        .parse()
                        .map_err(|_| ConfigError::InvalidValue("EMBEDDING_DIMENSION".to_string()))
                })
                .transpose()?
                .unwrap_or(DEFAULT_EMBEDDING_DIMENSION),
            keyword_top_n: load_env_optional("KEYWORD_TOP_N")
                .map(|value| {
                    value
                        .parse()
                        .map_err(|_| ConfigError::InvalidValue("KEYWORD_TOP_N".to_string()))
                })
                .transpose()?
                .unwrap_or(DEFAULT_KEYWORD_TOP_N),
            server_port: load_env_optional("SERVER_PORT")
                .map(|value| {
                    value
                        .parse()
                        .map_err(|_| ConfigError::InvalidValue("SERVER_PORT".into()))
                })
                .transpose()?,
        })
    }
}

fn load_env(key: &str) -> Result<String, ConfigError> {
    env::var(key).map_err(|_| ConfigError::MissingVariable(key.to_string()))
}

fn load_env_optional(key: &str) -> Option<String> {
    env::var(key).ok().filter(|value| !value.trim().is_empty())
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.to_lowercase().as_str() {
        "1" | "true" | "yes" => Some(true),
        "0" | "false" | "no" => Some(false),
        _ => None,
    }
}

impl std::str::FromStr for GenerationProvider {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "none" => Ok(Self::None),
            "ollama" => Ok(Self::Ollama),
            _ => Err(()),
        }
    }
}

/// Global configuration cache populated during process start.
pub static CONFIG: OnceLock<Config> = OnceLock::new();

/// Retrieve the loaded configuration, panicking if initialization has not occurred.
pub fn get_config() -> &'static Config {
    CONFIG.get().expect("Config not initialized")
}

/// Load configuration from the environment and install it in the global cache.
pub fn init_config() {
    dotenvy::dotenv().ok();
    let config = Config::from_env().expect("Failed to load config from environment");
    tracing::debug!(
        provider = ?config.generation_provider,
        summarizer_model = %config.summarizer_model,
        question_model = %config.question_model,
        enable_quiz = config.enable_quiz,
        server_port = ?config.server_port,
        "Loaded configuration"
    );
    CONFIG.set(config).expect("Failed to set config");
}
