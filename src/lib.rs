#![deny(missing_docs)]

//! Core library for the StudyLens document analysis service.

/// Document analysis pipelines: summarization, quizzes, keywords, sentiment.
pub mod analysis;
/// HTTP routing and REST handlers.
pub mod api;
/// Environment-driven configuration management.
pub mod config;
/// Embedding client abstraction used by keyword ranking.
pub mod embedding;
/// Text extraction from uploaded document formats.
pub mod extract;
/// Generative model traits, budgets, and Ollama adapters.
pub mod generation;
/// Structured logging and tracing setup.
pub mod logging;
/// Analysis metrics helpers.
pub mod metrics;
