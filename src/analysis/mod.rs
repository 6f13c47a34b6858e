//! Document analysis pipelines: summarization, quiz generation, keywords, and sentiment.

pub mod chunking;
pub mod entities;
pub mod keywords;
pub mod normalize;
pub mod quiz;
pub mod sentiment;
pub mod summarize;
mod service;
pub mod types;

pub use service::{AnalysisApi, AnalysisService};
pub use types::{AnalysisError, AnalysisReport, ModelReadiness, QuizItem, QuizResult};
