use std::sync::atomic::{AtomicU64, Ordering};

/// Thread-safe counters describing analysis activity.
#[derive(Default)]
pub struct AnalysisMetrics {
    documents_analyzed: AtomicU64,
    quizzes_generated: AtomicU64,
    heuristic_fallbacks: AtomicU64,
    last_chunk_count: AtomicU64,
}

impl AnalysisMetrics {
    /// Create an empty metrics accumulator.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a completed document analysis and the number of chunks it produced.
    ///
    /// A zero chunk count means the document bypassed chunking entirely; the counter keeps
    /// the last real chunking result in that case.
    pub fn record_document(&self, chunk_count: u64) {
        self.documents_analyzed.fetch_add(1, Ordering::Relaxed);
        if chunk_count > 0 {
            self.last_chunk_count.store(chunk_count, Ordering::Relaxed);
        }
    }

    /// Record a completed quiz generation.
    pub fn record_quiz(&self) {
        self.quizzes_generated.fetch_add(1, Ordering::Relaxed);
    }

    /// Record that a generative path degraded to a heuristic fallback.
    pub fn record_heuristic_fallback(&self) {
        self.heuristic_fallbacks.fetch_add(1, Ordering::Relaxed);
    }

    /// Return a snapshot of the current counters.
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            documents_analyzed: self.documents_analyzed.load(Ordering::Relaxed),
            quizzes_generated: self.quizzes_generated.load(Ordering::Relaxed),
            heuristic_fallbacks: self.heuristic_fallbacks.load(Ordering::Relaxed),
            last_chunk_count: match self.last_chunk_count.load(Ordering::Relaxed) {
                0 => None,
                count => Some(count),
            },
        }
    }
}

/// Immutable view of analysis counters used for reporting.
#[derive(Debug, Clone, Copy, serde::Serialize)]
pub struct MetricsSnapshot {
    /// Number of documents analyzed since startup.
    pub documents_analyzed: u64,
    /// Number of quizzes generated since startup.
    pub quizzes_generated: u64,
    /// Number of times a generative path degraded to a heuristic.
    pub heuristic_fallbacks: u64,
    /// Chunk count produced by the most recent summarization, if any.
    pub last_chunk_count: Option<u64>,
}
