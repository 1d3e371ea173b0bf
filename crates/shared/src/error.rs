use thiserror::Error;

/// Failure kinds for one posting run.
///
/// `SearchFailed` is absorbed per query by the orchestrator and only
/// degrades the candidate pool; every other kind aborts the run.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("search failed for '{query}': {reason}")]
    SearchFailed { query: String, reason: String },

    #[error("content generation failed: {0}")]
    GenerationFailed(String),

    #[error("publish failed: {0}")]
    PublishFailed(String),

    #[error("history store unavailable: {0}")]
    HistoryUnavailable(String),
}
