use radar_collectors::CollectorError;
use radar_db::DbError;
use thiserror::Error;

/// Failure of one text-completion call. Always converted to the caller's
/// deterministic fallback; never surfaces from a workflow.
#[derive(Debug, Error)]
pub enum CompletionError {
    #[error("completion service is not configured")]
    Unconfigured,

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("completion API returned status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("completion response had no content")]
    Empty,

    #[error("completion content is not a JSON object: {0}")]
    Json(String),
}

/// The grouping strategy could not produce labels for its input.
#[derive(Debug, Error)]
pub enum ClusterError {
    #[error("no vocabulary terms remain after stopword filtering")]
    EmptyVocabulary,

    #[error("expected {expected} labels, got {found}")]
    LabelCountMismatch { expected: usize, found: usize },
}

/// Workflow-level failure. Only storage problems (and construction-time
/// client setup) reach this type.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error(transparent)]
    Db(#[from] DbError),

    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),

    #[error("collector setup failed: {0}")]
    Collector(#[from] CollectorError),

    #[error("completion setup failed: {0}")]
    Completion(#[from] CompletionError),
}
