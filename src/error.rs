//! Error types for the explainer core.
//!
//! The pipeline and CLI wrap these in `anyhow`; everything below the
//! pipeline returns them directly so callers can match on the category.

use thiserror::Error;

/// Top-level error for segmentation, generation and orchestration.
#[derive(Debug, Error)]
pub enum ExplainError {
    #[error("invalid segmentation parameters: chunk_size={chunk_size}, overlap={overlap}")]
    InvalidParameters { chunk_size: usize, overlap: usize },

    #[error("extraction failed: {0}")]
    Extraction(#[from] ExtractionError),

    #[error("backend failed: {0}")]
    Backend(#[from] BackendError),

    #[error("document is empty after extraction")]
    EmptyDocument,

    #[error("similar-paper search is not available")]
    SearchUnavailable,

    #[error("configuration error: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, ExplainError>;

/// Failure of a single generation (or search) call.
#[derive(Debug, Clone, Error)]
pub enum BackendError {
    #[error("API request failed: {message} (status: {status_code})")]
    Api { status_code: u16, message: String },

    #[error("rate limited by provider")]
    RateLimited,

    #[error("authentication failed: {0}")]
    AuthenticationFailed(String),

    #[error("network error: {0}")]
    Network(String),

    #[error("empty response from model {model}")]
    EmptyResponse { model: String },

    #[error("prompt `{template}` is missing variable `{variable}`")]
    MissingVariable { template: String, variable: String },

    #[error("backend not configured: {0}")]
    NotConfigured(String),
}

/// Failure to turn a source file into text.
#[derive(Debug, Error)]
pub enum ExtractionError {
    #[error("unsupported input type: {path}")]
    Unsupported { path: String },

    #[error("input does not exist: {path}")]
    NotFound { path: String },

    #[error("URL inputs are disabled: {path}")]
    UrlRejected { path: String },

    #[error("input exceeds max_input_file_bytes ({bytes} > {limit}): {path}")]
    TooLarge { path: String, bytes: u64, limit: u64 },

    #[error("unreadable input {path}: {reason}")]
    Unreadable { path: String, reason: String },
}
