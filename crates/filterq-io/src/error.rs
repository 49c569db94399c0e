use thiserror::Error;

/// Failures of the in-memory backends.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum StoreError {
    /// An operator the in-memory evaluator cannot run (e.g. `$text`).
    #[error("unsupported operator: {0}")]
    Unsupported(String),

    #[error("invalid pattern {pattern:?}: {reason}")]
    InvalidPattern { pattern: String, reason: String },

    /// Driver-level failure, or one armed with `fail_with`.
    #[error("backend error: {0}")]
    Backend(String),
}

pub type Result<T> = std::result::Result<T, StoreError>;
