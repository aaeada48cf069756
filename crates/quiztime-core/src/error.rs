//! Core error types.
//!
//! Selection and ledger failures are returned as `QuizError`, usually wrapped
//! in `anyhow::Error`. Callers classify them with `downcast_ref` rather than
//! matching on message text.

use thiserror::Error;

/// Errors raised by the selector, catalog and score ledger.
#[derive(Debug, Error)]
pub enum QuizError {
    /// No question survives the requested filters and exclusions.
    #[error("no questions available for the selected filters")]
    NoCandidates,

    /// The catalog failed a hard validation rule.
    #[error("invalid catalog: {0}")]
    InvalidCatalog(String),

    /// The persisted score list could not be parsed.
    #[error("stored scores are corrupt: {0}")]
    CorruptScores(#[source] serde_json::Error),

    /// A value stored under a key could not be decoded or encoded.
    #[error("storage error: {0}")]
    Storage(String),
}

impl QuizError {
    /// Returns `true` if the error is fixed by relaxing filters or resetting
    /// the session's shown questions.
    pub fn is_pool_exhausted(&self) -> bool {
        matches!(self, QuizError::NoCandidates)
    }
}
