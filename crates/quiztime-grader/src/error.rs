//! Grader error types.

use thiserror::Error;

/// Errors that can occur when grading with the remote service.
#[derive(Debug, Error)]
pub enum GraderError {
    /// No API key is configured. Raised before any request is made.
    #[error("Gemini API key not set. Configure it with `quiztime set-key` or QUIZTIME_GEMINI_KEY")]
    CredentialMissing,

    /// The API returned a non-success response.
    #[error("Gemini API error (HTTP {status}): {message}")]
    ApiError { status: u16, message: String },

    /// The response did not contain a judgment.
    #[error("invalid response from Gemini API: {0}")]
    MalformedResponse(String),

    /// The request timed out.
    #[error("request timed out after {0}s")]
    Timeout(u64),

    /// A network error occurred.
    #[error("network error: {0}")]
    NetworkError(String),
}

impl GraderError {
    /// Returns `true` if the failure came from the remote side rather than
    /// local configuration.
    pub fn is_remote(&self) -> bool {
        !matches!(self, GraderError::CredentialMissing)
    }

    /// HTTP status of the failed response, if there was one.
    pub fn status(&self) -> Option<u16> {
        match self {
            GraderError::ApiError { status, .. } => Some(*status),
            _ => None,
        }
    }
}
