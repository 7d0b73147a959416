//! Error types for the inference client.

use kisan_core::error::KisanError;

/// Errors from the AI backend call.
///
/// The session does not distinguish between these; they exist so logs and
/// events can say what actually went wrong.
#[derive(Debug, thiserror::Error)]
pub enum InferenceError {
    #[error("transport failure: {0}")]
    Transport(String),
    #[error("backend returned status {status}")]
    Backend { status: u16 },
    #[error("malformed backend response: {0}")]
    MalformedResponse(String),
}

impl From<reqwest::Error> for InferenceError {
    fn from(err: reqwest::Error) -> Self {
        // Timeouts surface here too; they are deliberately not a separate
        // variant since the session treats all failures identically.
        InferenceError::Transport(err.to_string())
    }
}

impl From<InferenceError> for KisanError {
    fn from(err: InferenceError) -> Self {
        KisanError::Inference(err.to_string())
    }
}
