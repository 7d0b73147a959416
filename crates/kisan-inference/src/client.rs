//! The inference contract consumed by the conversation session.

use async_trait::async_trait;

use kisan_core::types::{ImageAttachment, Language};

use crate::error::InferenceError;

/// One prompt for the AI backend.
#[derive(Clone, Debug)]
pub struct InferenceRequest {
    /// The user's question. May be empty when an image carries the question.
    pub prompt: String,
    /// At most one inline image, sent as a data URI.
    pub image: Option<ImageAttachment>,
    /// Language the answer should be written in.
    pub language: Language,
}

impl InferenceRequest {
    /// The JSON body the backend expects: `{prompt, image?, language}` with
    /// the image rendered as a data URI string.
    pub fn wire_body(&self) -> serde_json::Value {
        let mut body = serde_json::json!({
            "prompt": self.prompt,
            "language": self.language.code(),
        });
        if let Some(image) = &self.image {
            body["image"] = serde_json::Value::String(image.to_data_uri());
        }
        body
    }
}

/// A client that can turn a prompt into generated text.
///
/// Implementations carry their own bounded timeout; expiry is reported as an
/// ordinary [`InferenceError`], never as a hang.
#[async_trait]
pub trait InferenceClient: Send + Sync {
    /// Generate an answer for the request, or fail as one uniform signal.
    async fn generate(&self, request: InferenceRequest) -> Result<String, InferenceError>;
}

// =============================================================================
// Tests
// =============================================================================
