//! Error types for the conversational core.

use kisan_core::error::KisanError;

/// Errors from the chat engine.
///
/// Deliberately small: almost every failure in a live session is absorbed at
/// the component boundary (apology turn, passive notice, logged event). Only
/// the explicit, user-initiated history operations return errors.
#[derive(Debug, thiserror::Error)]
pub enum ChatError {
    #[error("storage error: {0}")]
    Storage(String),
}

impl From<KisanError> for ChatError {
    fn from(err: KisanError) -> Self {
        ChatError::Storage(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chat_error_display() {
        let err = ChatError::Storage("disk full".to_string());
        assert_eq!(err.to_string(), "storage error: disk full");
    }

    #[test]
    fn test_chat_error_from_kisan_error() {
        let err: ChatError = KisanError::Storage("connection lost".to_string()).into();
        assert!(matches!(err, ChatError::Storage(_)));
        assert!(err.to_string().contains("connection lost"));
    }
}
