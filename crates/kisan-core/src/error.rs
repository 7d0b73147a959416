use thiserror::Error;

/// Top-level error type for the Kisan conversation engine.
///
/// Each variant wraps a subsystem-specific failure. Subsystem crates define
/// their own error types and implement `From<SubsystemError> for KisanError`
/// so that the `?` operator works seamlessly across crate boundaries.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum KisanError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Inference error: {0}")]
    Inference(String),

    #[error("Attachment error: {0}")]
    Media(String),

    #[error("Voice error: {0}")]
    Voice(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl From<toml::de::Error> for KisanError {
    fn from(err: toml::de::Error) -> Self {
        KisanError::Config(err.to_string())
    }
}

impl From<toml::ser::Error> for KisanError {
    fn from(err: toml::ser::Error) -> Self {
        KisanError::Config(err.to_string())
    }
}

impl From<serde_json::Error> for KisanError {
    fn from(err: serde_json::Error) -> Self {
        KisanError::Serialization(err.to_string())
    }
}

/// A specialized `Result` type for Kisan operations.
pub type Result<T> = std::result::Result<T, KisanError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = KisanError::Storage("disk full".to_string());
        assert_eq!(err.to_string(), "Storage error: disk full");

        let err = KisanError::Inference("backend timed out".to_string());
        assert_eq!(err.to_string(), "Inference error: backend timed out");

        let err = KisanError::Media("not an image".to_string());
        assert_eq!(err.to_string(), "Attachment error: not an image");

        let err = KisanError::Voice("no capability".to_string());
        assert_eq!(err.to_string(), "Voice error: no capability");
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: KisanError = io_err.into();
        assert!(matches!(err, KisanError::Io(_)));
        assert!(err.to_string().contains("file not found"));
    }

    #[test]
    fn test_error_from_toml_de() {
        let bad = "invalid = [[[";
        let parsed: std::result::Result<toml::Value, _> = toml::from_str(bad);
        let err: KisanError = parsed.unwrap_err().into();
        assert!(matches!(err, KisanError::Config(_)));
    }

    #[test]
    fn test_error_from_serde_json() {
        let parsed: std::result::Result<serde_json::Value, _> =
            serde_json::from_str("{ invalid json }");
        let err: KisanError = parsed.unwrap_err().into();
        assert!(matches!(err, KisanError::Serialization(_)));
    }

    #[test]
    fn test_result_type_with_question_mark() {
        fn inner() -> Result<i32> {
            let io_result: std::result::Result<i32, std::io::Error> = Ok(7);
            Ok(io_result?)
        }
        assert_eq!(inner().unwrap(), 7);
    }
}
