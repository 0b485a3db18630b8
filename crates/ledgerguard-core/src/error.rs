//! Error types for LedgerGuard.

use thiserror::Error;

/// Result type alias using `EngineError`.
pub type Result<T> = std::result::Result<T, EngineError>;

/// Errors that can occur at the engine's boundaries.
///
/// The detection pipeline itself is pure and recovers every internal fault
/// locally; these errors surface only from configuration parsing, input
/// validation at the execution boundary, and timeouts.
#[derive(Debug, Error)]
pub enum EngineError {
    /// Input validation failed.
    #[error("Input validation failed: {0}")]
    ValidationError(String),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Serialization error.
    #[error("Serialization error: {0}")]
    SerializationError(String),

    /// Deserialization error.
    #[error("Deserialization error: {0}")]
    DeserializationError(String),

    /// Timeout waiting for a check to complete.
    #[error("Timeout waiting for check after {0:?}")]
    Timeout(std::time::Duration),

    /// Internal error.
    #[error("Internal error: {0}")]
    InternalError(String),
}

impl EngineError {
    /// Create a validation error.
    #[must_use]
    pub fn validation(msg: impl Into<String>) -> Self {
        EngineError::ValidationError(msg.into())
    }

    /// Create a configuration error.
    #[must_use]
    pub fn config(msg: impl Into<String>) -> Self {
        EngineError::ConfigError(msg.into())
    }

    /// Create an internal error.
    #[must_use]
    pub fn internal(msg: impl Into<String>) -> Self {
        EngineError::InternalError(msg.into())
    }

    /// Returns true if the caller can retry or correct the request.
    #[must_use]
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            EngineError::ValidationError(_)
                | EngineError::ConfigError(_)
                | EngineError::Timeout(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = EngineError::validation("amount must be positive");
        assert_eq!(
            err.to_string(),
            "Input validation failed: amount must be positive"
        );
    }

    #[test]
    fn test_recoverable_classification() {
        assert!(EngineError::validation("x").is_recoverable());
        assert!(EngineError::config("x").is_recoverable());
        assert!(EngineError::Timeout(std::time::Duration::from_secs(1)).is_recoverable());
        assert!(!EngineError::internal("x").is_recoverable());
    }
}
