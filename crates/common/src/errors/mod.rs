//! Error types for the research pipeline
//!
//! Provides:
//! - Distinct error types for each failure class
//! - Machine-readable error codes

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type alias using AppError
pub type Result<T> = std::result::Result<T, AppError>;

/// Error codes for machine-readable error identification
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    // Validation errors (1xxx)
    ValidationError,

    // External capability errors (8xxx)
    SearchFailure,
    DraftFailure,
    UpstreamError,
    Timeout,

    // Persistence errors (7xxx)
    PersistFailure,

    // Internal errors (9xxx)
    InternalError,
    ConfigurationError,
    SerializationError,
}

impl ErrorCode {
    /// Get the numeric code for this error
    pub fn as_code(&self) -> u16 {
        match self {
            ErrorCode::ValidationError => 1001,

            ErrorCode::PersistFailure => 7001,

            ErrorCode::SearchFailure => 8001,
            ErrorCode::DraftFailure => 8002,
            ErrorCode::UpstreamError => 8003,
            ErrorCode::Timeout => 8004,

            ErrorCode::InternalError => 9001,
            ErrorCode::ConfigurationError => 9002,
            ErrorCode::SerializationError => 9003,
        }
    }
}

/// Application error types
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Validation failed: {message}")]
    Validation {
        message: String,
        field: Option<String>,
    },

    #[error("Configuration error: {message}")]
    Configuration { message: String },

    // Capability failures
    #[error("Search failed: {message}")]
    SearchFailure { message: String },

    #[error("Draft generation failed: {message}")]
    DraftFailure { message: String },

    #[error("{operation} timed out after {timeout_ms}ms")]
    Timeout { operation: String, timeout_ms: u64 },

    #[error("HTTP client error: {0}")]
    HttpClient(#[from] reqwest::Error),

    // Persistence
    #[error("Failed to persist results: {message}")]
    PersistFailure { message: String },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    // Generic
    #[error("{0}")]
    Other(#[from] anyhow::Error),
}

impl AppError {
    /// Get the error code for this error
    pub fn code(&self) -> ErrorCode {
        match self {
            AppError::Validation { .. } => ErrorCode::ValidationError,
            AppError::Configuration { .. } => ErrorCode::ConfigurationError,
            AppError::SearchFailure { .. } => ErrorCode::SearchFailure,
            AppError::DraftFailure { .. } => ErrorCode::DraftFailure,
            AppError::Timeout { .. } => ErrorCode::Timeout,
            AppError::HttpClient(_) => ErrorCode::UpstreamError,
            AppError::PersistFailure { .. } => ErrorCode::PersistFailure,
            AppError::Serialization(_) => ErrorCode::SerializationError,
            AppError::Other(_) => ErrorCode::InternalError,
        }
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        AppError::PersistFailure {
            message: err.to_string(),
        }
    }
}

impl From<config::ConfigError> for AppError {
    fn from(err: config::ConfigError) -> Self {
        AppError::Configuration {
            message: err.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_code_mapping() {
        let err = AppError::SearchFailure {
            message: "connection refused".into(),
        };
        assert_eq!(err.code(), ErrorCode::SearchFailure);
        assert_eq!(err.code().as_code(), 8001);
    }

    #[test]
    fn test_validation_error() {
        let err = AppError::Validation {
            message: "query must not be empty".into(),
            field: Some("query".into()),
        };
        assert_eq!(err.code(), ErrorCode::ValidationError);
        assert_eq!(err.code().as_code(), 1001);
    }

    #[test]
    fn test_io_error_becomes_persist_failure() {
        let io = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "read-only");
        let err: AppError = io.into();
        assert_eq!(err.code(), ErrorCode::PersistFailure);
        assert!(err.to_string().contains("read-only"));
    }

    #[test]
    fn test_timeout_message() {
        let err = AppError::Timeout {
            operation: "search".into(),
            timeout_ms: 1500,
        };
        assert_eq!(err.to_string(), "search timed out after 1500ms");
    }
}
