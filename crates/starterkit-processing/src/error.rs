//! Custom error types for the preprocessing library.
//!
//! This module provides the error hierarchy using `thiserror`.
//! Per-column problems inside a transformation (unknown column, wrong column
//! kind, non-finite results) are not errors: they are recorded as skips in the
//! [`TransformReport`](crate::types::TransformReport). Only whole-request and
//! background-task failures surface here.
//!
//! Errors are serializable so a frontend can key off a stable code.

use serde::Serialize;
use serde::ser::SerializeStruct;
use thiserror::Error;

/// The main error type for the preprocessing library.
#[derive(Error, Debug)]
pub enum PreprocessingError {
    /// A transformation identifier outside the recognized set was requested.
    #[error("Unknown transformation kind '{0}'")]
    InvalidRequestKind(String),

    /// Column was not found in the dataset.
    #[error("Column '{0}' not found in dataset")]
    ColumnNotFound(String),

    /// Invalid configuration provided.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// The file extension does not map to a supported reader.
    #[error("Unsupported file format: '{0}'")]
    UnsupportedFormat(String),

    /// A background producer returned an error.
    #[error("Task '{task}' failed: {source}")]
    ProducerFailed {
        task: String,
        #[source]
        source: Box<PreprocessingError>,
    },

    /// A background producer panicked.
    #[error("Task '{task}' panicked: {message}")]
    ProducerPanicked { task: String, message: String },

    /// Internal error (e.g., thread spawn failure).
    #[error("Internal error: {0}")]
    Internal(String),

    /// A workbook could not be opened or read.
    #[error("Spreadsheet error: {0}")]
    Spreadsheet(String),

    /// IO error wrapper.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Polars error wrapper.
    #[error("Polars error: {0}")]
    Polars(#[from] polars::error::PolarsError),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Generic error with context.
    #[error("{context}: {source}")]
    WithContext {
        context: String,
        #[source]
        source: Box<PreprocessingError>,
    },
}

impl PreprocessingError {
    /// Add context to an error.
    pub fn with_context(self, context: impl Into<String>) -> Self {
        PreprocessingError::WithContext {
            context: context.into(),
            source: Box::new(self),
        }
    }

    /// Get error code for frontend handling.
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::InvalidRequestKind(_) => "INVALID_REQUEST_KIND",
            Self::ColumnNotFound(_) => "COLUMN_NOT_FOUND",
            Self::InvalidConfig(_) => "INVALID_CONFIG",
            Self::UnsupportedFormat(_) => "UNSUPPORTED_FORMAT",
            Self::ProducerFailed { .. } | Self::ProducerPanicked { .. } => "PRODUCER_FAILURE",
            Self::Internal(_) => "INTERNAL_ERROR",
            Self::Spreadsheet(_) => "SPREADSHEET_ERROR",
            Self::Io(_) => "IO_ERROR",
            Self::Polars(_) => "POLARS_ERROR",
            Self::Json(_) => "JSON_ERROR",
            Self::WithContext { source, .. } => source.error_code(),
        }
    }

    /// Check if this error came out of a background task.
    pub fn is_producer_failure(&self) -> bool {
        match self {
            Self::ProducerFailed { .. } | Self::ProducerPanicked { .. } => true,
            Self::WithContext { source, .. } => source.is_producer_failure(),
            _ => false,
        }
    }

    /// Check if this error is recoverable (the caller can fix the request and retry).
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Self::InvalidRequestKind(_)
                | Self::ColumnNotFound(_)
                | Self::InvalidConfig(_)
                | Self::UnsupportedFormat(_)
        )
    }
}

impl From<calamine::Error> for PreprocessingError {
    fn from(err: calamine::Error) -> Self {
        PreprocessingError::Spreadsheet(err.to_string())
    }
}

/// Serialize implementation for frontend IPC.
///
/// Errors are serialized as a struct with `code` and `message` fields.
impl Serialize for PreprocessingError {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        let mut state = serializer.serialize_struct("PreprocessingError", 2)?;
        state.serialize_field("code", &self.error_code())?;
        state.serialize_field("message", &self.to_string())?;
        state.end()
    }
}

/// Result type alias for preprocessing operations.
pub type Result<T> = std::result::Result<T, PreprocessingError>;

/// Extension trait for adding context to Results.
pub trait ResultExt<T> {
    /// Add context to an error result.
    fn context(self, context: impl Into<String>) -> Result<T>;
}

impl<T> ResultExt<T> for Result<T> {
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| e.with_context(context))
    }
}

impl<T> ResultExt<T> for std::result::Result<T, polars::error::PolarsError> {
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| PreprocessingError::Polars(e).with_context(context))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_code() {
        assert_eq!(
            PreprocessingError::InvalidRequestKind("Scaling".to_string()).error_code(),
            "INVALID_REQUEST_KIND"
        );
        assert_eq!(
            PreprocessingError::ColumnNotFound("test".to_string()).error_code(),
            "COLUMN_NOT_FOUND"
        );
    }

    #[test]
    fn test_producer_failure_code_covers_both_variants() {
        let failed = PreprocessingError::ProducerFailed {
            task: "load".to_string(),
            source: Box::new(PreprocessingError::UnsupportedFormat("xlsx".to_string())),
        };
        let panicked = PreprocessingError::ProducerPanicked {
            task: "load".to_string(),
            message: "boom".to_string(),
        };
        assert_eq!(failed.error_code(), "PRODUCER_FAILURE");
        assert_eq!(panicked.error_code(), "PRODUCER_FAILURE");
        assert!(failed.is_producer_failure());
        assert!(panicked.with_context("Loading").is_producer_failure());
    }

    #[test]
    fn test_is_recoverable() {
        assert!(PreprocessingError::InvalidRequestKind("x".to_string()).is_recoverable());
        assert!(PreprocessingError::UnsupportedFormat("xlsx".to_string()).is_recoverable());
        assert!(!PreprocessingError::Internal("error".to_string()).is_recoverable());
    }

    #[test]
    fn test_error_serialization() {
        let error = PreprocessingError::InvalidRequestKind("Scaling".to_string());
        let json = serde_json::to_string(&error).unwrap();
        assert!(json.contains("INVALID_REQUEST_KIND"));
        assert!(json.contains("Scaling"));
    }

    #[test]
    fn test_with_context() {
        let error =
            PreprocessingError::ColumnNotFound("test".to_string()).with_context("During imputation");
        assert!(error.to_string().contains("During imputation"));
        assert_eq!(error.error_code(), "COLUMN_NOT_FOUND");
    }
}
