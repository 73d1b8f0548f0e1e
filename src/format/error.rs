//! Error types for annotation file operations.

use thiserror::Error;

/// Errors that can occur while reading or writing annotation files.
#[derive(Error, Debug)]
pub enum FormatError {
    /// I/O error during file operations
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON parsing or serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Invalid format structure or content
    #[error("Invalid format: {message}")]
    InvalidFormat {
        /// Description of the format error
        message: String,
    },

    /// Required field is missing
    #[error("Missing required field: {field}")]
    MissingField {
        /// Name of the missing field
        field: String,
    },

    /// An annotation record is malformed or violates an invariant
    #[error("Invalid annotation at index {index}: {message}")]
    InvalidAnnotation {
        /// Position of the record in the `annotations` array
        index: usize,
        /// What is wrong with it
        message: String,
    },

    /// Version mismatch between expected and found
    #[error("Version mismatch: expected {expected}, found {found}")]
    VersionMismatch {
        /// Expected version string
        expected: String,
        /// Found version string
        found: String,
    },
}

impl FormatError {
    /// Create an invalid format error with a message.
    pub fn invalid_format(message: impl Into<String>) -> Self {
        Self::InvalidFormat {
            message: message.into(),
        }
    }

    /// Create a missing field error.
    pub fn missing_field(field: impl Into<String>) -> Self {
        Self::MissingField {
            field: field.into(),
        }
    }

    /// Create an invalid annotation error.
    pub fn invalid_annotation(index: usize, message: impl Into<String>) -> Self {
        Self::InvalidAnnotation {
            index,
            message: message.into(),
        }
    }
}
