//! Error types for style overlay loading
//!
//! Two domain errors exist: [`ParseError`] for malformed document structure and
//! [`ValidationError`] for well-formed documents carrying an invalid field.
//! [`OverlayError`] wraps both together with I/O and serialization failures.

use thiserror::Error;

/// Malformed input structure (missing colon, bad indentation, ...)
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Parse error at line {line}: {message}")]
pub struct ParseError {
    /// 1-based line number of the offending line (0 when unknown)
    pub line: usize,
    /// Human-readable description
    pub message: String,
}

impl ParseError {
    /// Create a parse error for a specific line
    pub fn at(line: usize, message: impl Into<String>) -> Self {
        Self {
            line,
            message: message.into(),
        }
    }

    /// Create a parse error without line information
    pub fn new(message: impl Into<String>) -> Self {
        Self::at(0, message)
    }
}

/// Well-formed but semantically invalid field
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Invalid field '{field}': {reason}")]
pub struct ValidationError {
    /// Path of the offending field (e.g. `heat_dial`, `ops_scope.granularity`)
    pub field: String,
    /// Why the value was rejected
    pub reason: String,
}

impl ValidationError {
    /// Create a validation error
    pub fn new(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            reason: reason.into(),
        }
    }
}

/// Top-level error type for overlay operations
#[derive(Error, Debug)]
pub enum OverlayError {
    /// Document structure could not be parsed
    #[error(transparent)]
    Parse(#[from] ParseError),

    /// Document parsed but a field is invalid
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// File access or I/O error
    #[error("File error: {0}")]
    FileError(String),

    /// Invalid arguments or settings
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Output serialization failed
    #[error("Serialization error: {0}")]
    SerializationError(String),
}

impl OverlayError {
    /// Create an invalid input error
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        OverlayError::InvalidInput(msg.into())
    }

    /// Create a file error
    pub fn file_error(msg: impl Into<String>) -> Self {
        OverlayError::FileError(msg.into())
    }

    /// Check if this is a user-facing error (vs internal)
    pub fn is_user_error(&self) -> bool {
        !matches!(self, OverlayError::SerializationError(_))
    }
}

impl From<std::io::Error> for OverlayError {
    fn from(err: std::io::Error) -> Self {
        OverlayError::FileError(err.to_string())
    }
}

impl From<serde_json::Error> for ParseError {
    fn from(err: serde_json::Error) -> Self {
        ParseError::at(err.line(), format!("JSON error: {}", err))
    }
}

impl From<serde_yaml::Error> for ParseError {
    fn from(err: serde_yaml::Error) -> Self {
        let line = err.location().map(|l| l.line()).unwrap_or(0);
        ParseError::at(line, format!("YAML error: {}", err))
    }
}

impl From<toml::de::Error> for ParseError {
    fn from(err: toml::de::Error) -> Self {
        ParseError::new(format!("TOML error: {}", err.message()))
    }
}

/// Result type alias for overlay operations
pub type Result<T> = std::result::Result<T, OverlayError>;
