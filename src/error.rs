//! Error types for the configuration persistence engine.

use crate::model::Dialect;
use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while splitting a single line into shell-like tokens.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TokenizeError {
    #[error("Unterminated {quote} quote starting at column {column}")]
    UnterminatedQuote { quote: char, column: usize },

    #[error("No escaped character after backslash at column {column}")]
    DanglingEscape { column: usize },
}

/// Errors surfaced by reading, merging and persisting configuration files
#[derive(Debug, Error)]
pub enum ConfError {
    #[error("Configuration file not found: {0}")]
    NotFound(PathBuf),

    #[error("Line {line}: {source}")]
    Tokenize {
        line: usize,
        #[source]
        source: TokenizeError,
    },

    #[error("Line {line}: {message}")]
    Parse { line: usize, message: String },

    #[error("Failed to persist {path}: {source}")]
    Persist {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Dialect mismatch: expected {expected}, found {found}")]
    DialectMismatch { expected: Dialect, found: Dialect },

    #[error("Unknown configuration file type: {0}")]
    UnknownDialect(String),

    #[error("Cannot write {entry}: {reason}")]
    InvalidEntry { entry: String, reason: String },
}

impl ConfError {
    pub(crate) fn parse(line: usize, message: impl Into<String>) -> Self {
        ConfError::Parse {
            line,
            message: message.into(),
        }
    }

    pub(crate) fn persist(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        ConfError::Persist {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn invalid(entry: impl Into<String>, reason: impl Into<String>) -> Self {
        ConfError::InvalidEntry {
            entry: entry.into(),
            reason: reason.into(),
        }
    }

    /// True when the error only reports a missing file, so callers may start from
    /// an empty model instead.
    pub fn is_not_found(&self) -> bool {
        matches!(self, ConfError::NotFound(_))
    }
}

/// Errors from the ambient settings and logging layer
#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("Failed to load settings: {0}")]
    Load(#[from] config::ConfigError),

    #[error("Logging setup failed: {0}")]
    Logging(String),
}
