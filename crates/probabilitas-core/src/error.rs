//! Error types for Probabilitas

use std::fmt;

/// Result type alias using Probabilitas' Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Kind of record a lookup failed to find
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordKind {
    Project,
    Attribute,
    Class,
}

impl fmt::Display for RecordKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Project => "project",
            Self::Attribute => "attribute",
            Self::Class => "class",
        };
        f.write_str(name)
    }
}

/// Core error type for Probabilitas operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Rejected input: empty selection, foreign attribute id, bad name or prior
    #[error("validation error: {0}")]
    Validation(String),

    /// A referenced record does not exist in the addressed project
    #[error("{kind} {id} not found")]
    NotFound { kind: RecordKind, id: u64 },

    /// Configuration errors
    #[error("configuration error: {0}")]
    Config(String),

    /// Filesystem errors
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization errors
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Generic internal errors
    #[error("internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Create a new validation error
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Create a new not-found error
    pub fn not_found(kind: RecordKind, id: impl Into<u64>) -> Self {
        Self::NotFound {
            kind,
            id: id.into(),
        }
    }

    /// Create a new configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create a new internal error
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    /// Whether this error was caused by caller input rather than the system
    pub fn is_client_error(&self) -> bool {
        matches!(self, Self::Validation(_) | Self::NotFound { .. })
    }
}
