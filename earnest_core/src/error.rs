//! Error types for earnest_core.

use crate::key::Key;
use thiserror::Error;

/// Result type alias using earnest_core's Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while building or querying magic containers.
#[derive(Error, Debug)]
pub enum Error {
    /// Key, index or path could not be resolved.
    ///
    /// For path lookups `key` is the part of the path consumed when the
    /// failure was detected.
    #[error("Key not found: {key}")]
    KeyNotFound { key: Key },

    /// Wrong key kind for a container, or a value of the wrong type.
    #[error("Type mismatch: {reason}")]
    TypeMismatch { reason: String },

    /// Empty path, or a path with an unusable non-terminal component.
    #[error("Malformed path: {reason}")]
    MalformedPath { reason: String },

    /// Type filter name outside the recognized set.
    #[error("Invalid type filter: {name} (type filter must be one of bool, dict, float, int, list, str)")]
    InvalidTypeFilter { name: String },

    /// Operation that is never supported, such as a stepped filter.
    #[error("Not supported: {reason}")]
    NotSupported { reason: String },

    /// Input value cannot be represented in the magic data model.
    #[error("Value not allowed: {reason}")]
    ValueNotAllowed { reason: String },

    /// JSON (de)serialization error.
    #[error("JSON error: {source}")]
    Json {
        #[from]
        source: serde_json::Error,
    },
}

impl Error {
    /// Create a KeyNotFound error.
    pub fn key_not_found(key: impl Into<Key>) -> Self {
        Error::KeyNotFound { key: key.into() }
    }

    /// Create a TypeMismatch error.
    pub fn type_mismatch(reason: impl Into<String>) -> Self {
        Error::TypeMismatch {
            reason: reason.into(),
        }
    }

    /// Create a MalformedPath error.
    pub fn malformed_path(reason: impl Into<String>) -> Self {
        Error::MalformedPath {
            reason: reason.into(),
        }
    }

    /// Create an InvalidTypeFilter error.
    pub fn invalid_type_filter(name: impl Into<String>) -> Self {
        Error::InvalidTypeFilter { name: name.into() }
    }

    /// Create a NotSupported error.
    pub fn not_supported(reason: impl Into<String>) -> Self {
        Error::NotSupported {
            reason: reason.into(),
        }
    }

    /// Create a ValueNotAllowed error.
    pub fn value_not_allowed(reason: impl Into<String>) -> Self {
        Error::ValueNotAllowed {
            reason: reason.into(),
        }
    }

    /// Whether this error means "absent" and may be replaced by a default.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::KeyNotFound { .. })
    }

    /// The offending key of a KeyNotFound error.
    pub fn not_found_key(&self) -> Option<&Key> {
        match self {
            Error::KeyNotFound { key } => Some(key),
            _ => None,
        }
    }
}
