//! Error types for translation loading

use crate::node::KeyPath;
use std::path::PathBuf;
use thiserror::Error;

/// Result type for translation operations
pub type TranslationResult<T> = Result<T, TranslationError>;

/// Errors that can occur while loading a translation table
#[derive(Debug, Error)]
pub enum TranslationError {
    /// Failed to read a translation file
    #[error("failed to read translations from {}: {source}", path.display())]
    ReadFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Failed to write a translation file
    #[error("failed to write translations to {}: {source}", path.display())]
    WriteFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Directory holding `strings.json` does not exist
    #[error("translations directory not found: {}", path.display())]
    DirectoryNotFound { path: PathBuf },

    /// Malformed JSON
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Well-formed JSON with the wrong shape
    #[error("schema error: {0}")]
    Schema(#[from] SchemaError),
}

/// Structural violations of the translation table shape
///
/// Every variant except [`SchemaError::UnknownNamespace`] carries the key
/// path of the offending entry.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SchemaError {
    #[error("{path}: expected a string, found {found}")]
    ExpectedText { path: KeyPath, found: &'static str },

    #[error("{path}: expected a mapping, found {found}")]
    ExpectedMapping { path: KeyPath, found: &'static str },

    #[error("{path}: expected a string or mapping, found {found}")]
    UnexpectedValue { path: KeyPath, found: &'static str },

    #[error("{path}: display string is empty")]
    EmptyText { path: KeyPath },

    #[error("{path}: duplicate key '{key}'")]
    DuplicateKey { path: KeyPath, key: String },

    #[error("unknown top-level namespace '{key}'")]
    UnknownNamespace { key: String },

    #[error("{path}: unknown field '{field}'")]
    UnknownField { path: KeyPath, field: String },

    #[error("{path}: unknown entity platform '{platform}'")]
    UnknownPlatform { path: KeyPath, platform: String },

    #[error("{path}: missing required field '{field}'")]
    MissingField { path: KeyPath, field: &'static str },

    #[error(
        "{path}: state token '{token}' is not a lowercase identifier (lowercase alphanumeric with underscores, cannot start/end with underscore)"
    )]
    InvalidStateToken { path: KeyPath, token: String },

    #[error("{path}: state tokens '{first}' and '{second}' both normalize to '{normalized}'")]
    StateTokenCollision {
        path: KeyPath,
        first: String,
        second: String,
        normalized: String,
    },
}
