use std::path::PathBuf;

use thiserror::Error;

use crate::query::QueryError;

/// Errors raised while loading hooks or resolving hook chains.
#[derive(Error, Debug)]
pub enum HookError {
    #[error("Invalid hook '{origin}': document must be a mapping")]
    NotAMapping { origin: String },

    #[error("Failed to parse hook '{origin}': {message}")]
    Parse { origin: String, message: String },

    #[error("Invalid target pattern '{pattern}' in hook '{origin}': {reason}")]
    InvalidPattern {
        origin: String,
        pattern: String,
        reason: String,
    },

    #[error("Hook '{hook}' {fragment}: unsupported value kind '{kind}' for key '{key}'")]
    UnsupportedValue {
        hook: String,
        fragment: &'static str,
        key: String,
        kind: &'static str,
    },

    #[error("Failed to precompile jq expression in hook '{hook}' ({origin})\njq: {expression}\n{source}")]
    Precompile {
        hook: String,
        origin: String,
        expression: String,
        #[source]
        source: QueryError,
    },

    #[error("Invalid listFiles glob '{pattern}': {reason}")]
    Glob { pattern: String, reason: String },

    #[error("listFiles glob '{pattern}' could not read {path}: {reason}")]
    GlobEntry {
        pattern: String,
        path: PathBuf,
        reason: String,
    },
}

/// A failing expression inside a structural transform.
#[derive(Error, Debug)]
#[error("{expression}: {source}")]
pub struct TransformError {
    pub expression: String,
    #[source]
    pub source: QueryError,
}
