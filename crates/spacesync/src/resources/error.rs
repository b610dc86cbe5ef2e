use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while loading or validating local resources.
#[derive(Error, Debug)]
pub enum ResourceError {
    #[error("Space directory not found: {0}")]
    SpaceDirNotFound(PathBuf),

    #[error("Failed to read space directory '{path}': {source}")]
    ReadDirectory {
        path: PathBuf,
        #[source]
        source: walkdir::Error,
    },

    #[error("Failed to read file '{path}': {source}")]
    ReadFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse YAML in '{path}': {message}")]
    ParseYaml { path: String, message: String },

    #[error("Resource '{path}' is missing the string field '{field}'")]
    MissingField { path: String, field: &'static str },

    #[error("Resource '{path}' cannot be projected to JSON: {message}")]
    Projection { path: String, message: String },

    #[error("File '{0}' is not inside the space directory")]
    OutsideSpace(PathBuf),

    #[error("Duplicate title: '{first_title}' ({first_path}) and '{second_title}' ({second_path})")]
    DuplicateTitle {
        first_title: String,
        first_path: String,
        second_title: String,
        second_path: String,
    },
}
