use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while resolving the instance layout or validating settings.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Path '{0}' is not inside a 'spaces/<SPACE_KEY>' directory")]
    NotInSpace(PathBuf),

    #[error("Could not resolve path '{path}': {source}")]
    ResolvePath {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Could not find config.yml at '{0}'")]
    MissingConfigFile(PathBuf),

    #[error("Could not find '{key}' space directory at '{path}'")]
    MissingSpaceDir { key: String, path: PathBuf },

    #[error("Could not find templates directory at '{0}'")]
    MissingTemplatesDir(PathBuf),

    #[error("Invalid settings: {message}")]
    Validation { message: String },
}
