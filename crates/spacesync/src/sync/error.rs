use thiserror::Error;

use crate::config::ConfigError;

/// Failure reported by a remote API client.
#[derive(Error, Debug)]
pub enum RemoteError {
    #[error("Request failed: {0}")]
    Request(String),

    #[error("Unexpected response ({status}): {message}")]
    Response { status: u16, message: String },

    #[error("Version conflict on '{0}'")]
    Conflict(String),
}

/// Errors raised while reconciling a page tree with the remote space.
#[derive(Error, Debug)]
pub enum SyncError {
    #[error("Remote call {operation} failed for '{title}': {source}")]
    Remote {
        operation: &'static str,
        title: String,
        #[source]
        source: RemoteError,
    },

    #[error("Cannot resolve the parent page of '{path}'")]
    UnresolvedParent { path: String },

    #[error("Page '{path}' has not been rendered")]
    NotRendered { path: String },

    #[error(transparent)]
    Settings(#[from] ConfigError),
}

impl SyncError {
    pub fn remote(operation: &'static str, title: impl Into<String>, source: RemoteError) -> Self {
        SyncError::Remote {
            operation,
            title: title.into(),
            source,
        }
    }
}
