use thiserror::Error;

pub use crate::assets::AssetError;
pub use crate::config::ConfigError;
pub use crate::hooks::HookError;
pub use crate::query::QueryError;
pub use crate::render::RenderError;
pub use crate::resources::ResourceError;
pub use crate::sync::{RemoteError, SyncError};

#[derive(Error, Debug)]
pub enum SpacesyncError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Asset error: {0}")]
    Asset(#[from] AssetError),

    #[error("Hook error: {0}")]
    Hook(#[from] HookError),

    #[error("Resource error: {0}")]
    Resource(#[from] ResourceError),

    #[error("Render error: {0}")]
    Render(#[from] RenderError),

    #[error("Sync error: {0}")]
    Sync(#[from] SyncError),
}

pub type Result<T> = std::result::Result<T, SpacesyncError>;
