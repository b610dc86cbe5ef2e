use thiserror::Error;

use crate::assets::AssetError;
use crate::hooks::HookError;
use crate::query::QueryError;
use crate::resources::ResourceError;

/// Errors raised while rendering a resource.
#[derive(Error, Debug)]
pub enum RenderError {
    #[error("No template exists for kind '{kind}' (resource {path})")]
    MissingTemplate { kind: String, path: String },

    #[error("Failed to compile template '{kind}' ({origin}): {message}")]
    TemplateCompile {
        kind: String,
        origin: String,
        message: String,
    },

    #[error("Failed to render template '{kind}' for {path}: {message}")]
    Template {
        kind: String,
        path: String,
        message: String,
    },

    #[error("Failed to transform {path} with hook '{hook}'\nexpression: {expression}\n{source}")]
    Expression {
        path: String,
        hook: String,
        expression: String,
        #[source]
        source: QueryError,
    },

    #[error("Failed to serialize {path}: {message}")]
    Output { path: String, message: String },

    #[error(transparent)]
    Hook(#[from] HookError),

    #[error(transparent)]
    Resource(#[from] ResourceError),

    #[error(transparent)]
    Asset(#[from] AssetError),
}
