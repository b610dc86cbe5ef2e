pub mod assets;
pub mod config;
pub mod error;
pub mod hooks;
pub mod query;
pub mod render;
pub mod resources;
pub mod space;
pub mod sync;

pub use config::{DirectoryProperties, SyncSettings};
pub use error::{Result, SpacesyncError};
pub use hooks::{HookRegistry, HookSet, ListFilesCache, ProgramCache, MAX_CONVERGENCE_ITERATIONS};
pub use render::{Content, RenderStage, Renderer, TemplateRegistry};
pub use resources::{Resource, ResourceLoader};
pub use space::{render_file, render_space, sync_space};
pub use sync::{
    ChangeReporter, PageTree, Reconciler, RemoteApi, StdoutReporter, SyncReport,
    FINGERPRINT_PROPERTY_KEY, GENERATED_BY_LABEL,
};
