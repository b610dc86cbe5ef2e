//! Hook-driven transforms.
//!
//! Hooks are YAML documents that rewrite a resource before it is rendered:
//! - `defaults` / `overrides` / `merges` fragments, applied as typed patches
//! - `yq` expressions over the YAML tree, optionally looped under `yqWhile`
//! - `jq` expressions over the JSON projection
//! - `header` / `footer` text and a `listFiles` directive
//!
//! A hook named after a kind applies to that kind. A hook with a `target`
//! applies to every kind the target regex matches.

pub mod config;
pub mod error;
pub mod listing;
pub mod patch;
pub mod registry;
pub mod transform;

pub use config::{Hook, HookConfig};
pub use error::{HookError, TransformError};
pub use listing::{ListFiles, ListFilesCache};
pub use patch::{MergeKind, PatchOp};
pub use registry::{HookRegistry, HookSet};
pub use transform::{
    ProgramCache, ProjectionCommand, StructuralTransform, MAX_CONVERGENCE_ITERATIONS,
};
