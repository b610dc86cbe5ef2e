//! Local content units and their discovery in a space directory.

pub mod error;
pub mod loader;
pub mod resource;

pub use error::ResourceError;
pub use loader::{ensure_unique_titles, ResourceLoader, DIRECTORY_KIND};
pub use resource::Resource;
