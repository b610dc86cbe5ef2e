pub mod error;
pub mod paths;
pub mod settings;

pub use error::ConfigError;
pub use paths::{absolute_path, DirectoryProperties};
pub use settings::{SyncSettings, DEFAULT_PRIMARY_CONCURRENCY, DEFAULT_SECONDARY_CONCURRENCY};
