use serde::{Deserialize, Serialize};

use super::error::ConfigError;

/// Default number of concurrent page upsert/delete calls within one batch.
pub const DEFAULT_PRIMARY_CONCURRENCY: usize = 10;

/// Default number of concurrent secondary calls (fingerprint property, labels)
/// issued for a single page.
pub const DEFAULT_SECONDARY_CONCURRENCY: usize = 2;

/// Run-level settings for rendering and reconciliation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncSettings {
    /// Precompile projection expressions once per hook.
    #[serde(default = "default_true")]
    pub precompile: bool,

    /// Bound for page upsert/delete calls within one batch.
    #[serde(default = "default_primary_concurrency")]
    pub primary_concurrency: usize,

    /// Bound for the secondary calls of one page.
    #[serde(default = "default_secondary_concurrency")]
    pub secondary_concurrency: usize,

    /// Remote page id under which the content tree is rooted. Defaults to the
    /// space root.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub anchor: Option<String>,
}

fn default_true() -> bool {
    true
}

fn default_primary_concurrency() -> usize {
    DEFAULT_PRIMARY_CONCURRENCY
}

fn default_secondary_concurrency() -> usize {
    DEFAULT_SECONDARY_CONCURRENCY
}

impl Default for SyncSettings {
    fn default() -> Self {
        Self {
            precompile: true,
            primary_concurrency: DEFAULT_PRIMARY_CONCURRENCY,
            secondary_concurrency: DEFAULT_SECONDARY_CONCURRENCY,
            anchor: None,
        }
    }
}

impl SyncSettings {
    /// Settings for rendering a single resource: nothing is reused, so
    /// precompiling would only add work.
    pub fn single_render() -> Self {
        Self {
            precompile: false,
            ..Self::default()
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.primary_concurrency == 0 {
            return Err(ConfigError::Validation {
                message: "primaryConcurrency must be greater than 0".to_string(),
            });
        }
        if self.secondary_concurrency == 0 {
            return Err(ConfigError::Validation {
                message: "secondaryConcurrency must be greater than 0".to_string(),
            });
        }
        Ok(())
    }
}
