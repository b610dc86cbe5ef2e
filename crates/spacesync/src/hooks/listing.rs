//! Memoized `listFiles` directives.
//!
//! A directive names an environment variable and a glob. The matching paths
//! are listed once per run and exported into the run environment, which is
//! handed to every expression evaluation.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use super::error::HookError;
use crate::query::Environment;

/// Export the files matching `glob` under the variable `env_var`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListFiles {
    #[serde(default)]
    pub env_var: String,
    #[serde(default)]
    pub glob: String,
}

impl ListFiles {
    pub fn new(env_var: impl Into<String>, glob: impl Into<String>) -> Self {
        Self {
            env_var: env_var.into(),
            glob: glob.into(),
        }
    }

    pub fn is_valid(&self) -> bool {
        !self.env_var.is_empty() && !self.glob.is_empty()
    }
}

/// Run-owned memo of directive results plus the environment they feed.
#[derive(Debug)]
pub struct ListFilesCache {
    base_dir: PathBuf,
    store: HashMap<ListFiles, String>,
    environment: Environment,
    evaluations: usize,
}

impl ListFilesCache {
    /// Globs are resolved relative to `base_dir` (the space directory).
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
            store: HashMap::new(),
            environment: Environment::new(),
            evaluations: 0,
        }
    }

    pub fn run(&mut self, directive: &ListFiles) -> Result<(), HookError> {
        if !directive.is_valid() {
            return Ok(());
        }

        let listing = match self.store.get(directive) {
            Some(cached) => cached.clone(),
            None => {
                let listing = glob_listing(&self.base_dir, &directive.glob)?;
                self.evaluations += 1;
                log::debug!(
                    "listFiles {}={} matched {} entries",
                    directive.env_var,
                    directive.glob,
                    listing.lines().count()
                );
                self.store.insert(directive.clone(), listing.clone());
                listing
            }
        };

        self.environment.insert(directive.env_var.clone(), listing);
        Ok(())
    }

    pub fn get(&self, directive: &ListFiles) -> Option<&str> {
        self.store.get(directive).map(String::as_str)
    }

    /// The environment exported by every directive run so far.
    pub fn environment(&self) -> &Environment {
        &self.environment
    }

    /// Number of filesystem glob walks performed.
    pub fn evaluations(&self) -> usize {
        self.evaluations
    }
}

/// Lists matches of `pattern` under `base_dir` as YAML sequence lines
/// (` - relative/path`).
fn glob_listing(base_dir: &Path, pattern: &str) -> Result<String, HookError> {
    let full_pattern = base_dir.join(pattern);
    let full_pattern = full_pattern.to_string_lossy();

    let paths = glob::glob(&full_pattern).map_err(|e| HookError::Glob {
        pattern: pattern.to_string(),
        reason: e.to_string(),
    })?;

    let mut lines = Vec::new();
    for entry in paths {
        let path = entry.map_err(|e| HookError::GlobEntry {
            pattern: pattern.to_string(),
            path: e.path().to_path_buf(),
            reason: e.error().to_string(),
        })?;
        let relative = path.strip_prefix(base_dir).unwrap_or(&path);
        lines.push(format!(" - {}", relative.display()));
    }

    Ok(lines.join("\n"))
}
