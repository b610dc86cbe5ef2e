use std::path::{Component, Path, PathBuf};

use super::error::ConfigError;

/// Name of the directory holding one sub-directory per space.
pub const SPACES_DIR: &str = "spaces";

/// Resolved layout of an instance directory:
///
/// ```text
/// <base>/config.yml
/// <base>/templates/
/// <base>/hooks/
/// <base>/spaces/<SPACE_KEY>/...
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectoryProperties {
    pub config_path: PathBuf,
    pub space_dir: PathBuf,
    pub templates_dir: PathBuf,
    pub hooks_dir: PathBuf,
    pub space_key: String,
}

impl DirectoryProperties {
    /// Resolves the layout from any path inside a space directory and checks
    /// that the required parts exist.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let props = Self::resolve(path.as_ref())?;
        props.verify()?;
        Ok(props)
    }

    /// Resolves the layout without touching the filesystem beyond the
    /// working directory lookup for relative paths.
    pub fn resolve(path: &Path) -> Result<Self, ConfigError> {
        let absolute = absolute_path(path)?;

        let components: Vec<Component<'_>> = absolute.components().collect();
        let spaces_idx = components
            .iter()
            .position(|c| c.as_os_str() == SPACES_DIR)
            .ok_or_else(|| ConfigError::NotInSpace(absolute.clone()))?;
        let space_key = components
            .get(spaces_idx + 1)
            .and_then(|c| match c {
                Component::Normal(name) => name.to_str(),
                _ => None,
            })
            .ok_or_else(|| ConfigError::NotInSpace(absolute.clone()))?
            .to_string();

        let base_dir: PathBuf = components[..spaces_idx].iter().collect();

        Ok(Self {
            config_path: base_dir.join("config.yml"),
            space_dir: base_dir.join(SPACES_DIR).join(&space_key),
            templates_dir: base_dir.join("templates"),
            hooks_dir: base_dir.join("hooks"),
            space_key,
        })
    }

    fn verify(&self) -> Result<(), ConfigError> {
        if !self.config_path.is_file() {
            return Err(ConfigError::MissingConfigFile(self.config_path.clone()));
        }
        if !self.space_dir.is_dir() {
            return Err(ConfigError::MissingSpaceDir {
                key: self.space_key.clone(),
                path: self.space_dir.clone(),
            });
        }
        if !self.templates_dir.is_dir() {
            return Err(ConfigError::MissingTemplatesDir(self.templates_dir.clone()));
        }
        if !self.hooks_dir.is_dir() {
            log::debug!(
                "No hooks directory at {}, only built-in hooks will be used",
                self.hooks_dir.display()
            );
        }
        Ok(())
    }
}

/// Joins relative paths onto the working directory.
pub fn absolute_path(path: &Path) -> Result<PathBuf, ConfigError> {
    if path.is_absolute() {
        return Ok(path.to_path_buf());
    }
    let current = std::env::current_dir().map_err(|e| ConfigError::ResolvePath {
        path: path.to_path_buf(),
        source: e,
    })?;
    Ok(current.join(path))
}
