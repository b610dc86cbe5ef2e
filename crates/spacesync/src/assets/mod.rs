//! Named hook and template sources.
//!
//! Assets come from two places: the built-ins compiled into the binary and
//! the user directories (`hooks/`, `templates/`) of an instance. User assets
//! are discovered recursively by extension and are named after their file
//! stem.

use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;
use walkdir::WalkDir;

/// Extensions recognised as hook sources.
pub const HOOK_EXTENSIONS: &[&str] = &["yml", "yaml"];

/// Extensions recognised as template sources.
pub const TEMPLATE_EXTENSIONS: &[&str] = &["mst", "mustache"];

const BUILTIN_HOOKS: &[(&str, &str)] = &[("wiki.yml", include_str!("../../assets/hooks/wiki.yml"))];

const BUILTIN_TEMPLATES: &[(&str, &str)] =
    &[("wiki.mst", include_str!("../../assets/templates/wiki.mst"))];

#[derive(Error, Debug)]
pub enum AssetError {
    #[error("Failed to read asset directory '{path}': {source}")]
    ReadDirectory {
        path: PathBuf,
        #[source]
        source: walkdir::Error,
    },

    #[error("Failed to read asset '{path}': {source}")]
    ReadFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Where an asset was loaded from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AssetOrigin {
    Builtin(&'static str),
    File(PathBuf),
}

impl std::fmt::Display for AssetOrigin {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AssetOrigin::Builtin(file) => write!(f, "builtin:{}", file),
            AssetOrigin::File(path) => write!(f, "{}", path.display()),
        }
    }
}

/// A named source document (hook or template).
#[derive(Debug, Clone)]
pub struct Asset {
    pub name: String,
    pub origin: AssetOrigin,
    pub content: String,
}

impl Asset {
    pub fn new(name: impl Into<String>, origin: AssetOrigin, content: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            origin,
            content: content.into(),
        }
    }

    /// Creates an in-memory asset, mostly useful for embedding and tests.
    pub fn inline(name: impl Into<String>, content: impl Into<String>) -> Self {
        let name = name.into();
        let origin = AssetOrigin::File(PathBuf::from(format!("<inline:{}>", name)));
        Self::new(name, origin, content)
    }
}

pub fn builtin_hooks() -> Vec<Asset> {
    builtin(BUILTIN_HOOKS)
}

pub fn builtin_templates() -> Vec<Asset> {
    builtin(BUILTIN_TEMPLATES)
}

fn builtin(entries: &[(&'static str, &'static str)]) -> Vec<Asset> {
    entries
        .iter()
        .map(|&(file, content)| {
            Asset::new(file_stem(Path::new(file)), AssetOrigin::Builtin(file), content)
        })
        .collect()
}

/// Loads every file under `dir` whose extension is one of `extensions`.
///
/// A missing directory yields no assets. Hidden files and directories are
/// skipped. Results are sorted by path.
pub fn load_dir(dir: &Path, extensions: &[&str]) -> Result<Vec<Asset>, AssetError> {
    if !dir.is_dir() {
        return Ok(Vec::new());
    }

    let mut assets = Vec::new();
    let walker = WalkDir::new(dir)
        .follow_links(true)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|e| e.depth() == 0 || !is_hidden(e.file_name()));

    for entry in walker {
        let entry = entry.map_err(|e| AssetError::ReadDirectory {
            path: dir.to_path_buf(),
            source: e,
        })?;
        let path = entry.path();
        if !entry.file_type().is_file() {
            continue;
        }

        let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");
        if !extensions.contains(&ext) {
            continue;
        }

        let content = fs::read_to_string(path).map_err(|e| AssetError::ReadFile {
            path: path.to_path_buf(),
            source: e,
        })?;
        assets.push(Asset::new(
            file_stem(path),
            AssetOrigin::File(path.to_path_buf()),
            content,
        ));
    }

    log::debug!("Loaded {} assets from {}", assets.len(), dir.display());
    Ok(assets)
}

fn is_hidden(name: &std::ffi::OsStr) -> bool {
    name.to_str().map(|s| s.starts_with('.')).unwrap_or(false)
}

fn file_stem(path: &Path) -> String {
    path.file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or_default()
        .to_string()
}
