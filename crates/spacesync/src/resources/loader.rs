//! Discovery of the resources in a space directory.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde_yaml::{Mapping, Value};
use walkdir::WalkDir;

use super::error::ResourceError;
use super::resource::Resource;

/// Kind given to directories without an index file.
pub const DIRECTORY_KIND: &str = "wiki";

const INDEX_FILES: &[&str] = &["index.yml", "index.yaml"];
const RESOURCE_EXTENSIONS: &[&str] = &["yml", "yaml"];

/// Loads resources from a space directory.
pub struct ResourceLoader {
    space_dir: PathBuf,
}

impl ResourceLoader {
    pub fn new(space_dir: impl Into<PathBuf>) -> Self {
        Self {
            space_dir: space_dir.into(),
        }
    }

    pub fn space_dir(&self) -> &Path {
        &self.space_dir
    }

    /// Loads every resource in the space, parents before children and
    /// siblings sorted by file name.
    pub fn load(&self) -> Result<Vec<Resource>, ResourceError> {
        if !self.space_dir.is_dir() {
            return Err(ResourceError::SpaceDirNotFound(self.space_dir.clone()));
        }

        let mut resources = Vec::new();
        let walker = WalkDir::new(&self.space_dir)
            .follow_links(true)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|e| e.depth() == 0 || !is_hidden(e.file_name()));

        for entry in walker {
            let entry = entry.map_err(|e| ResourceError::ReadDirectory {
                path: self.space_dir.clone(),
                source: e,
            })?;
            if entry.depth() == 0 {
                continue;
            }

            let path = entry.path();
            if entry.file_type().is_dir() {
                resources.push(self.load_directory(path)?);
            } else if is_resource_file(path) && !is_index_file(path) {
                resources.push(self.load_document(path)?);
            }
        }

        log::info!(
            "Loaded {} resources from {}",
            resources.len(),
            self.space_dir.display()
        );
        Ok(resources)
    }

    /// Loads the single resource a file stands for. An index file resolves to
    /// its directory's resource.
    pub fn load_file(&self, path: &Path) -> Result<Resource, ResourceError> {
        if path.is_dir() {
            return self.load_directory(path);
        }
        if is_index_file(path) {
            let dir = path
                .parent()
                .ok_or_else(|| ResourceError::OutsideSpace(path.to_path_buf()))?;
            return self.load_directory(dir);
        }
        self.load_document(path)
    }

    fn load_document(&self, path: &Path) -> Result<Resource, ResourceError> {
        let resource_path = self.resource_path(path)?;
        let content = read(path)?;
        Resource::from_yaml(resource_path, &content)
    }

    fn load_directory(&self, dir: &Path) -> Result<Resource, ResourceError> {
        let resource_path = self.resource_path(dir)?;

        for index in INDEX_FILES {
            let index_path = dir.join(index);
            if index_path.is_file() {
                let content = read(&index_path)?;
                return Resource::from_yaml(resource_path, &content);
            }
        }

        let title = dir
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or_default()
            .to_string();
        let mut data = Mapping::new();
        data.insert("kind".into(), DIRECTORY_KIND.into());
        data.insert("title".into(), title.into());
        Resource::new(resource_path, Value::Mapping(data))
    }

    /// `/`-separated path relative to the space directory, with a leading `/`.
    fn resource_path(&self, path: &Path) -> Result<String, ResourceError> {
        let relative = path
            .strip_prefix(&self.space_dir)
            .map_err(|_| ResourceError::OutsideSpace(path.to_path_buf()))?;

        let segments: Vec<String> = relative
            .components()
            .map(|c| c.as_os_str().to_string_lossy().into_owned())
            .collect();
        if segments.is_empty() {
            return Err(ResourceError::OutsideSpace(path.to_path_buf()));
        }
        Ok(format!("/{}", segments.join("/")))
    }
}

/// Fails on the first pair of resources whose titles are equal ignoring
/// case.
pub fn ensure_unique_titles(resources: &[Resource]) -> Result<(), ResourceError> {
    let mut seen: HashMap<String, &Resource> = HashMap::with_capacity(resources.len());

    for resource in resources {
        let key = resource.title.to_lowercase();
        if let Some(first) = seen.get(&key) {
            return Err(ResourceError::DuplicateTitle {
                first_title: first.title.clone(),
                first_path: first.path.clone(),
                second_title: resource.title.clone(),
                second_path: resource.path.clone(),
            });
        }
        seen.insert(key, resource);
    }

    Ok(())
}

fn read(path: &Path) -> Result<String, ResourceError> {
    fs::read_to_string(path).map_err(|e| ResourceError::ReadFile {
        path: path.to_path_buf(),
        source: e,
    })
}

fn is_hidden(name: &std::ffi::OsStr) -> bool {
    name.to_str().map(|s| s.starts_with('.')).unwrap_or(false)
}

fn is_resource_file(path: &Path) -> bool {
    let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");
    RESOURCE_EXTENSIONS.contains(&ext)
}

fn is_index_file(path: &Path) -> bool {
    path.file_name()
        .and_then(|n| n.to_str())
        .map(|n| INDEX_FILES.contains(&n))
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn setup_space() -> TempDir {
        let dir = TempDir::new().unwrap();
        let root = dir.path();
        fs::create_dir_all(root.join("apps/nested")).unwrap();
        fs::create_dir_all(root.join(".drafts")).unwrap();
        fs::write(root.join("apps/index.yml"), "kind: wiki\ntitle: Applications\n").unwrap();
        fs::write(root.join("apps/app1.yml"), "kind: app\ntitle: App 1\n").unwrap();
        fs::write(root.join("apps/nested/app2.yml"), "kind: app\ntitle: App 2\n").unwrap();
        fs::write(root.join("freeform.yml"), "kind: page\ntitle: Freeform\n").unwrap();
        fs::write(root.join("notes.txt"), "not a resource").unwrap();
        fs::write(root.join(".drafts/draft.yml"), "kind: page\ntitle: Draft\n").unwrap();
        dir
    }

    #[test]
    fn test_load_parents_before_children() {
        let dir = setup_space();
        let resources = ResourceLoader::new(dir.path()).load().unwrap();
        let paths: Vec<&str> = resources.iter().map(|r| r.path.as_str()).collect();

        assert_eq!(
            paths,
            vec![
                "/apps",
                "/apps/app1.yml",
                "/apps/nested",
                "/apps/nested/app2.yml",
                "/freeform.yml",
            ]
        );
    }

    #[test]
    fn test_directory_with_and_without_index() {
        let dir = setup_space();
        let resources = ResourceLoader::new(dir.path()).load().unwrap();

        assert_eq!(resources[0].title, "Applications");
        assert_eq!(resources[2].kind, DIRECTORY_KIND);
        assert_eq!(resources[2].title, "nested");
    }

    #[test]
    fn test_load_file_resolves_index_to_directory() {
        let dir = setup_space();
        let loader = ResourceLoader::new(dir.path());

        let index = loader.load_file(&dir.path().join("apps/index.yml")).unwrap();
        assert_eq!(index.path, "/apps");
        assert_eq!(index.title, "Applications");

        let app = loader.load_file(&dir.path().join("apps/app1.yml")).unwrap();
        assert_eq!(app.path, "/apps/app1.yml");
    }

    #[test]
    fn test_load_file_outside_space() {
        let dir = setup_space();
        let other = TempDir::new().unwrap();
        fs::write(other.path().join("x.yml"), "kind: page\ntitle: X\n").unwrap();

        let result = ResourceLoader::new(dir.path()).load_file(&other.path().join("x.yml"));
        assert!(matches!(result, Err(ResourceError::OutsideSpace(_))));
    }

    #[test]
    fn test_load_missing_space() {
        let result = ResourceLoader::new("/nonexistent/spaces/KEY").load();
        assert!(matches!(result, Err(ResourceError::SpaceDirNotFound(_))));
    }

    #[test]
    fn test_invalid_yaml_names_path() {
        let dir = setup_space();
        fs::write(dir.path().join("broken.yml"), "kind: [unclosed\n").unwrap();

        match ResourceLoader::new(dir.path()).load() {
            Err(ResourceError::ParseYaml { path, .. }) => assert_eq!(path, "/broken.yml"),
            other => panic!("expected ParseYaml, got {:?}", other),
        }
    }

    #[test]
    fn test_titles_unique_ignoring_case() {
        let dir = setup_space();
        let mut resources = ResourceLoader::new(dir.path()).load().unwrap();
        assert!(ensure_unique_titles(&resources).is_ok());

        resources.push(Resource::from_yaml("/copy.yml", "kind: page\ntitle: FREEFORM\n").unwrap());
        match ensure_unique_titles(&resources) {
            Err(ResourceError::DuplicateTitle {
                first_title,
                first_path,
                second_title,
                second_path,
            }) => {
                assert_eq!(first_title, "Freeform");
                assert_eq!(first_path, "/freeform.yml");
                assert_eq!(second_title, "FREEFORM");
                assert_eq!(second_path, "/copy.yml");
            }
            other => panic!("expected DuplicateTitle, got {:?}", other),
        }
    }
}
