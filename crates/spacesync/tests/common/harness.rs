//! Isolated instance directory with the `config.yml`, `templates/`, `hooks/`
//! and `spaces/<KEY>/` layout.

#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};

use tempfile::TempDir;

pub struct SpaceHarness {
    temp_dir: TempDir,
    pub space_dir: PathBuf,
    pub hooks_dir: PathBuf,
    pub templates_dir: PathBuf,
}

impl SpaceHarness {
    pub const SPACE_KEY: &'static str = "DEMO";

    pub fn new() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let base = temp_dir.path();

        let space_dir = base.join("spaces").join(Self::SPACE_KEY);
        let hooks_dir = base.join("hooks");
        let templates_dir = base.join("templates");
        for dir in [&space_dir, &hooks_dir, &templates_dir] {
            fs::create_dir_all(dir).expect("Failed to create instance directory");
        }
        fs::write(base.join("config.yml"), "url: https://wiki.example.com\n")
            .expect("Failed to write config.yml");

        Self {
            temp_dir,
            space_dir,
            hooks_dir,
            templates_dir,
        }
    }

    pub fn base(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Writes a resource file relative to the space directory.
    pub fn resource(&self, relative: &str, content: &str) -> PathBuf {
        write(&self.space_dir.join(relative), content)
    }

    pub fn hook(&self, name: &str, content: &str) -> PathBuf {
        write(&self.hooks_dir.join(format!("{}.yml", name)), content)
    }

    pub fn template(&self, kind: &str, content: &str) -> PathBuf {
        write(&self.templates_dir.join(format!("{}.mst", kind)), content)
    }

    pub fn with_resource(self, relative: &str, content: &str) -> Self {
        self.resource(relative, content);
        self
    }

    pub fn with_hook(self, name: &str, content: &str) -> Self {
        self.hook(name, content);
        self
    }

    pub fn with_template(self, kind: &str, content: &str) -> Self {
        self.template(kind, content);
        self
    }
}

fn write(path: &Path, content: &str) -> PathBuf {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).expect("Failed to create parent directory");
    }
    fs::write(path, content).expect("Failed to write fixture");
    path.to_path_buf()
}
