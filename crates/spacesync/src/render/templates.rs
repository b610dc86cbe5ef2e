use std::collections::HashMap;

use super::error::RenderError;
use crate::assets::Asset;

/// Markup templates keyed by kind, compiled on first use.
#[derive(Default)]
pub struct TemplateRegistry {
    sources: HashMap<String, Asset>,
    compiled: HashMap<String, mustache::Template>,
}

impl TemplateRegistry {
    /// User templates replace built-ins of the same name.
    pub fn load(builtin: &[Asset], user: &[Asset]) -> Self {
        let mut registry = Self::default();
        for asset in builtin.iter().chain(user) {
            if let Some(previous) = registry.sources.insert(asset.name.clone(), asset.clone()) {
                log::debug!("Template {} overrides {}", asset.origin, previous.origin);
            }
        }
        log::info!("Loaded {} templates", registry.sources.len());
        registry
    }

    pub fn contains(&self, kind: &str) -> bool {
        self.sources.contains_key(kind)
    }

    pub fn len(&self) -> usize {
        self.sources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }

    /// Returns the compiled template for `kind`. `path` names the resource
    /// being rendered for error reporting.
    pub fn get(&mut self, kind: &str, path: &str) -> Result<&mustache::Template, RenderError> {
        if !self.compiled.contains_key(kind) {
            let asset = self
                .sources
                .get(kind)
                .ok_or_else(|| RenderError::MissingTemplate {
                    kind: kind.to_string(),
                    path: path.to_string(),
                })?;
            let template =
                mustache::compile_str(&asset.content).map_err(|e| RenderError::TemplateCompile {
                    kind: kind.to_string(),
                    origin: asset.origin.to_string(),
                    message: e.to_string(),
                })?;
            self.compiled.insert(kind.to_string(), template);
        }

        self.compiled
            .get(kind)
            .ok_or_else(|| RenderError::MissingTemplate {
                kind: kind.to_string(),
                path: path.to_string(),
            })
    }

    /// Renders the template for `kind` with `view` as data.
    pub fn render(
        &mut self,
        kind: &str,
        path: &str,
        view: &serde_json::Value,
    ) -> Result<String, RenderError> {
        let template = self.get(kind, path)?;
        let failure = |message: String| RenderError::Template {
            kind: kind.to_string(),
            path: path.to_string(),
            message,
        };

        let mut out = Vec::new();
        template
            .render(&mut out, view)
            .map_err(|e| failure(e.to_string()))?;
        String::from_utf8(out).map_err(|e| failure(e.to_string()))
    }
}
