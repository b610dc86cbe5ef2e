use std::collections::HashMap;

use super::config::Hook;
use super::error::HookError;
use super::listing::ListFiles;
use super::transform::{ProgramCache, ProjectionCommand, StructuralTransform};
use crate::assets::Asset;
use crate::query::ProjectionQuery;

/// The resolved, executable hook chain for one kind.
#[derive(Debug, Clone, Default)]
pub struct HookSet {
    pub structural: Vec<StructuralTransform>,
    pub projection: Vec<ProjectionCommand>,
    pub list_files: ListFiles,
    pub header: String,
    pub footer: String,
}

/// All hooks of a run, split into kind-exact and pattern hooks.
#[derive(Debug, Default)]
pub struct HookRegistry {
    kind_hooks: HashMap<String, Hook>,
    pattern_hooks: Vec<Hook>,
}

impl HookRegistry {
    /// Decodes built-in assets first, then user assets. A later kind hook
    /// replaces an earlier kind hook of the same name. Pattern hooks are all
    /// kept, whatever their names.
    pub fn load(builtin: &[Asset], user: &[Asset]) -> Result<Self, HookError> {
        let mut registry = Self::default();
        for asset in builtin.iter().chain(user) {
            registry.insert(Hook::from_asset(asset)?);
        }

        log::info!(
            "Loaded {} kind hooks and {} pattern hooks",
            registry.kind_hooks.len(),
            registry.pattern_hooks.len()
        );
        Ok(registry)
    }

    pub fn insert(&mut self, hook: Hook) {
        if hook.config.is_pattern() {
            self.pattern_hooks.push(hook);
            return;
        }

        let origin = hook.origin.clone();
        if let Some(previous) = self.kind_hooks.insert(hook.name.clone(), hook) {
            log::debug!("Hook {} overrides {}", origin, previous.origin);
        }
    }

    /// The kind hook named `name`, else the first pattern hook of that name.
    pub fn get(&self, name: &str) -> Option<&Hook> {
        self.kind_hooks
            .get(name)
            .or_else(|| self.pattern_hooks.iter().find(|h| h.name == name))
    }

    /// Pattern hooks in discovery order, followed by kind-exact hooks.
    pub fn all(&self) -> Vec<&Hook> {
        let mut hooks: Vec<&Hook> = self.pattern_hooks.iter().collect();
        let mut kind_hooks: Vec<&Hook> = self.kind_hooks.values().collect();
        kind_hooks.sort_by(|a, b| a.name.cmp(&b.name));
        hooks.extend(kind_hooks);
        hooks
    }

    /// Hooks applicable to `kind`, in ascending priority. Equal priorities
    /// keep discovery order, with the kind-exact hook first.
    pub fn hooks_for(&self, kind: &str) -> Vec<&Hook> {
        let mut hooks: Vec<&Hook> = Vec::new();

        if let Some(kind_hook) = self.kind_hooks.get(kind) {
            hooks.push(kind_hook);
        }
        hooks.extend(self.pattern_hooks.iter().filter(|h| h.matches(kind)));

        hooks.sort_by_key(|h| h.config.priority);
        hooks
    }

    /// Builds the executable chain for `kind`.
    ///
    /// With `precompile`, every projection expression is compiled through
    /// `programs` so hooks shared between kinds compile once per run.
    pub fn hook_set(
        &self,
        kind: &str,
        programs: &mut ProgramCache,
        engine: &dyn ProjectionQuery,
        precompile: bool,
    ) -> Result<HookSet, HookError> {
        let mut set = HookSet::default();
        let mut headers: Vec<&str> = Vec::new();
        let mut footers: Vec<&str> = Vec::new();

        for hook in self.hooks_for(kind) {
            let config = &hook.config;

            if config.list_files.is_valid() {
                set.list_files = config.list_files.clone();
            }

            for expression in &config.jq {
                let mut command = ProjectionCommand::new(hook, expression.as_str());
                if precompile {
                    let program = programs
                        .get_or_compile(&hook.name, expression, engine)
                        .map_err(|source| HookError::Precompile {
                            hook: hook.name.clone(),
                            origin: hook.origin.clone(),
                            expression: expression.clone(),
                            source,
                        })?;
                    command = command.with_program(program);
                }
                set.projection.push(command);
            }

            set.structural.push(StructuralTransform::compile(hook)?);

            if !config.header.is_empty() {
                headers.push(&config.header);
            }
            if !config.footer.is_empty() {
                footers.push(&config.footer);
            }
        }

        set.header = headers.join("\n");
        set.footer = footers.join("\n");

        log::debug!(
            "Hook set for {}: {} structural, {} projection",
            kind,
            set.structural.len(),
            set.projection.len()
        );
        Ok(set)
    }
}
