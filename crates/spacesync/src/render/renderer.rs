//! The three-stage render pipeline: structural transforms, projection
//! transforms, then markup.

use std::collections::HashMap;
use std::path::PathBuf;
use std::rc::Rc;

use serde_yaml::Value;
use tracing::info_span;

use super::content::Content;
use super::error::RenderError;
use super::templates::TemplateRegistry;
use crate::assets::{self, HOOK_EXTENSIONS, TEMPLATE_EXTENSIONS};
use crate::config::DirectoryProperties;
use crate::hooks::{HookRegistry, HookSet, ListFilesCache, ProgramCache};
use crate::query::JaqEngine;
use crate::resources::Resource;
use crate::sync::{Page, PageTree};

/// Pipeline stages in execution order. Rendering to a stage runs every
/// stage up to and including it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum RenderStage {
    Structural,
    Projection,
    Markup,
}

/// Renders resources with the hooks and templates of one run.
///
/// Owns the run-scoped caches: listings, precompiled programs and the hook
/// set resolved for each kind.
pub struct Renderer {
    hooks: HookRegistry,
    templates: TemplateRegistry,
    engine: JaqEngine,
    listings: ListFilesCache,
    programs: ProgramCache,
    hook_sets: HashMap<String, Rc<HookSet>>,
    precompile: bool,
}

impl Renderer {
    pub fn new(
        hooks: HookRegistry,
        templates: TemplateRegistry,
        space_dir: impl Into<PathBuf>,
        precompile: bool,
    ) -> Self {
        Self {
            hooks,
            templates,
            engine: JaqEngine::new(),
            listings: ListFilesCache::new(space_dir),
            programs: ProgramCache::new(),
            hook_sets: HashMap::new(),
            precompile,
        }
    }

    /// Loads built-in and user assets for the instance at `props`.
    pub fn from_directory(props: &DirectoryProperties, precompile: bool) -> Result<Self, RenderError> {
        let user_hooks = assets::load_dir(&props.hooks_dir, HOOK_EXTENSIONS)?;
        let user_templates = assets::load_dir(&props.templates_dir, TEMPLATE_EXTENSIONS)?;

        let hooks = HookRegistry::load(&assets::builtin_hooks(), &user_hooks)?;
        let templates = TemplateRegistry::load(&assets::builtin_templates(), &user_templates);

        Ok(Self::new(hooks, templates, &props.space_dir, precompile))
    }

    /// Renders `page` up to `stage`. Content is only produced by the markup
    /// stage; earlier stages leave it unset.
    pub fn render_to(&mut self, stage: RenderStage, page: &mut Page) -> Result<(), RenderError> {
        page.content = self.render_resource(stage, &mut page.resource)?;
        Ok(())
    }

    /// Renders every page of the tree in order.
    pub fn render_all(&mut self, tree: &mut PageTree) -> Result<(), RenderError> {
        let _span = info_span!("render_all", pages = tree.len()).entered();
        for page in tree.pages_mut() {
            self.render_to(RenderStage::Markup, page)?;
        }
        log::info!("Rendered {} pages", tree.len());
        Ok(())
    }

    /// Renders `page` to `stage` and returns that stage's textual output:
    /// YAML data, pretty JSON projection or markup.
    pub fn render_output(&mut self, stage: RenderStage, page: &mut Page) -> Result<String, RenderError> {
        self.render_to(stage, page)?;
        let resource = &page.resource;
        let failure = |message: String| RenderError::Output {
            path: resource.path.clone(),
            message,
        };

        match stage {
            RenderStage::Structural => {
                serde_yaml::to_string(&resource.data).map_err(|e| failure(e.to_string()))
            }
            RenderStage::Projection => {
                serde_json::to_string_pretty(&resource.json).map_err(|e| failure(e.to_string()))
            }
            RenderStage::Markup => Ok(page
                .content
                .as_ref()
                .map(|c| c.markup.clone())
                .unwrap_or_default()),
        }
    }

    pub fn render_resource(
        &mut self,
        stage: RenderStage,
        resource: &mut Resource,
    ) -> Result<Option<Content>, RenderError> {
        let _span = info_span!("render", path = %resource.path, kind = %resource.kind).entered();
        let set = self.hook_set(&resource.kind)?;

        {
            let _step = info_span!("structural").entered();
            self.run_structural(&set, resource)?;
        }
        if stage == RenderStage::Structural {
            return Ok(None);
        }

        {
            let _step = info_span!("projection").entered();
            self.run_projection(&set, resource)?;
        }
        if stage == RenderStage::Projection {
            return Ok(None);
        }

        let _step = info_span!("markup").entered();
        let body = self
            .templates
            .render(&resource.kind, &resource.path, &resource.json)?;

        let mut markup = String::with_capacity(set.header.len() + body.len() + set.footer.len() + 2);
        if !set.header.is_empty() {
            markup.push_str(&set.header);
            markup.push('\n');
        }
        markup.push_str(&body);
        if !set.footer.is_empty() {
            markup.push('\n');
            markup.push_str(&set.footer);
        }

        let content = Content::new(markup);
        log::debug!("Rendered {} ({})", resource.path, content.fingerprint);
        Ok(Some(content))
    }

    /// Hook sets are resolved once per kind, keyed by the kind a resource has
    /// when its render starts.
    fn hook_set(&mut self, kind: &str) -> Result<Rc<HookSet>, RenderError> {
        if let Some(set) = self.hook_sets.get(kind) {
            return Ok(Rc::clone(set));
        }

        let set = Rc::new(self.hooks.hook_set(
            kind,
            &mut self.programs,
            &self.engine,
            self.precompile,
        )?);
        self.hook_sets.insert(kind.to_string(), Rc::clone(&set));
        Ok(set)
    }

    fn run_structural(&mut self, set: &HookSet, resource: &mut Resource) -> Result<(), RenderError> {
        self.listings.run(&set.list_files)?;
        let env = self.listings.environment();

        for transform in &set.structural {
            let data = std::mem::replace(&mut resource.data, Value::Null);
            resource.data = transform
                .run(data, env, &self.engine)
                .map_err(|e| RenderError::Expression {
                    path: resource.path.clone(),
                    hook: transform.origin.clone(),
                    expression: e.expression,
                    source: e.source,
                })?;
        }

        resource.update_json()?;
        Ok(())
    }

    fn run_projection(&self, set: &HookSet, resource: &mut Resource) -> Result<(), RenderError> {
        let env = self.listings.environment();

        for command in &set.projection {
            resource.json = command
                .run(&resource.json, env, &self.engine)
                .map_err(|source| RenderError::Expression {
                    path: resource.path.clone(),
                    hook: command.origin.clone(),
                    expression: command.expression.clone(),
                    source,
                })?;
        }

        resource.update_kind_and_title();
        Ok(())
    }

    pub fn programs(&self) -> &ProgramCache {
        &self.programs
    }

    pub fn listings(&self) -> &ListFilesCache {
        &self.listings
    }
}
