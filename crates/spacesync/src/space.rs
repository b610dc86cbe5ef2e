//! Whole-space and single-file entry points.

use std::path::Path;
use std::sync::Arc;

use tracing::info_span;

use crate::config::{absolute_path, DirectoryProperties, SyncSettings};
use crate::error::Result;
use crate::render::{RenderStage, Renderer};
use crate::resources::{ensure_unique_titles, ResourceLoader};
use crate::sync::{ChangeReporter, Page, PageTree, Reconciler, RemoteApi, SyncReport};

/// Renders the resource at `file` to `stage` and returns that stage's
/// output. Nothing is precompiled for a single render.
pub fn render_file(file: &Path, stage: RenderStage) -> Result<String> {
    let props = DirectoryProperties::from_path(file)?;
    let settings = SyncSettings::single_render();

    let mut renderer = Renderer::from_directory(&props, settings.precompile)?;
    let loader = ResourceLoader::new(&props.space_dir);
    let file = absolute_path(file)?;
    let mut page = Page::new(loader.load_file(&file)?);

    Ok(renderer.render_output(stage, &mut page)?)
}

/// Loads and renders every resource of the space containing `path`.
pub fn render_space(path: &Path, settings: &SyncSettings) -> Result<PageTree> {
    let props = DirectoryProperties::from_path(path)?;
    let _span = info_span!("render_space", space = %props.space_key).entered();

    let resources = ResourceLoader::new(&props.space_dir).load()?;
    ensure_unique_titles(&resources)?;

    let mut tree = PageTree::new(resources, settings.anchor.clone());
    let mut renderer = Renderer::from_directory(&props, settings.precompile)?;
    renderer.render_all(&mut tree)?;
    Ok(tree)
}

/// Renders the space containing `path` and reconciles it with `api`.
pub async fn sync_space(
    path: &Path,
    api: Arc<dyn RemoteApi>,
    settings: SyncSettings,
    reporter: Arc<dyn ChangeReporter>,
) -> Result<SyncReport> {
    let mut tree = render_space(path, &settings)?;
    let reconciler = Reconciler::new(api, settings, reporter);
    Ok(reconciler.sync(&mut tree).await?)
}
