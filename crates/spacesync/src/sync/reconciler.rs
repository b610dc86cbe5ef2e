//! Applies planned changes to the remote space.

use std::sync::Arc;

use futures_util::future::BoxFuture;
use futures_util::stream::{self, StreamExt, TryStreamExt};
use tracing::{info_span, Instrument};

use super::diff::Change;
use super::error::SyncError;
use super::page::{Page, PageTree};
use super::remote::{
    to_remote_resources, ContentProperty, PageUpsert, RemoteApi, RemoteFingerprint,
    RemoteResource,
};
use super::report::{ChangeReporter, ChangeVerb, ReportEntry, SyncReport};
use super::{FINGERPRINT_PROPERTY_KEY, GENERATED_BY_LABEL};
use crate::config::SyncSettings;

/// Result of one applied change.
struct Applied {
    entry: ReportEntry,
    /// Remote identity of a newly created page, written back into the tree
    /// once its batch completes.
    created: Option<(usize, RemoteResource)>,
}

pub struct Reconciler {
    api: Arc<dyn RemoteApi>,
    settings: SyncSettings,
    reporter: Arc<dyn ChangeReporter>,
}

impl Reconciler {
    pub fn new(
        api: Arc<dyn RemoteApi>,
        settings: SyncSettings,
        reporter: Arc<dyn ChangeReporter>,
    ) -> Self {
        Self {
            api,
            settings,
            reporter,
        }
    }

    /// Reconciles the rendered `tree` with the remote space.
    ///
    /// Batches run strictly in sequence. The first failing call aborts the
    /// run; calls of the same batch still pending are dropped.
    pub async fn sync(&self, tree: &mut PageTree) -> Result<SyncReport, SyncError> {
        self.settings.validate()?;

        let space = self
            .api
            .create_space_if_not_exists()
            .await
            .map_err(|e| SyncError::remote("create_space_if_not_exists", "space", e))?;

        if !tree.has_anchor() {
            let anchor = self
                .settings
                .anchor
                .clone()
                .unwrap_or_else(|| space.root_id.clone());
            tree.set_anchor(anchor);
        }

        if space.existed {
            let content = self
                .api
                .get_managed_content()
                .await
                .map_err(|e| SyncError::remote("get_managed_content", "space", e))?;
            tree.add_remotes(to_remote_resources(content));
        }

        let batches = tree.changes();
        let mut report = SyncReport::default();

        for (level, batch) in batches.iter().enumerate() {
            let span = info_span!("batch", level, changes = batch.len());
            let applied = self.apply_batch(tree, batch).instrument(span).await?;

            for outcome in applied {
                if let Some((index, remote)) = outcome.created {
                    if let Some(page) = tree.page_mut(index) {
                        page.remote = Some(remote);
                    }
                }
                report.entries.push(outcome.entry);
            }
        }

        log::info!(
            "Sync finished: {} created, {} updated, {} deleted, {} skipped",
            report.count(ChangeVerb::Created),
            report.count(ChangeVerb::Updated) + report.count(ChangeVerb::Labels),
            report.count(ChangeVerb::Deleted),
            report.count(ChangeVerb::Skipped)
        );
        Ok(report)
    }

    async fn apply_batch(
        &self,
        tree: &PageTree,
        batch: &[Change],
    ) -> Result<Vec<Applied>, SyncError> {
        stream::iter(batch.iter().map(|change| self.apply(tree, *change)))
            .buffer_unordered(self.settings.primary_concurrency)
            .try_collect()
            .await
    }

    async fn apply(&self, tree: &PageTree, change: Change) -> Result<Applied, SyncError> {
        let applied = match change {
            Change::Noop { page } => {
                let page = &tree.pages()[page];
                let link = page.remote.as_ref().map(|r| r.link.clone()).unwrap_or_default();
                Applied {
                    entry: entry(ChangeVerb::Skipped, page.title(), link),
                    created: None,
                }
            }
            Change::Delete { orphan } => {
                let remote = &tree.orphans()[orphan];
                self.api
                    .delete_page(&remote.id)
                    .await
                    .map_err(|e| SyncError::remote("delete_page", &remote.title, e))?;
                Applied {
                    entry: entry(ChangeVerb::Deleted, &remote.title, remote.link.clone()),
                    created: None,
                }
            }
            Change::Create { page } | Change::Update { page, .. } => {
                self.upsert(tree, page, change).await?
            }
        };

        self.reporter.report(&applied.entry);
        Ok(applied)
    }

    async fn upsert(
        &self,
        tree: &PageTree,
        index: usize,
        change: Change,
    ) -> Result<Applied, SyncError> {
        let page = &tree.pages()[index];
        let title = page.title();
        let content = page.content.as_ref().ok_or_else(|| SyncError::NotRendered {
            path: page.resource.path.clone(),
        })?;

        let parent_id = match page.parent {
            Some(_) => Some(
                tree.parent_id(index)
                    .ok_or_else(|| SyncError::UnresolvedParent {
                        path: page.resource.path.clone(),
                    })?
                    .to_string(),
            ),
            None => tree.anchor().map(str::to_string),
        };

        let request = PageUpsert {
            id: page.remote.as_ref().map(|r| r.id.clone()),
            title: title.to_string(),
            markup: content.markup.clone(),
            parent_id,
            version: page.remote.as_ref().map(|r| r.version + 1).unwrap_or(1),
            labels: managed_labels(page),
        };
        let upserted = self
            .api
            .upsert_page(&request)
            .await
            .map_err(|e| SyncError::remote("upsert_page", title, e))?;

        let property = change
            .writes_fingerprint()
            .then(|| fingerprint_property(page, &upserted.id, &content.fingerprint));
        let labels = (self.api.is_server_instance() && change.writes_labels())
            .then(|| managed_labels(page));

        let mut calls: Vec<BoxFuture<'_, Result<(), SyncError>>> = Vec::with_capacity(2);
        if let Some(property) = &property {
            calls.push(Box::pin(async move {
                self.api
                    .upsert_property(property)
                    .await
                    .map_err(|e| SyncError::remote("upsert_property", title, e))
            }));
        }
        if let Some(labels) = &labels {
            let page_id = upserted.id.as_str();
            calls.push(Box::pin(async move {
                self.api
                    .set_labels(page_id, labels)
                    .await
                    .map_err(|e| SyncError::remote("set_labels", title, e))
            }));
        }

        stream::iter(calls)
            .buffer_unordered(self.settings.secondary_concurrency)
            .try_collect::<Vec<()>>()
            .await?;

        let applied = match (change, &page.remote) {
            (
                Change::Update {
                    content_changed: false,
                    labels_changed: true,
                    ..
                },
                Some(remote),
            ) => Applied {
                entry: entry(ChangeVerb::Labels, title, remote.link.clone()),
                created: None,
            },
            (Change::Update { .. }, Some(remote)) => Applied {
                entry: entry(ChangeVerb::Updated, title, remote.link.clone()),
                created: None,
            },
            _ => {
                let created = RemoteResource {
                    id: upserted.id.clone(),
                    title: title.to_string(),
                    labels: request.labels,
                    link: upserted.link.clone(),
                    version: request.version,
                    ancestors: Vec::new(),
                    fingerprint: property.map(|p| RemoteFingerprint {
                        id: p.id.unwrap_or_default(),
                        value: p.value,
                        version: p.version,
                    }),
                };
                Applied {
                    entry: entry(ChangeVerb::Created, title, upserted.link),
                    created: Some((index, created)),
                }
            }
        };
        Ok(applied)
    }
}

fn entry(verb: ChangeVerb, title: &str, link: String) -> ReportEntry {
    ReportEntry {
        verb,
        title: title.to_string(),
        link,
    }
}

/// The generated-by marker followed by the page's own labels.
fn managed_labels(page: &Page) -> Vec<String> {
    std::iter::once(GENERATED_BY_LABEL.to_string())
        .chain(page.desired_labels())
        .collect()
}

fn fingerprint_property(page: &Page, page_id: &str, fingerprint: &str) -> ContentProperty {
    let stored = page.remote.as_ref().and_then(|r| r.fingerprint.as_ref());
    ContentProperty {
        page_id: page_id.to_string(),
        id: stored.map(|f| f.id.clone()),
        key: FINGERPRINT_PROPERTY_KEY.to_string(),
        value: fingerprint.to_string(),
        version: stored.map(|f| f.version + 1).unwrap_or(1),
    }
}
