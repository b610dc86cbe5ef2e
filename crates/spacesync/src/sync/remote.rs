//! The remote document-hosting API seam and its data shapes.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::error::RemoteError;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ancestor {
    pub id: String,
    pub title: String,
}

/// The fingerprint property stored on a remote page.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteFingerprint {
    pub id: String,
    pub value: String,
    pub version: u64,
}

/// A managed page as it exists in the remote space.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteResource {
    pub id: String,
    pub title: String,
    pub labels: Vec<String>,
    pub link: String,
    pub version: u64,
    pub ancestors: Vec<Ancestor>,
    pub fingerprint: Option<RemoteFingerprint>,
}

/// Page payload of a managed-content listing, before link resolution.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManagedPage {
    pub id: String,
    pub title: String,
    pub labels: Vec<String>,
    /// Web UI path relative to the base URL.
    pub webui: String,
    pub version: u64,
    pub ancestors: Vec<Ancestor>,
    pub fingerprint: Option<RemoteFingerprint>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManagedContent {
    pub base_url: String,
    pub pages: Vec<ManagedPage>,
}

/// Joins `base_url` and each page's web UI path into its canonical link.
pub fn to_remote_resources(content: ManagedContent) -> Vec<RemoteResource> {
    let base = content.base_url;
    content
        .pages
        .into_iter()
        .map(|page| RemoteResource {
            link: format!("{}{}", base, page.webui),
            id: page.id,
            title: page.title,
            labels: page.labels,
            version: page.version,
            ancestors: page.ancestors,
            fingerprint: page.fingerprint,
        })
        .collect()
}

/// Outcome of `create_space_if_not_exists`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpaceStatus {
    pub existed: bool,
    pub root_id: String,
}

/// Create or update request. `id` is set for updates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PageUpsert {
    pub id: Option<String>,
    pub title: String,
    pub markup: String,
    pub parent_id: Option<String>,
    pub version: u64,
    pub labels: Vec<String>,
}

/// Identity of an upserted page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpsertedPage {
    pub id: String,
    pub link: String,
}

/// A page property write. `id` is set when the property already exists.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ContentProperty {
    pub page_id: String,
    pub id: Option<String>,
    pub key: String,
    pub value: String,
    pub version: u64,
}

/// Client of the remote space being reconciled.
#[async_trait]
pub trait RemoteApi: Send + Sync {
    async fn create_space_if_not_exists(&self) -> Result<SpaceStatus, RemoteError>;

    /// Pages previously tagged as managed by this tool.
    async fn get_managed_content(&self) -> Result<ManagedContent, RemoteError>;

    async fn upsert_page(&self, page: &PageUpsert) -> Result<UpsertedPage, RemoteError>;

    async fn upsert_property(&self, property: &ContentProperty) -> Result<(), RemoteError>;

    async fn set_labels(&self, page_id: &str, labels: &[String]) -> Result<(), RemoteError>;

    async fn delete_page(&self, page_id: &str) -> Result<(), RemoteError>;

    /// Whether the remote flavour supports per-page label calls.
    fn is_server_instance(&self) -> bool;
}
