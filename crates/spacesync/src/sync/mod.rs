//! Reconciliation of rendered pages with a remote space.

pub mod diff;
pub mod error;
pub mod page;
pub mod reconciler;
pub mod remote;
pub mod report;

/// Label marking remote pages as managed by this tool.
pub const GENERATED_BY_LABEL: &str = "spacesync-generated";

/// Key of the page property holding the content fingerprint.
pub const FINGERPRINT_PROPERTY_KEY: &str = "sha256";

pub use diff::{Change, Operation};
pub use error::{RemoteError, SyncError};
pub use page::{Page, PageTree};
pub use reconciler::Reconciler;
pub use remote::{
    to_remote_resources, Ancestor, ContentProperty, ManagedContent, ManagedPage, PageUpsert,
    RemoteApi, RemoteFingerprint, RemoteResource, SpaceStatus, UpsertedPage,
};
pub use report::{
    ChangeReporter, ChangeVerb, CollectingReporter, NoopReporter, ReportEntry, StdoutReporter,
    SyncReport,
};
