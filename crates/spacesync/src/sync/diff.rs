//! Classification of pages against their remotes, grouped into ordered
//! batches.

use std::collections::BTreeMap;
use std::fmt;

use super::page::{Page, PageTree};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    Create,
    Update,
    Delete,
    Noop,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Operation::Create => "create",
            Operation::Update => "update",
            Operation::Delete => "delete",
            Operation::Noop => "noop",
        };
        f.write_str(name)
    }
}

/// One planned change. Pages and orphans are referenced by their index in
/// the [`PageTree`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Change {
    Create {
        page: usize,
    },
    Update {
        page: usize,
        content_changed: bool,
        labels_changed: bool,
    },
    Noop {
        page: usize,
    },
    Delete {
        orphan: usize,
    },
}

impl Change {
    pub fn classify(index: usize, page: &Page) -> Self {
        if page.remote.is_none() {
            return Change::Create { page: index };
        }

        let content_changed = page.fingerprint_differs();
        let labels_changed = page.labels_differ();
        if content_changed || labels_changed {
            Change::Update {
                page: index,
                content_changed,
                labels_changed,
            }
        } else {
            Change::Noop { page: index }
        }
    }

    pub fn operation(&self) -> Operation {
        match self {
            Change::Create { .. } => Operation::Create,
            Change::Update { .. } => Operation::Update,
            Change::Noop { .. } => Operation::Noop,
            Change::Delete { .. } => Operation::Delete,
        }
    }

    /// Whether the fingerprint property must be written.
    pub fn writes_fingerprint(&self) -> bool {
        match self {
            Change::Create { .. } => true,
            Change::Update {
                content_changed, ..
            } => *content_changed,
            _ => false,
        }
    }

    /// Whether labels must be written, where the remote supports them.
    pub fn writes_labels(&self) -> bool {
        match self {
            Change::Create { .. } => true,
            Change::Update { labels_changed, .. } => *labels_changed,
            _ => false,
        }
    }
}

/// Plans the batches for `tree`.
///
/// Pages come first, one batch per depth from the top, so a parent exists
/// remotely before its children are applied. Deletions follow, one batch per
/// ancestor depth from the deepest, so descendants go before ancestors.
pub fn plan(tree: &PageTree) -> Vec<Vec<Change>> {
    let mut upserts: BTreeMap<usize, Vec<Change>> = BTreeMap::new();
    for (index, page) in tree.pages().iter().enumerate() {
        upserts
            .entry(page.depth)
            .or_default()
            .push(Change::classify(index, page));
    }

    let mut deletes: BTreeMap<usize, Vec<Change>> = BTreeMap::new();
    for (index, orphan) in tree.orphans().iter().enumerate() {
        deletes
            .entry(orphan.ancestors.len())
            .or_default()
            .push(Change::Delete { orphan: index });
    }

    let mut batches: Vec<Vec<Change>> = upserts.into_values().collect();
    batches.extend(deletes.into_values().rev());
    batches
}
