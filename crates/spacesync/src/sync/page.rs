//! Rendered pages arranged by directory hierarchy.

use std::collections::{BTreeSet, HashMap};

use super::diff::{self, Change};
use super::remote::RemoteResource;
use super::GENERATED_BY_LABEL;
use crate::render::Content;
use crate::resources::Resource;

/// A resource with its rendered content and its remote counterpart.
#[derive(Debug, Clone)]
pub struct Page {
    pub resource: Resource,
    pub content: Option<Content>,
    pub remote: Option<RemoteResource>,
    /// Index of the parent page in the tree.
    pub parent: Option<usize>,
    pub depth: usize,
}

impl Page {
    pub fn new(resource: Resource) -> Self {
        let depth = resource.depth();
        Self {
            resource,
            content: None,
            remote: None,
            parent: None,
            depth,
        }
    }

    pub fn title(&self) -> &str {
        &self.resource.title
    }

    pub fn fingerprint(&self) -> Option<&str> {
        self.content.as_ref().map(|c| c.fingerprint.as_str())
    }

    /// True without a remote, or when the stored fingerprint is not the
    /// rendered one.
    pub fn fingerprint_differs(&self) -> bool {
        let Some(remote) = &self.remote else {
            return true;
        };
        let stored = remote.fingerprint.as_ref().map(|f| f.value.as_str());
        stored.is_none() || stored != self.fingerprint()
    }

    /// Compares the generated marker plus the desired labels against the
    /// remote labels as sets.
    pub fn labels_differ(&self) -> bool {
        let Some(remote) = &self.remote else {
            return true;
        };
        let labels = self.resource.labels();
        let desired: BTreeSet<&str> = std::iter::once(GENERATED_BY_LABEL)
            .chain(labels.iter().map(String::as_str))
            .collect();
        let current: BTreeSet<&str> = remote.labels.iter().map(String::as_str).collect();
        desired != current
    }

    pub fn desired_labels(&self) -> Vec<String> {
        self.resource.labels()
    }
}

/// Every page of a space plus the remote pages no local page claims.
#[derive(Debug, Clone, Default)]
pub struct PageTree {
    pages: Vec<Page>,
    by_path: HashMap<String, usize>,
    orphans: Vec<RemoteResource>,
    anchor: Option<String>,
}

impl PageTree {
    /// Builds the tree. A page's parent is the page at its parent directory.
    pub fn new(resources: Vec<Resource>, anchor: Option<String>) -> Self {
        let pages: Vec<Page> = resources.into_iter().map(Page::new).collect();
        let by_path: HashMap<String, usize> = pages
            .iter()
            .enumerate()
            .map(|(i, p)| (p.resource.path.clone(), i))
            .collect();

        let mut tree = Self {
            pages,
            by_path,
            orphans: Vec::new(),
            anchor,
        };
        for i in 0..tree.pages.len() {
            let parent = tree.pages[i]
                .resource
                .parent_path()
                .and_then(|p| tree.by_path.get(p).copied());
            tree.pages[i].parent = parent;
        }
        tree
    }

    /// Matches remotes to pages by title, ignoring case. Remotes without a
    /// local page become deletion candidates.
    pub fn add_remotes(&mut self, remotes: Vec<RemoteResource>) {
        let by_title: HashMap<String, usize> = self
            .pages
            .iter()
            .enumerate()
            .map(|(i, p)| (p.title().to_lowercase(), i))
            .collect();

        for remote in remotes {
            match by_title.get(&remote.title.to_lowercase()) {
                Some(&i) => self.pages[i].remote = Some(remote),
                None => self.orphans.push(remote),
            }
        }
        log::debug!("{} remote pages have no local counterpart", self.orphans.len());
    }

    pub fn has_anchor(&self) -> bool {
        self.anchor.is_some()
    }

    pub fn set_anchor(&mut self, anchor: impl Into<String>) {
        self.anchor = Some(anchor.into());
    }

    pub fn anchor(&self) -> Option<&str> {
        self.anchor.as_deref()
    }

    /// Remote id under which the page at `index` is created or moved: its
    /// parent page's remote id, or the anchor for top-level pages.
    pub fn parent_id(&self, index: usize) -> Option<&str> {
        match self.pages.get(index)?.parent {
            Some(parent) => self.pages.get(parent)?.remote.as_ref().map(|r| r.id.as_str()),
            None => self.anchor(),
        }
    }

    pub fn pages(&self) -> &[Page] {
        &self.pages
    }

    pub fn pages_mut(&mut self) -> impl Iterator<Item = &mut Page> {
        self.pages.iter_mut()
    }

    pub fn page(&self, index: usize) -> Option<&Page> {
        self.pages.get(index)
    }

    pub fn page_mut(&mut self, index: usize) -> Option<&mut Page> {
        self.pages.get_mut(index)
    }

    pub fn get(&self, path: &str) -> Option<&Page> {
        self.by_path.get(path).and_then(|&i| self.pages.get(i))
    }

    pub fn orphans(&self) -> &[RemoteResource] {
        &self.orphans
    }

    pub fn orphan(&self, index: usize) -> Option<&RemoteResource> {
        self.orphans.get(index)
    }

    pub fn len(&self) -> usize {
        self.pages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }

    /// Ordered batches of changes; see [`diff::plan`].
    pub fn changes(&self) -> Vec<Vec<Change>> {
        diff::plan(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sync::remote::RemoteFingerprint;

    fn resource(path: &str, title: &str) -> Resource {
        Resource::from_yaml(path, &format!("kind: page\ntitle: {}\n", title)).unwrap()
    }

    fn remote(id: &str, title: &str) -> RemoteResource {
        RemoteResource {
            id: id.to_string(),
            title: title.to_string(),
            labels: vec![GENERATED_BY_LABEL.to_string()],
            link: format!("https://wiki/{}", id),
            version: 1,
            ..RemoteResource::default()
        }
    }

    #[test]
    fn test_parents_resolved_by_directory() {
        let tree = PageTree::new(
            vec![
                resource("/apps", "Apps"),
                resource("/apps/a.yml", "A"),
                resource("/apps/nested/b.yml", "B"),
                resource("/top.yml", "Top"),
            ],
            None,
        );

        assert_eq!(tree.pages()[0].parent, None);
        assert_eq!(tree.pages()[1].parent, Some(0));
        assert_eq!(tree.pages()[2].parent, None);
        assert_eq!(tree.pages()[2].depth, 3);
        assert_eq!(tree.get("/top.yml").map(|p| p.depth), Some(1));
    }

    #[test]
    fn test_add_remotes_matches_titles_ignoring_case() {
        let mut tree = PageTree::new(vec![resource("/intro.yml", "Intro")], None);
        tree.add_remotes(vec![remote("1", "INTRO"), remote("2", "Gone")]);

        assert_eq!(tree.pages()[0].remote.as_ref().map(|r| r.id.as_str()), Some("1"));
        assert_eq!(tree.orphans().len(), 1);
        assert_eq!(tree.orphans()[0].title, "Gone");
    }

    #[test]
    fn test_parent_id_uses_anchor_for_top_level() {
        let mut tree = PageTree::new(
            vec![resource("/apps", "Apps"), resource("/apps/a.yml", "A")],
            None,
        );
        assert!(!tree.has_anchor());
        assert_eq!(tree.parent_id(0), None);

        tree.set_anchor("root");
        tree.add_remotes(vec![remote("7", "Apps")]);
        assert_eq!(tree.parent_id(0), Some("root"));
        assert_eq!(tree.parent_id(1), Some("7"));
    }

    #[test]
    fn test_fingerprint_and_label_comparison() {
        let mut page = Page::new(
            Resource::from_yaml("/a.yml", "kind: page\ntitle: A\nlabels: [docs]\n").unwrap(),
        );
        page.content = Some(Content::new("body"));
        assert!(page.fingerprint_differs());
        assert!(page.labels_differ());

        let mut existing = remote("1", "A");
        existing.labels = vec!["docs".to_string(), GENERATED_BY_LABEL.to_string()];
        existing.fingerprint = Some(RemoteFingerprint {
            id: "p1".to_string(),
            value: Content::new("body").fingerprint,
            version: 1,
        });
        page.remote = Some(existing);
        assert!(!page.fingerprint_differs());
        assert!(!page.labels_differ());

        page.content = Some(Content::new("changed"));
        assert!(page.fingerprint_differs());
        assert_eq!(page.desired_labels(), vec!["docs"]);
    }
}
