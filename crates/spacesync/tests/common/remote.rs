//! A recording `RemoteApi` backed by in-memory state.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;

use spacesync::sync::{
    ContentProperty, ManagedContent, ManagedPage, PageUpsert, RemoteApi, RemoteError,
    SpaceStatus, UpsertedPage,
};

pub const BASE_URL: &str = "https://wiki.example.com";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    CreateSpace,
    GetManagedContent,
    UpsertPage(PageUpsert),
    UpsertProperty(ContentProperty),
    SetLabels(String, Vec<String>),
    DeletePage(String),
}

/// Start and end of a page upsert or delete, in the order they happened.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    Started(String),
    Finished(String),
}

/// Yields this many times inside each write so sibling calls can overlap.
const WRITE_YIELDS: usize = 3;

pub struct MockRemote {
    existed: bool,
    server: bool,
    pages: Vec<ManagedPage>,
    fail_on: Option<&'static str>,
    next_id: AtomicUsize,
    calls: Mutex<Vec<Call>>,
    events: Mutex<Vec<Event>>,
    primary_in_flight: AtomicUsize,
    max_primary_in_flight: AtomicUsize,
    secondary_in_flight: Mutex<HashMap<String, usize>>,
    max_secondary_in_flight: AtomicUsize,
}

impl MockRemote {
    /// A space that does not exist yet.
    pub fn empty() -> Self {
        Self {
            existed: false,
            server: true,
            pages: Vec::new(),
            fail_on: None,
            next_id: AtomicUsize::new(100),
            calls: Mutex::new(Vec::new()),
            events: Mutex::new(Vec::new()),
            primary_in_flight: AtomicUsize::new(0),
            max_primary_in_flight: AtomicUsize::new(0),
            secondary_in_flight: Mutex::new(HashMap::new()),
            max_secondary_in_flight: AtomicUsize::new(0),
        }
    }

    /// An existing space holding `pages`.
    pub fn with_pages(pages: Vec<ManagedPage>) -> Self {
        Self {
            existed: true,
            pages,
            ..Self::empty()
        }
    }

    pub fn cloud(mut self) -> Self {
        self.server = false;
        self
    }

    /// Makes every call of the named method fail.
    pub fn failing_on(mut self, method: &'static str) -> Self {
        self.fail_on = Some(method);
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    /// Calls that write to the remote space.
    pub fn writes(&self) -> Vec<Call> {
        self.calls()
            .into_iter()
            .filter(|c| !matches!(c, Call::CreateSpace | Call::GetManagedContent))
            .collect()
    }

    pub fn page_upserts(&self) -> Vec<PageUpsert> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                Call::UpsertPage(p) => Some(p),
                _ => None,
            })
            .collect()
    }

    pub fn events(&self) -> Vec<Event> {
        self.events.lock().unwrap().clone()
    }

    /// Highest number of page upserts and deletes running at once.
    pub fn max_primary_in_flight(&self) -> usize {
        self.max_primary_in_flight.load(Ordering::SeqCst)
    }

    /// Highest number of property and label calls running at once for a
    /// single page.
    pub fn max_secondary_in_flight(&self) -> usize {
        self.max_secondary_in_flight.load(Ordering::SeqCst)
    }

    async fn primary(&self, label: &str) {
        let now = self.primary_in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_primary_in_flight.fetch_max(now, Ordering::SeqCst);
        self.events
            .lock()
            .unwrap()
            .push(Event::Started(label.to_string()));

        for _ in 0..WRITE_YIELDS {
            tokio::task::yield_now().await;
        }

        self.events
            .lock()
            .unwrap()
            .push(Event::Finished(label.to_string()));
        self.primary_in_flight.fetch_sub(1, Ordering::SeqCst);
    }

    async fn secondary(&self, page_id: &str) {
        {
            let mut in_flight = self.secondary_in_flight.lock().unwrap();
            let count = in_flight.entry(page_id.to_string()).or_insert(0);
            *count += 1;
            self.max_secondary_in_flight
                .fetch_max(*count, Ordering::SeqCst);
        }

        for _ in 0..WRITE_YIELDS {
            tokio::task::yield_now().await;
        }

        if let Some(count) = self.secondary_in_flight.lock().unwrap().get_mut(page_id) {
            *count -= 1;
        }
    }

    fn record(&self, method: &'static str, call: Call) -> Result<(), RemoteError> {
        self.calls.lock().unwrap().push(call);
        if self.fail_on == Some(method) {
            return Err(RemoteError::Response {
                status: 500,
                message: format!("{} failed", method),
            });
        }
        Ok(())
    }
}

#[async_trait]
impl RemoteApi for MockRemote {
    async fn create_space_if_not_exists(&self) -> Result<SpaceStatus, RemoteError> {
        self.record("create_space_if_not_exists", Call::CreateSpace)?;
        Ok(SpaceStatus {
            existed: self.existed,
            root_id: "root".to_string(),
        })
    }

    async fn get_managed_content(&self) -> Result<ManagedContent, RemoteError> {
        self.record("get_managed_content", Call::GetManagedContent)?;
        Ok(ManagedContent {
            base_url: BASE_URL.to_string(),
            pages: self.pages.clone(),
        })
    }

    async fn upsert_page(&self, page: &PageUpsert) -> Result<UpsertedPage, RemoteError> {
        self.primary(&page.title).await;
        self.record("upsert_page", Call::UpsertPage(page.clone()))?;
        let id = page
            .id
            .clone()
            .unwrap_or_else(|| self.next_id.fetch_add(1, Ordering::SeqCst).to_string());
        Ok(UpsertedPage {
            link: format!("{}/pages/{}", BASE_URL, id),
            id,
        })
    }

    async fn upsert_property(&self, property: &ContentProperty) -> Result<(), RemoteError> {
        self.secondary(&property.page_id).await;
        self.record("upsert_property", Call::UpsertProperty(property.clone()))
    }

    async fn set_labels(&self, page_id: &str, labels: &[String]) -> Result<(), RemoteError> {
        self.secondary(page_id).await;
        self.record(
            "set_labels",
            Call::SetLabels(page_id.to_string(), labels.to_vec()),
        )
    }

    async fn delete_page(&self, page_id: &str) -> Result<(), RemoteError> {
        self.primary(page_id).await;
        self.record("delete_page", Call::DeletePage(page_id.to_string()))
    }

    fn is_server_instance(&self) -> bool {
        self.server
    }
}
