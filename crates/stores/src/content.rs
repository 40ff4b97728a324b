//! Store for the collection of ingested content.

use std::collections::HashSet;

use tokio::sync::watch;
use tracing::{debug, info, warn};
use tubechat_models::{ContentId, ContentItem};
use tubechat_transport::ContentApi;

use crate::error::StoreResult;
use crate::resource::{ConcurrencyPolicy, RequestStatus, Resource, ResourceState};

const LOAD_ALL_FALLBACK: &str = "Failed to load contents";
const LOAD_ONE_FALLBACK: &str = "Failed to load content";
const INGEST_FALLBACK: &str = "Failed to add YouTube content";
const DELETE_FALLBACK: &str = "Failed to delete content";

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ContentState {
    /// Items in insertion order; ids are unique.
    pub contents: Vec<ContentItem>,
    pub status: RequestStatus,
}

impl ResourceState for ContentState {
    fn status(&self) -> &RequestStatus {
        &self.status
    }

    fn status_mut(&mut self) -> &mut RequestStatus {
        &mut self.status
    }
}

impl ContentState {
    pub fn contains(&self, id: ContentId) -> bool {
        self.contents.iter().any(|item| item.id == id)
    }
}

/// Owns the locally known content items.
pub struct ContentStore<A> {
    api: A,
    resource: Resource<ContentState>,
}

impl<A: ContentApi> ContentStore<A> {
    pub fn new(api: A) -> Self {
        Self::with_policy(api, ConcurrencyPolicy::default())
    }

    pub fn with_policy(api: A, policy: ConcurrencyPolicy) -> Self {
        Self {
            api,
            resource: Resource::new(ContentState::default(), policy),
        }
    }

    pub fn contents(&self) -> Vec<ContentItem> {
        self.resource.read(|state| state.contents.clone())
    }

    pub fn get(&self, id: ContentId) -> Option<ContentItem> {
        self.resource
            .read(|state| state.contents.iter().find(|item| item.id == id).cloned())
    }

    pub fn policy(&self) -> ConcurrencyPolicy {
        self.resource.policy()
    }

    pub fn loading(&self) -> bool {
        self.resource.loading()
    }

    pub fn error(&self) -> Option<String> {
        self.resource.error()
    }

    pub fn snapshot(&self) -> ContentState {
        self.resource.read(ContentState::clone)
    }

    pub fn subscribe(&self) -> watch::Receiver<ContentState> {
        self.resource.subscribe()
    }

    /// Drop every local item. No request is made and `loading`/`error` are untouched.
    pub fn clear(&self) {
        self.resource.modify(|state| state.contents.clear());
    }

    /// Replace the local collection with the backend's.
    pub async fn load_all(&self) -> StoreResult<Vec<ContentItem>> {
        let flight = self.resource.begin(LOAD_ALL_FALLBACK).await;

        let fetched = self
            .api
            .list_contents()
            .await
            .map_err(|err| flight.fail(err))?;

        let contents = unique_by_id(fetched);
        info!(count = contents.len(), "content collection replaced");

        let stored = contents.clone();
        self.resource.modify(|state| state.contents = stored);
        Ok(contents)
    }

    /// Fetch one item and append it unless an item with that id is already held.
    ///
    /// When the id is already present the fetched copy is discarded and the
    /// local entry is left as it was, even if the backend's copy is newer.
    pub async fn load_one(&self, id: ContentId) -> StoreResult<ContentItem> {
        let flight = self.resource.begin(LOAD_ONE_FALLBACK).await;

        let item = self
            .api
            .fetch_content(id)
            .await
            .map_err(|err| flight.fail(err))?;

        self.resource.modify(|state| {
            if state.contains(item.id) {
                debug!(content_id = item.id, "content already held, keeping local copy");
            } else {
                state.contents.push(item.clone());
            }
        });

        Ok(item)
    }

    /// Submit a source URL for ingestion.
    ///
    /// On success the collection holds only the new item; previous items are
    /// dropped locally but not deleted on the server.
    pub async fn ingest_from_external_source(&self, url: &str) -> StoreResult<ContentItem> {
        let flight = self.resource.begin(INGEST_FALLBACK).await;

        let item = self
            .api
            .ingest_video(url)
            .await
            .map_err(|err| flight.fail(err))?;

        info!(content_id = item.id, title = %item.title, "content ingested");

        let stored = item.clone();
        self.resource.modify(|state| state.contents = vec![stored]);
        Ok(item)
    }

    pub async fn delete(&self, id: ContentId) -> StoreResult<()> {
        let flight = self.resource.begin(DELETE_FALLBACK).await;

        self.api
            .delete_content(id)
            .await
            .map_err(|err| flight.fail(err))?;

        self.resource
            .modify(|state| state.contents.retain(|item| item.id != id));
        info!(content_id = id, "content deleted");
        Ok(())
    }
}

fn unique_by_id(items: Vec<ContentItem>) -> Vec<ContentItem> {
    let received = items.len();
    let mut seen = HashSet::with_capacity(received);
    let unique: Vec<_> = items.into_iter().filter(|item| seen.insert(item.id)).collect();

    if unique.len() != received {
        warn!(
            received,
            kept = unique.len(),
            "backend returned duplicate content ids, keeping first occurrences"
        );
    }

    unique
}
