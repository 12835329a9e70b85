//! Snapshot loader shared by the lost & found and thrift pages

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::RwLock;
use serde_json::Value;
use tracing::{debug, error, info};

use super::post::{ItemDraft, PostError, Poster};
use super::FeedItem;
use crate::store::{GatewayError, RemoteGateway};

/// Banner text shown when a snapshot fetch fails
pub const LOAD_ERROR_MESSAGE: &str = "Failed to load items. Please try again.";

/// Point-in-time view of a feed for rendering
#[derive(Debug, Clone)]
pub struct FeedSnapshot<T> {
    pub items: Arc<Vec<T>>,
    pub loading: bool,
    pub error: Option<&'static str>,
}

/// What happened to a finished load
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    Replaced,
    Failed,
    /// A newer load was already applied, this result was dropped
    Superseded,
}

struct FeedState<T> {
    items: Arc<Vec<T>>,
    loading: bool,
    error: Option<&'static str>,
    /// Ticket of the most recent load whose result was applied
    applied: u64,
}

/// Item feed over one remote collection
pub struct ItemFeed<T> {
    gateway: Arc<dyn RemoteGateway>,
    state: RwLock<FeedState<T>>,
    issued: AtomicU64,
    mounted: AtomicBool,
}

impl<T: FeedItem> ItemFeed<T> {
    pub fn new(gateway: Arc<dyn RemoteGateway>) -> Self {
        Self {
            gateway,
            state: RwLock::new(FeedState {
                items: Arc::new(Vec::new()),
                loading: true,
                error: None,
                applied: 0,
            }),
            issued: AtomicU64::new(0),
            mounted: AtomicBool::new(false),
        }
    }

    /// Current snapshot, loading flag and error banner
    pub fn snapshot(&self) -> FeedSnapshot<T> {
        let state = self.state.read();
        FeedSnapshot {
            items: state.items.clone(),
            loading: state.loading,
            error: state.error,
        }
    }

    /// Load once on first view; later views reuse the snapshot
    pub async fn mount(&self) {
        if !self.mounted.swap(true, Ordering::SeqCst) {
            self.load().await;
        }
    }

    /// Fetch the full collection and replace the snapshot wholesale
    pub async fn load(&self) -> LoadOutcome {
        let ticket = self.issued.fetch_add(1, Ordering::SeqCst) + 1;
        self.state.write().loading = true;

        info!(collection = %T::COLLECTION, ticket, "Loading items");
        let result = self.fetch().await;

        let mut state = self.state.write();
        if ticket < state.applied {
            debug!(collection = %T::COLLECTION, ticket, applied = state.applied, "Dropping stale load");
            return LoadOutcome::Superseded;
        }
        state.applied = ticket;
        // Stay in the loading state while a newer request is still in flight
        state.loading = self.issued.load(Ordering::SeqCst) > ticket;

        match result {
            Ok(items) => {
                info!(collection = %T::COLLECTION, count = items.len(), "Loaded items");
                state.items = Arc::new(items);
                state.error = None;
                LoadOutcome::Replaced
            }
            Err(e) => {
                error!(collection = %T::COLLECTION, error = %e, "Error loading items");
                state.error = Some(LOAD_ERROR_MESSAGE);
                LoadOutcome::Failed
            }
        }
    }

    /// Insert a new listing, then reload the snapshot once
    pub async fn post<D>(&self, draft: D, poster: &Poster) -> Result<T, PostError>
    where
        D: ItemDraft,
    {
        let row = draft.into_row(poster)?;
        let stored = self.gateway.insert(T::COLLECTION, row).await?;

        // The row exists now; refresh even if the echoed copy is unreadable
        info!(collection = %T::COLLECTION, poster = %poster.email, "Item posted");
        self.load().await;

        Ok(decode::<T>(stored)?)
    }

    async fn fetch(&self) -> Result<Vec<T>, GatewayError> {
        self.gateway
            .fetch_all(T::COLLECTION)
            .await?
            .into_iter()
            .map(decode)
            .collect()
    }
}

fn decode<T: FeedItem>(row: Value) -> Result<T, GatewayError> {
    Ok(serde_json::from_value(row)?)
}
