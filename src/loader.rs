//! Cancellable list loading
//!
//! Every load takes a generation ticket. A response is applied only while its
//! ticket is still the newest one, so a slow earlier request can never
//! overwrite the result of a later one. Failures leave an empty list behind
//! and publish a notification; retrying is an explicit `load` call.

use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use tokio::sync::{broadcast, RwLock};
use tokio_util::sync::CancellationToken;

use crate::error::{AppResult, ErrorKind};
use crate::state::Notification;

/// Monotonic request counter
#[derive(Debug, Default)]
pub struct RequestGeneration(AtomicU64);

impl RequestGeneration {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a request and return its ticket
    pub fn begin(&self) -> u64 {
        self.0.fetch_add(1, Ordering::SeqCst) + 1
    }

    pub fn current(&self) -> u64 {
        self.0.load(Ordering::SeqCst)
    }

    pub fn is_current(&self, ticket: u64) -> bool {
        self.current() == ticket
    }

    /// Make every outstanding ticket stale
    pub fn invalidate(&self) {
        self.begin();
    }
}

/// What happened to one `load` call
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LoadOutcome {
    Applied { count: usize },
    /// A newer request started first; the response was dropped
    Stale,
    /// The fetch failed and the list was emptied
    Failed { kind: ErrorKind },
    Cancelled,
}

/// One screen's list, replaced wholesale by each successful load
pub struct ListLoader<T> {
    name: &'static str,
    generation: RequestGeneration,
    items: RwLock<Arc<Vec<T>>>,
    notifier: broadcast::Sender<Notification>,
}

impl<T> ListLoader<T> {
    pub fn new(name: &'static str, notifier: broadcast::Sender<Notification>) -> Self {
        Self {
            name,
            generation: RequestGeneration::new(),
            items: RwLock::new(Arc::new(Vec::new())),
            notifier,
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Current list
    pub async fn snapshot(&self) -> Arc<Vec<T>> {
        self.items.read().await.clone()
    }

    /// Drop the list and any response still in flight
    pub async fn clear(&self) {
        let mut items = self.items.write().await;
        self.generation.invalidate();
        *items = Arc::new(Vec::new());
    }

    /// Run `fetch` and apply its result unless cancelled or superseded
    pub async fn load<F>(&self, cancel: &CancellationToken, fetch: F) -> LoadOutcome
    where
        F: Future<Output = AppResult<Vec<T>>>,
    {
        let ticket = self.generation.begin();
        tracing::debug!("Loading {} (generation {})", self.name, ticket);

        let result = tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                tracing::debug!("Load of {} cancelled", self.name);
                return LoadOutcome::Cancelled;
            }
            result = fetch => result,
        };

        let mut items = self.items.write().await;
        if !self.generation.is_current(ticket) {
            tracing::warn!(
                "Discarding stale {} response (generation {}, current {})",
                self.name,
                ticket,
                self.generation.current()
            );
            return LoadOutcome::Stale;
        }

        match result {
            Ok(list) => {
                let count = list.len();
                *items = Arc::new(list);
                tracing::info!("Loaded {} {}", count, self.name);
                LoadOutcome::Applied { count }
            }
            Err(e) => {
                tracing::error!("Failed to load {}: {}", self.name, e);
                *items = Arc::new(Vec::new());
                let _ = self.notifier.send(Notification::error(e.user_message()));
                LoadOutcome::Failed { kind: e.kind() }
            }
        }
    }
}
