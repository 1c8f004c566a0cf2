//! Debounced, cancellable search.
//!
//! [`SearchController`] turns a stream of input changes into at most one
//! search request in flight, and makes sure only the newest request can
//! change what the reader sees.
//!
//! ## States
//!
//! ```text
//!            non-empty input          timer fires
//!   Idle ───────────────────▶ Pending ───────────▶ Loading ──▶ Success
//!    ▲                          ▲  │                  │   └──▶ Failed
//!    │      empty input         │  └─ input resets ───┘
//!    └──────── (any state) ─────┘     the timer
//! ```
//!
//! - Every input change aborts the armed timer and arms a new one, so only
//!   the last change in a burst sends a request.
//! - When a timer fires, the previous in-flight request is cancelled and its
//!   id retired before the new request is recorded as active.
//! - A finished request commits only if its id is still the active one. A
//!   superseded request that resolves late is dropped, whatever it returned.
//! - Empty input cancels everything and returns to `Idle` immediately.
//! - [`SearchController::dispose`] (also run on drop) aborts the timer and
//!   cancels the request; nothing fires afterwards.
//!
//! State sits behind one mutex that is never held across an `.await`.
//! Renderers read [`SearchSnapshot`]s, either by polling
//! [`SearchController::snapshot`] or through [`SearchController::subscribe`].

use crate::api::{ApiError, ContentApi};
use crate::config::SearchConfig;
use crate::types::ResultItem;
use serde::Serialize;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Visible status of the search surface.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", content = "message", rename_all = "lowercase")]
pub enum SearchStatus {
    Idle,
    /// Debounce timer armed.
    Pending,
    /// Request in flight.
    Loading,
    Success,
    Failed(String),
}

/// What a renderer needs to draw the search surface.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SearchSnapshot {
    pub query: String,
    pub status: SearchStatus,
    pub results: Vec<ResultItem>,
}

impl Default for SearchSnapshot {
    fn default() -> Self {
        Self {
            query: String::new(),
            status: SearchStatus::Idle,
            results: Vec::new(),
        }
    }
}

/// Route for the full results page, produced by an explicit submit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchNavigation {
    pub path: String,
}

/// Full-results route for `query`.
pub fn results_path(query: &str) -> String {
    let encoded: String = url::form_urlencoded::byte_serialize(query.trim().as_bytes()).collect();
    format!("/search?query={encoded}")
}

struct ActiveRequest {
    id: u64,
    token: CancellationToken,
}

struct Inner {
    snapshot: SearchSnapshot,
    /// Bumped on every input change; a timer only fires for its own input.
    input_generation: u64,
    next_request_id: u64,
    timer: Option<JoinHandle<()>>,
    active: Option<ActiveRequest>,
    disposed: bool,
}

impl Inner {
    fn cancel_active(&mut self) {
        if let Some(active) = self.active.take() {
            debug!(request = active.id, "cancelling in-flight search");
            active.token.cancel();
        }
    }

    fn abort_timer(&mut self) {
        if let Some(timer) = self.timer.take() {
            timer.abort();
        }
    }
}

struct Shared {
    inner: Mutex<Inner>,
    updates: watch::Sender<SearchSnapshot>,
}

impl Shared {
    fn lock(&self) -> MutexGuard<'_, Inner> {
        // A panic while holding the lock leaves plain data behind; keep going.
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn publish(&self, inner: &Inner) {
        self.updates.send_replace(inner.snapshot.clone());
    }
}

/// Debounced search over a [`ContentApi`].
///
/// Must be used from within a tokio runtime: input changes spawn the timer
/// and request tasks.
pub struct SearchController<A: ContentApi + 'static> {
    api: Arc<A>,
    debounce: Duration,
    request_timeout: Option<Duration>,
    shared: Arc<Shared>,
}

impl<A: ContentApi + 'static> SearchController<A> {
    pub fn new(api: Arc<A>, config: &SearchConfig) -> Self {
        let (updates, _) = watch::channel(SearchSnapshot::default());
        Self {
            api,
            debounce: config.debounce(),
            request_timeout: config.request_timeout(),
            shared: Arc::new(Shared {
                inner: Mutex::new(Inner {
                    snapshot: SearchSnapshot::default(),
                    input_generation: 0,
                    next_request_id: 0,
                    timer: None,
                    active: None,
                    disposed: false,
                }),
                updates,
            }),
        }
    }

    pub fn snapshot(&self) -> SearchSnapshot {
        self.shared.lock().snapshot.clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<SearchSnapshot> {
        self.shared.updates.subscribe()
    }

    /// Handle a change of the search input.
    pub fn input(&self, query: impl Into<String>) {
        let query = query.into();
        let mut inner = self.shared.lock();
        if inner.disposed {
            return;
        }
        inner.abort_timer();
        inner.input_generation += 1;
        inner.snapshot.query = query.clone();

        if query.trim().is_empty() {
            inner.cancel_active();
            inner.snapshot.status = SearchStatus::Idle;
            inner.snapshot.results.clear();
            debug!("search input cleared");
            self.shared.publish(&inner);
            return;
        }

        inner.snapshot.status = SearchStatus::Pending;
        let generation = inner.input_generation;
        let shared = Arc::clone(&self.shared);
        let api = Arc::clone(&self.api);
        let debounce = self.debounce;
        let request_timeout = self.request_timeout;
        inner.timer = Some(tokio::spawn(async move {
            tokio::time::sleep(debounce).await;
            dispatch(shared, api, generation, query, request_timeout).await;
        }));
        self.shared.publish(&inner);
    }

    /// Explicit confirm (Enter): go to the full results page right away.
    ///
    /// Independent of the debounce timer and any in-flight request.
    pub fn submit(&self) -> Option<SearchNavigation> {
        let inner = self.shared.lock();
        let query = inner.snapshot.query.trim();
        if query.is_empty() {
            return None;
        }
        Some(SearchNavigation {
            path: results_path(query),
        })
    }

    /// Abort the pending timer and cancel the in-flight request. Further
    /// input is ignored.
    pub fn dispose(&self) {
        let mut inner = self.shared.lock();
        if inner.disposed {
            return;
        }
        inner.disposed = true;
        inner.abort_timer();
        inner.cancel_active();
        debug!("search controller disposed");
    }
}

impl<A: ContentApi + 'static> Drop for SearchController<A> {
    fn drop(&mut self) {
        self.dispose();
    }
}

/// Timer fired: supersede the previous request and run a new one.
async fn dispatch<A: ContentApi + ?Sized>(
    shared: Arc<Shared>,
    api: Arc<A>,
    generation: u64,
    query: String,
    request_timeout: Option<Duration>,
) {
    let (request_id, token) = {
        let mut inner = shared.lock();
        if inner.disposed || inner.input_generation != generation {
            return;
        }
        // This task is the timer; it is no longer abortable as one.
        inner.timer = None;
        inner.cancel_active();
        inner.next_request_id += 1;
        let id = inner.next_request_id;
        let token = CancellationToken::new();
        inner.active = Some(ActiveRequest {
            id,
            token: token.clone(),
        });
        inner.snapshot.status = SearchStatus::Loading;
        shared.publish(&inner);
        (id, token)
    };
    debug!(request = request_id, query = %query, "search request issued");

    let outcome = tokio::select! {
        _ = token.cancelled() => {
            debug!(request = request_id, "search request superseded");
            return;
        }
        outcome = run_search(api.as_ref(), &query, request_timeout) => outcome,
    };

    let mut inner = shared.lock();
    let still_active = inner.active.as_ref().is_some_and(|a| a.id == request_id);
    if !still_active {
        debug!(request = request_id, "dropping stale search response");
        return;
    }
    inner.active = None;
    // Newer input is waiting on its timer: keep showing Pending.
    let pending = inner.timer.is_some();
    match outcome {
        Ok(results) => {
            info!(request = request_id, results = results.len(), "search completed");
            inner.snapshot.results = results;
            if !pending {
                inner.snapshot.status = SearchStatus::Success;
            }
        }
        Err(err) => {
            warn!(request = request_id, error = %err, "search failed");
            inner.snapshot.results.clear();
            if !pending {
                inner.snapshot.status = SearchStatus::Failed(err.to_string());
            }
        }
    }
    shared.publish(&inner);
}

async fn run_search<A: ContentApi + ?Sized>(
    api: &A,
    query: &str,
    request_timeout: Option<Duration>,
) -> Result<Vec<ResultItem>, ApiError> {
    match request_timeout {
        Some(limit) => tokio::time::timeout(limit, api.search(query))
            .await
            .unwrap_or_else(|_| Err(ApiError::Timeout(limit))),
        None => api.search(query).await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn results_path_encodes_query() {
        assert_eq!(results_path("  indian polity "), "/search?query=indian+polity");
        assert_eq!(results_path("gs-2 & ir"), "/search?query=gs-2+%26+ir");
    }

    #[test]
    fn default_snapshot_is_idle() {
        let snapshot = SearchSnapshot::default();
        assert_eq!(snapshot.status, SearchStatus::Idle);
        assert!(snapshot.results.is_empty());
    }

    #[test]
    fn status_serializes_with_message() {
        let json = serde_json::to_string(&SearchStatus::Failed("boom".into())).unwrap();
        assert_eq!(json, r#"{"status":"failed","message":"boom"}"#);
        let json = serde_json::to_string(&SearchStatus::Idle).unwrap();
        assert_eq!(json, r#"{"status":"idle"}"#);
    }
}
