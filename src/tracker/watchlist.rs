//! Market data for the persisted watchlist
//!
//! Every add or remove persists the new id set, then refetches market rows
//! for it. The ticket for that refetch is issued while the watchlist lock is
//! held, so results always follow mutation order.

use super::{
    market::MarketList,
    state::{FetchCell, FetchTicket, Snapshot},
};
use crate::{
    client::MarketDataClient, error::StorageError, store::KeyValueStore, watchlist::Watchlist,
};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::sync::watch;
use tokio::task::JoinHandle;

struct WatchlistFeed {
    client: Arc<MarketDataClient>,
    watchlist: Mutex<Watchlist>,
    cell: FetchCell<MarketList>,
}

/// Fetch prepared under the watchlist lock
struct PendingFetch {
    ticket: FetchTicket,
    ids: Vec<String>,
}

impl WatchlistFeed {
    fn watchlist(&self) -> MutexGuard<'_, Watchlist> {
        self.watchlist.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Issues a ticket for the id set currently held by `watchlist`
    ///
    /// An empty set never shows loading since it resolves without I/O.
    fn prepare(&self, watchlist: &Watchlist, show_loading: bool) -> PendingFetch {
        let ids = watchlist.ids().to_vec();
        let ticket = self.cell.begin(show_loading && !ids.is_empty());
        PendingFetch { ticket, ids }
    }

    fn dispatch(self: &Arc<Self>, pending: PendingFetch) -> Option<JoinHandle<()>> {
        let PendingFetch { ticket, ids } = pending;

        if ids.is_empty() {
            self.cell.resolve(ticket, Ok(Arc::new(Vec::new())));
            return None;
        }

        let feed = self.clone();
        Some(tokio::spawn(async move {
            let result = feed.client.fetch_market_by_ids(&ids).await.map(Arc::new);
            if !feed.cell.resolve(ticket, result) {
                tracing::debug!(seq = ticket.seq(), "Discarded stale watchlist result");
            }
        }))
    }
}

/// Tracks market rows for the ids in the user's watchlist
///
/// Dropping the tracker stops it; results still in flight are ignored.
pub struct WatchlistTracker {
    feed: Arc<WatchlistFeed>,
}

impl WatchlistTracker {
    /// Loads the saved watchlist and fetches its rows
    ///
    /// Must be called from within a tokio runtime.
    pub fn start(client: Arc<MarketDataClient>, storage: Arc<dyn KeyValueStore>) -> Self {
        let watchlist = Watchlist::load(storage);
        tracing::info!(count = watchlist.len(), "Starting watchlist tracker");

        let feed = Arc::new(WatchlistFeed {
            client,
            watchlist: Mutex::new(watchlist),
            cell: FetchCell::new(),
        });

        let pending = {
            let watchlist = feed.watchlist();
            feed.prepare(&watchlist, true)
        };
        feed.dispatch(pending);

        Self { feed }
    }

    pub fn ids(&self) -> Vec<String> {
        self.feed.watchlist().ids().to_vec()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.feed.watchlist().contains(id)
    }

    /// Adds `id` and refetches when the set changed
    ///
    /// Returns whether the set changed. A storage error is returned after
    /// the in-memory set and the refetch have already been updated.
    pub fn add(&self, id: &str) -> Result<bool, StorageError> {
        self.mutate(|watchlist| watchlist.add(id), "add")
    }

    /// Removes `id` and refetches when the set changed
    pub fn remove(&self, id: &str) -> Result<bool, StorageError> {
        self.mutate(|watchlist| watchlist.remove(id), "remove")
    }

    fn mutate<F>(&self, op: F, action: &'static str) -> Result<bool, StorageError>
    where
        F: FnOnce(&mut Watchlist) -> Result<bool, StorageError>,
    {
        if !self.is_active() {
            return Ok(false);
        }

        let (pending, outcome) = {
            let mut watchlist = self.feed.watchlist();
            let before = watchlist.len();
            let outcome = op(&mut *watchlist);
            if watchlist.len() == before {
                return outcome;
            }
            (self.feed.prepare(&watchlist, true), outcome)
        };

        if let Err(e) = &outcome {
            tracing::warn!(action, error = %e, "Failed to persist watchlist");
        }
        tracing::debug!(action, count = pending.ids.len(), "Watchlist changed");
        self.feed.dispatch(pending);

        outcome
    }

    pub fn snapshot(&self) -> Snapshot<MarketList> {
        self.feed.cell.snapshot()
    }

    pub fn subscribe(&self) -> watch::Receiver<Snapshot<MarketList>> {
        self.feed.cell.subscribe()
    }

    /// Waits for the current visible fetch to finish
    pub async fn wait_settled(&self) -> Snapshot<MarketList> {
        self.feed.cell.wait_settled().await
    }

    /// Refetches the current set without raising `loading`
    pub async fn refresh(&self) {
        if !self.is_active() {
            return;
        }
        let pending = {
            let watchlist = self.feed.watchlist();
            self.feed.prepare(&watchlist, false)
        };
        if let Some(task) = self.feed.dispatch(pending) {
            if let Err(e) = task.await {
                tracing::warn!(error = %e, "Watchlist refresh task failed");
            }
        }
    }

    pub fn is_active(&self) -> bool {
        self.feed.cell.is_active()
    }

    /// Ignores every result still in flight and rejects further changes
    pub fn stop(&self) {
        self.feed.cell.deactivate();
    }
}

impl Drop for WatchlistTracker {
    fn drop(&mut self) {
        self.stop();
    }
}
