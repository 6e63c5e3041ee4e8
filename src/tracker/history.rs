//! Chart-ready price history for one coin

use super::state::{FetchCell, Snapshot};
use crate::{
    client::MarketDataClient,
    types::{ChartData, TimeRange},
};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::sync::watch;
use tokio::task::JoinHandle;

pub type Chart = Option<Arc<ChartData>>;

struct HistoryFeed {
    client: Arc<MarketDataClient>,
    coin_id: String,
    range: Mutex<TimeRange>,
    cell: FetchCell<Chart>,
}

impl HistoryFeed {
    fn range(&self) -> MutexGuard<'_, TimeRange> {
        self.range.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn spawn_fetch(self: &Arc<Self>, range: TimeRange, show_loading: bool) -> JoinHandle<()> {
        let ticket = self.cell.begin(show_loading);
        let feed = self.clone();

        tokio::spawn(async move {
            let result = feed
                .client
                .fetch_historical_series(&feed.coin_id, range.days())
                .await
                .map(|series| Some(Arc::new(ChartData::new(series, range))));
            if !feed.cell.resolve(ticket, result) {
                tracing::debug!(
                    coin_id = %feed.coin_id,
                    range = range.label(),
                    "Discarded stale history result"
                );
            }
        })
    }
}

/// Tracks the historical series of a coin over a selectable range
pub struct HistoryTracker {
    feed: Arc<HistoryFeed>,
}

impl HistoryTracker {
    /// Starts fetching `coin_id` over `range`; must run inside a tokio runtime
    pub fn start(client: Arc<MarketDataClient>, coin_id: impl Into<String>, range: TimeRange) -> Self {
        let feed = Arc::new(HistoryFeed {
            client,
            coin_id: coin_id.into(),
            range: Mutex::new(range),
            cell: FetchCell::new(),
        });
        tracing::info!(coin_id = %feed.coin_id, range = range.label(), "Starting history tracker");

        {
            let range = feed.range();
            feed.spawn_fetch(*range, true);
        }

        Self { feed }
    }

    pub fn coin_id(&self) -> &str {
        &self.feed.coin_id
    }

    pub fn range(&self) -> TimeRange {
        *self.feed.range()
    }

    /// Switches the range and refetches with the loading state shown
    ///
    /// Selecting the current range does nothing.
    pub fn set_range(&self, range: TimeRange) {
        if !self.is_active() {
            return;
        }
        let mut current = self.feed.range();
        if *current == range {
            return;
        }
        *current = range;
        self.feed.spawn_fetch(range, true);
    }

    pub fn snapshot(&self) -> Snapshot<Chart> {
        self.feed.cell.snapshot()
    }

    pub fn subscribe(&self) -> watch::Receiver<Snapshot<Chart>> {
        self.feed.cell.subscribe()
    }

    pub async fn wait_settled(&self) -> Snapshot<Chart> {
        self.feed.cell.wait_settled().await
    }

    /// Refetches the current range without raising `loading`
    pub async fn refresh(&self) {
        if !self.is_active() {
            return;
        }
        let task = {
            let range = self.feed.range();
            self.feed.spawn_fetch(*range, false)
        };
        if let Err(e) = task.await {
            tracing::warn!(error = %e, "History refresh task failed");
        }
    }

    pub fn is_active(&self) -> bool {
        self.feed.cell.is_active()
    }

    pub fn stop(&self) {
        self.feed.cell.deactivate();
    }
}

impl Drop for HistoryTracker {
    fn drop(&mut self) {
        self.stop();
    }
}
