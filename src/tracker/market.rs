//! Live market list with optional auto-refresh

use super::state::{FetchCell, Snapshot};
use crate::{
    client::MarketDataClient,
    constants::{DEFAULT_CRYPTO_IDS, DEFAULT_PER_PAGE, REFRESH_INTERVAL_MS},
    error::ProviderError,
    poller::{PeriodicTask, PollHandle},
    types::MarketAsset,
};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;

/// Which rows the tracker asks for
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListMode {
    /// Top assets by market cap, paged by `limit` and `page`
    Ranked,
    /// Exactly these ids, in provider order
    Ids(Vec<String>),
}

impl Default for ListMode {
    fn default() -> Self {
        ListMode::Ids(DEFAULT_CRYPTO_IDS.iter().map(|id| id.to_string()).collect())
    }
}

/// Market tracker configuration
#[derive(Debug, Clone)]
pub struct MarketTrackerConfig {
    pub limit: u32,
    pub page: u32,
    pub auto_refresh: bool,
    pub refresh_interval: Duration,
    pub mode: ListMode,
}

impl Default for MarketTrackerConfig {
    fn default() -> Self {
        Self {
            limit: DEFAULT_PER_PAGE,
            page: 1,
            auto_refresh: true,
            refresh_interval: Duration::from_millis(REFRESH_INTERVAL_MS),
            mode: ListMode::default(),
        }
    }
}

pub type MarketList = Arc<Vec<MarketAsset>>;

struct MarketFeed {
    client: Arc<MarketDataClient>,
    config: MarketTrackerConfig,
    cell: FetchCell<MarketList>,
}

impl MarketFeed {
    async fn load(&self) -> Result<MarketList, ProviderError> {
        let assets = match &self.config.mode {
            ListMode::Ranked => {
                self.client
                    .fetch_market_list(self.config.limit, self.config.page)
                    .await?
            }
            ListMode::Ids(ids) => self.client.fetch_market_by_ids(ids).await?,
        };
        Ok(Arc::new(assets))
    }

    fn spawn_fetch(self: &Arc<Self>, show_loading: bool) -> JoinHandle<()> {
        let ticket = self.cell.begin(show_loading);
        let feed = self.clone();

        tokio::spawn(async move {
            let result = feed.load().await;
            let count = result.as_ref().map(|list| list.len()).ok();
            if feed.cell.resolve(ticket, result) {
                tracing::debug!(seq = ticket.seq(), count = ?count, "Market list updated");
            } else {
                tracing::debug!(seq = ticket.seq(), "Discarded stale market list result");
            }
        })
    }
}

/// Keeps a market list fresh for one consumer
///
/// The first fetch starts immediately and shows the loading state; timer and
/// manual refreshes are silent. Dropping the tracker stops it.
///
/// # Example
/// ```no_run
/// use crypto_tracker_sdk::{ClientConfig, MarketDataClient, MarketTracker, MarketTrackerConfig};
/// use std::sync::Arc;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let client = Arc::new(MarketDataClient::new(&ClientConfig::from_env())?);
/// let tracker = MarketTracker::start(client, MarketTrackerConfig::default());
/// let snapshot = tracker.wait_settled().await;
/// println!("{} assets", snapshot.data.len());
/// # Ok(())
/// # }
/// ```
pub struct MarketTracker {
    feed: Arc<MarketFeed>,
    poll: Mutex<Option<PollHandle>>,
}

impl MarketTracker {
    /// Starts tracking; must be called from within a tokio runtime
    pub fn start(client: Arc<MarketDataClient>, config: MarketTrackerConfig) -> Self {
        tracing::info!(
            mode = ?config.mode,
            auto_refresh = config.auto_refresh,
            refresh_interval_ms = config.refresh_interval.as_millis() as u64,
            "Starting market tracker"
        );

        let feed = Arc::new(MarketFeed {
            client,
            config,
            cell: FetchCell::new(),
        });
        feed.spawn_fetch(true);

        let poll = if feed.config.auto_refresh {
            let timer_feed = feed.clone();
            Some(PeriodicTask::start(feed.config.refresh_interval, move || {
                timer_feed.spawn_fetch(false);
            }))
        } else {
            None
        };

        Self {
            feed,
            poll: Mutex::new(poll),
        }
    }

    pub fn config(&self) -> &MarketTrackerConfig {
        &self.feed.config
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

    /// Refetches without raising `loading` and waits for the result
    pub async fn refresh(&self) {
        if !self.is_active() {
            return;
        }
        if let Err(e) = self.feed.spawn_fetch(false).await {
            tracing::warn!(error = %e, "Market list refresh task failed");
        }
    }

    pub fn is_active(&self) -> bool {
        self.feed.cell.is_active()
    }

    /// Cancels the timer and ignores every result still in flight
    pub fn stop(&self) {
        self.feed.cell.deactivate();
        let poll = self
            .poll
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if let Some(poll) = poll {
            poll.cancel();
            tracing::debug!("Market tracker stopped");
        }
    }
}

impl Drop for MarketTracker {
    fn drop(&mut self) {
        self.stop();
    }
}
