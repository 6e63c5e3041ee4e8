//! # Crypto Tracker SDK
//!
//! Data layer for a cryptocurrency price tracker backed by the public
//! CoinGecko API: market lists, per-id rows, historical series, coin
//! details, search and trending coins.
//!
//! ## Layers
//!
//! - [`MarketDataClient`]: typed requests behind a 60 second response cache
//!   and a [`ProviderError`] taxonomy classified into [`ErrorKind`]
//! - Trackers ([`MarketTracker`], [`WatchlistTracker`], [`HistoryTracker`]):
//!   publish loading, error and data snapshots with silent background refresh
//! - [`Watchlist`] and [`Theme`]: user state persisted through a
//!   [`KeyValueStore`]
//! - [`format`]: display helpers for prices, large numbers and dates
//!
//! ## Usage
//!
//! ```no_run
//! use crypto_tracker_sdk::{
//!     format::{format_percentage, format_price},
//!     ClientConfig, MarketDataClient, MarketTracker, MarketTrackerConfig,
//! };
//! use std::sync::Arc;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = Arc::new(MarketDataClient::new(&ClientConfig::from_env())?);
//! let tracker = MarketTracker::start(client, MarketTrackerConfig::default());
//!
//! let snapshot = tracker.wait_settled().await;
//! if let Some(error) = &snapshot.error {
//!     eprintln!("{}", error);
//! }
//! for asset in snapshot.data.iter() {
//!     println!(
//!         "{:<8} {:>14} {:>8}",
//!         asset.display_symbol(),
//!         format_price(asset.current_price),
//!         format_percentage(asset.price_change_percentage_24h)
//!     );
//! }
//! # Ok(())
//! # }
//! ```

pub mod cache;
pub mod client;
pub mod config;
pub mod constants;
pub mod error;
pub mod format;
pub mod metrics;
pub mod poller;
pub mod provider;
pub mod providers;
pub mod store;
pub mod theme;
pub mod tracker;
pub mod types;
pub mod watchlist;

// Re-export commonly used types
pub use cache::{CacheKey, CacheStats, ResponseCache};
pub use client::MarketDataClient;
pub use config::ClientConfig;
pub use error::{DisplayError, ErrorKind, ProviderError, Severity, StorageError};
pub use metrics::ClientMetrics;
pub use poller::{PeriodicTask, PollHandle};
pub use store::{FileStore, KeyValueStore, MemoryStore};
pub use theme::Theme;
pub use tracker::{
    HistoryTracker, ListMode, MarketTracker, MarketTrackerConfig, Phase, Snapshot,
    WatchlistTracker,
};
pub use types::{
    ChartData, CoinDetail, HistoricalSeries, MarketAsset, SearchCoin, TimeRange, TrendingCoin,
};
pub use watchlist::Watchlist;
