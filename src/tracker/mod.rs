//! Stateful trackers that keep market data fresh for a consumer
//!
//! Each tracker owns a [`FetchCell`] and publishes [`Snapshot`]s through a
//! `tokio::sync::watch` channel:
//!
//! - [`MarketTracker`]: ranked list or fixed ids, with optional auto-refresh
//! - [`WatchlistTracker`]: rows for the persisted watchlist
//! - [`HistoryTracker`]: chart data for one coin and time range
//!
//! Fetches run on spawned tasks, so stopping a tracker never cuts a request
//! short; its result is simply ignored.

pub mod history;
pub mod market;
pub mod state;
pub mod watchlist;

pub use history::{Chart, HistoryTracker};
pub use market::{ListMode, MarketList, MarketTracker, MarketTrackerConfig};
pub use state::{FetchCell, FetchTicket, Phase, Snapshot};
pub use watchlist::WatchlistTracker;
