//! Fetch lifecycle shared by every tracker
//!
//! A [`FetchCell`] owns the published [`Snapshot`] and hands out a
//! [`FetchTicket`] per fetch. Only the most recently issued ticket may
//! resolve the cell, so a slow, superseded request can never overwrite a
//! newer result. After [`FetchCell::deactivate`] every resolution is a no-op.

use crate::error::{DisplayError, ProviderError};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use tokio::sync::watch;

/// Where a tracker is in its request lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    /// Nothing requested yet
    Idle,
    /// A visible fetch is in flight
    Loading,
    /// Last fetch succeeded
    Success,
    /// Last fetch failed
    Failed,
}

/// Read-only view handed to the presentation layer
///
/// `data` always holds the result of the last successful fetch; a failure
/// only sets `error`. Silent refreshes leave the snapshot untouched until
/// they resolve, so `loading` is only ever raised by visible fetches.
#[derive(Debug, Clone, Serialize)]
pub struct Snapshot<T> {
    pub data: T,
    pub phase: Phase,
    pub loading: bool,
    pub error: Option<DisplayError>,
    /// Wall-clock time of the last successful fetch
    pub last_updated: Option<DateTime<Utc>>,
}

impl<T: Default> Default for Snapshot<T> {
    fn default() -> Self {
        Self {
            data: T::default(),
            phase: Phase::Idle,
            loading: false,
            error: None,
            last_updated: None,
        }
    }
}

/// Proof that a fetch was issued; required to resolve the cell
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchTicket {
    seq: u64,
    visible: bool,
}

impl FetchTicket {
    pub fn seq(&self) -> u64 {
        self.seq
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }
}

/// Snapshot holder with a request-generation guard
pub struct FetchCell<T> {
    tx: watch::Sender<Snapshot<T>>,
    issued: AtomicU64,
    active: AtomicBool,
}

impl<T> FetchCell<T>
where
    T: Clone + Default + Send + Sync,
{
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(Snapshot::default());
        Self {
            tx,
            issued: AtomicU64::new(0),
            active: AtomicBool::new(true),
        }
    }

    /// Issues a ticket for a new fetch, superseding every earlier one
    ///
    /// A visible fetch raises `loading` and clears the previous error;
    /// a silent one publishes nothing.
    pub fn begin(&self, show_loading: bool) -> FetchTicket {
        let seq = self.issued.fetch_add(1, Ordering::SeqCst) + 1;
        if show_loading {
            self.tx.send_modify(|s| {
                s.phase = Phase::Loading;
                s.loading = true;
                s.error = None;
            });
        }
        FetchTicket {
            seq,
            visible: show_loading,
        }
    }

    /// Applies a fetch outcome if the ticket is still current
    ///
    /// Returns false when the result was discarded because a newer fetch
    /// was issued or the cell was deactivated.
    pub fn resolve(&self, ticket: FetchTicket, result: Result<T, ProviderError>) -> bool {
        self.tx.send_if_modified(|s| {
            if !self.active.load(Ordering::SeqCst)
                || ticket.seq != self.issued.load(Ordering::SeqCst)
            {
                return false;
            }

            match result {
                Ok(data) => {
                    s.data = data;
                    s.phase = Phase::Success;
                    s.error = None;
                    s.last_updated = Some(Utc::now());
                }
                Err(e) => {
                    s.phase = Phase::Failed;
                    s.error = Some(e.to_display());
                }
            }
            s.loading = false;
            true
        })
    }

    /// Stops accepting resolutions
    pub fn deactivate(&self) {
        self.active.store(false, Ordering::SeqCst);
    }

    pub fn is_active(&self) -> bool {
        self.active.load(Ordering::SeqCst)
    }

    pub fn snapshot(&self) -> Snapshot<T> {
        self.tx.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<Snapshot<T>> {
        self.tx.subscribe()
    }

    /// Waits until the cell reaches `Success` or `Failed`
    pub async fn wait_settled(&self) -> Snapshot<T> {
        let mut rx = self.tx.subscribe();
        let settled = rx
            .wait_for(|s| matches!(s.phase, Phase::Success | Phase::Failed))
            .await
            .map(|s| s.clone());
        match settled {
            Ok(snapshot) => snapshot,
            Err(_) => self.snapshot(),
        }
    }
}

impl<T> Default for FetchCell<T>
where
    T: Clone + Default + Send + Sync,
{
    fn default() -> Self {
        Self::new()
    }
}
