//! Cancellable periodic task used for auto-refresh
//!
//! The callback is synchronous: it should only kick off work (typically by
//! spawning a fetch), so cancelling the timer never cuts a request short.

use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};

/// Entry point for periodic tasks
pub struct PeriodicTask;

impl PeriodicTask {
    /// Invokes `callback` every `period`, first after one full period
    ///
    /// Must be called from within a tokio runtime. Ticks missed while the
    /// runtime was busy are delayed, not replayed in a burst.
    pub fn start<F>(period: Duration, mut callback: F) -> PollHandle
    where
        F: FnMut() + Send + 'static,
    {
        let cancelled = Arc::new(Mutex::new(false));
        let flag = cancelled.clone();

        let task = tokio::spawn(async move {
            let mut ticker = interval_at(Instant::now() + period, period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                ticker.tick().await;
                {
                    let stopped = flag.lock().unwrap_or_else(PoisonError::into_inner);
                    if *stopped {
                        break;
                    }
                    // Invoked under the lock so `cancel` cannot return mid-call
                    callback();
                }
            }
        });

        PollHandle { cancelled, task }
    }
}

/// Handle to a running periodic task; dropping it cancels the task
pub struct PollHandle {
    cancelled: Arc<Mutex<bool>>,
    task: JoinHandle<()>,
}

impl PollHandle {
    /// Stops the task. No callback starts after this returns.
    pub fn cancel(&self) {
        *self.cancelled.lock().unwrap_or_else(PoisonError::into_inner) = true;
        self.task.abort();
    }

    pub fn is_cancelled(&self) -> bool {
        *self.cancelled.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Drop for PollHandle {
    fn drop(&mut self) {
        self.cancel();
    }
}
