//! Background Expiry Sweeper
//!
//! This module runs the eager half of expiry: a tokio task that wakes on a
//! fixed interval and calls [`UrlStore::sweep`]. Lazy eviction in
//! [`UrlStore::get`] only reclaims aliases somebody asks for again; the
//! sweeper reclaims the rest.
//!
//! ## Lifecycle
//!
//! 1. [`ExpirySweeper::start`] spawns the loop on the current runtime.
//!    The first sweep runs immediately, then once per interval.
//! 2. [`ExpirySweeper::stop`] (or dropping the handle) signals the loop.
//! 3. [`ExpirySweeper::shutdown`] signals and waits for the task to exit.

use crate::error::SweeperError;
use crate::storage::UrlStore;
use std::sync::Arc;
use std::time::Duration;
use tokio::runtime::Handle;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, trace, warn};

/// Default interval between sweeps.
pub const DEFAULT_SWEEP_INTERVAL: Duration = Duration::from_secs(1);

/// A handle to the running expiry sweeper.
///
/// When this handle is dropped, the sweeper task will be stopped.
#[derive(Debug)]
pub struct ExpirySweeper {
    /// Sender to signal shutdown
    shutdown_tx: watch::Sender<bool>,

    /// The spawned loop, taken by `shutdown`
    task: Option<JoinHandle<()>>,

    interval: Duration,
}

impl ExpirySweeper {
    /// Starts the expiry sweeper as a background task.
    ///
    /// # Errors
    ///
    /// Returns [`SweeperError::NoRuntime`] when called outside a tokio
    /// runtime. There is nowhere to run the loop, and silently not sweeping
    /// would leak every expired mapping nobody looks up again.
    /// Returns [`SweeperError::ZeroInterval`] for a zero `interval`.
    ///
    /// # Example
    ///
    /// ```
    /// use quicklink::storage::{ExpirySweeper, UrlStore};
    /// use std::sync::Arc;
    /// use std::time::Duration;
    ///
    /// # #[tokio::main]
    /// # async fn main() -> Result<(), quicklink::SweeperError> {
    /// let store = Arc::new(UrlStore::new());
    /// let sweeper = ExpirySweeper::start(Arc::clone(&store), Duration::from_millis(100))?;
    ///
    /// // Sweeper runs in the background...
    ///
    /// sweeper.shutdown().await;
    /// # Ok(())
    /// # }
    /// ```
    pub fn start(store: Arc<UrlStore>, interval: Duration) -> Result<Self, SweeperError> {
        if interval.is_zero() {
            return Err(SweeperError::ZeroInterval);
        }
        let runtime = Handle::try_current().map_err(|_| SweeperError::NoRuntime)?;
        let (shutdown_tx, shutdown_rx) = watch::channel(false);

        let task = runtime.spawn(sweeper_loop(store, interval, shutdown_rx));

        info!(
            interval_ms = interval.as_millis() as u64,
            "Background expiry sweeper started"
        );

        Ok(Self {
            shutdown_tx,
            task: Some(task),
            interval,
        })
    }

    /// Returns the interval between sweeps.
    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Returns true while the sweeper task is still running.
    pub fn is_running(&self) -> bool {
        self.task.as_ref().is_some_and(|task| !task.is_finished())
    }

    /// Signals the sweeper to stop without waiting for it.
    ///
    /// This is called automatically when the handle is dropped.
    pub fn stop(&self) {
        // send_replace never fails, even once the loop has exited
        if !self.shutdown_tx.send_replace(true) {
            info!("Background expiry sweeper stopped");
        }
    }

    /// Stops the sweeper and waits until its task has exited.
    pub async fn shutdown(mut self) {
        self.stop();
        if let Some(task) = self.task.take() {
            if let Err(e) = task.await {
                warn!(error = %e, "Expiry sweeper task ended abnormally");
            }
        }
    }
}

impl Drop for ExpirySweeper {
    fn drop(&mut self) {
        self.stop();
    }
}

/// The main sweeper loop.
async fn sweeper_loop(
    store: Arc<UrlStore>,
    interval: Duration,
    mut shutdown_rx: watch::Receiver<bool>,
) {
    let mut ticker = tokio::time::interval(interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        // Wait for the next tick or shutdown signal
        tokio::select! {
            _ = ticker.tick() => {}
            result = shutdown_rx.changed() => {
                if result.is_err() || *shutdown_rx.borrow() {
                    debug!("Expiry sweeper received shutdown signal");
                    return;
                }
                continue;
            }
        }

        let expired = store.sweep_expired();
        if expired > 0 {
            debug!(expired, "Expired mappings cleaned up");
        } else {
            trace!("Sweep found nothing to remove");
        }
    }
}
