//! Periodic background removal of expired entries.

use std::sync::{Arc, Weak};
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::debug;

use crate::cache::TtlCache;

/// Handle to a background task that calls
/// [`TtlCache::cleanup_expired`] on a fixed interval.
///
/// The task holds only a weak reference, so it ends on its own once the
/// cache is dropped. Dropping the handle aborts it.
#[derive(Debug)]
pub struct Sweeper {
    handle: JoinHandle<()>,
}

impl Sweeper {
    /// Spawns the sweep on the current Tokio runtime.
    ///
    /// Returns `None` for a zero interval, which disables sweeping.
    pub fn spawn<V>(cache: &Arc<TtlCache<V>>, interval: Duration) -> Option<Self>
    where
        V: Clone + Send + Sync + 'static,
    {
        if interval.is_zero() {
            return None;
        }

        let cache: Weak<TtlCache<V>> = Arc::downgrade(cache);
        let handle = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            // First tick completes immediately
            ticker.tick().await;

            loop {
                ticker.tick().await;
                let Some(cache) = cache.upgrade() else {
                    debug!("Cache dropped, stopping sweeper");
                    break;
                };
                cache.cleanup_expired();
            }
        });

        debug!(interval_secs = interval.as_secs(), "Cache sweeper started");
        Some(Self { handle })
    }

    /// Returns true once the task has exited.
    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }
}

impl Drop for Sweeper {
    fn drop(&mut self) {
        self.handle.abort();
    }
}
