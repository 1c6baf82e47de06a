//! The periodic idle sweep task.
//!
//! Runs on a fixed interval, independent of request traffic: each pass
//! asks the registry to reclaim rooms and users whose idle time exceeds
//! the configured thresholds. The sweep never blocks request handling —
//! it takes the registry lock only for map surgery, and talks to room
//! actors through their ordinary command channels.

use std::sync::Arc;

use tokio::task::JoinHandle;
use tokio::time::{self, MissedTickBehavior};

use crate::{Registry, RegistryConfig};

/// Spawns the background sweep loop.
///
/// The first pass runs one full interval after startup (there is nothing
/// to reclaim earlier). The task runs until aborted — typically it lives
/// for the whole process and is dropped at shutdown.
pub fn spawn_sweeper(registry: Arc<Registry>, config: &RegistryConfig) -> JoinHandle<()> {
    let room_timeout = config.room_idle_timeout;
    let user_timeout = config.user_idle_timeout;
    let period = config.sweep_interval;

    tokio::spawn(async move {
        let mut interval = time::interval_at(time::Instant::now() + period, period);
        // If a pass runs long, just resume the cadence — there is no
        // value in back-to-back sweeps.
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            interval.tick().await;
            tracing::debug!("running idle sweep");

            let (rooms, users) = registry.sweep(room_timeout, user_timeout).await;
            if rooms > 0 || users > 0 {
                tracing::info!(rooms, users, "idle sweep reclaimed entries");
            }
        }
    })
}
