//! Background completion of deferred operations.

use osb_lifecycle::LifecycleManager;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info};

/// Spawn a task that completes in-progress operations older than `delay`.
///
/// Scans every `interval` until the returned handle is aborted.
pub fn spawn_completion_task(
    manager: Arc<LifecycleManager>,
    delay: Duration,
    interval: Duration,
) -> JoinHandle<()> {
    debug!(?delay, ?interval, "Starting completion task");
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        loop {
            ticker.tick().await;
            let completed = manager.complete_expired(delay);
            if !completed.is_empty() {
                info!(count = completed.len(), "Completed deferred operations");
            }
        }
    })
}
