// src/tasks/reconcile_ticker.rs

use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

use crate::eventbus::WorkQueue;

/// Spawns a background task that asks the engine for a reconciliation pass every
/// `interval`. The pass itself runs on the engine; a tick that is still waiting in the
/// queue absorbs later ones.
pub fn spawn_reconcile_ticker(queue: WorkQueue, interval: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut shutdown_rx = queue.shutdown_rx.clone();
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // The first tick fires immediately; startup already ran the initialization pass.
        ticker.tick().await;
        info!("Reconcile ticker started (every {:?})", interval);

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    match queue.request_tick().await {
                        Ok(true) => {}
                        Ok(false) => debug!("Previous reconcile still pending => tick skipped"),
                        Err(e) => {
                            warn!("Reconcile ticker stopping: {:?}", e);
                            break;
                        }
                    }
                }
                Ok(_) = shutdown_rx.changed() => {
                    if *shutdown_rx.borrow() {
                        info!("Reconcile ticker received shutdown");
                        break;
                    }
                }
            }
        }
    })
}
