// craftwatch-core/src/tasks/status_refresh.rs
//
// Owns the periodic refresh timer. One immediate full refresh on start,
// then one per interval. Each cycle is awaited before the next tick, so
// cycles never overlap: a cycle longer than the interval delays the next
// one instead of racing it.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio::time::interval;
use tracing::{error, info};

use crate::services::refresh::RefreshEngine;

pub struct RefreshScheduler {
    engine: Arc<RefreshEngine>,
    period: Duration,
    handle: Mutex<Option<JoinHandle<()>>>,
}

impl RefreshScheduler {
    pub fn new(engine: Arc<RefreshEngine>, period: Duration) -> Self {
        Self {
            engine,
            period,
            handle: Mutex::new(None),
        }
    }

    /// Start the refresh loop. Restarting replaces any previous loop.
    pub async fn start(&self) {
        let mut guard = self.handle.lock().await;
        if let Some(old) = guard.take() {
            old.abort();
        }

        let engine = self.engine.clone();
        let period = self.period;
        *guard = Some(tokio::spawn(async move {
            // Immediate pass at startup, then the periodic cadence.
            if let Err(e) = engine.refresh_all().await {
                error!("Initial refresh cycle failed: {}", e);
            }

            let mut ticker = interval(period);
            ticker.tick().await; // first tick fires immediately; already done above
            loop {
                ticker.tick().await;
                info!("Running auto-refresh...");
                if let Err(e) = engine.refresh_all().await {
                    error!("Refresh cycle failed: {}", e);
                }
            }
        }));
        info!("Refresh scheduler started (every {:?})", period);
    }

    pub async fn stop(&self) {
        let mut guard = self.handle.lock().await;
        if let Some(handle) = guard.take() {
            handle.abort();
            info!("Refresh scheduler stopped");
        }
    }
}
