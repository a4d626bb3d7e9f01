//! Periodic removal of deleted pod records.
//!
//! Without a reaper, a record stays in the map until the sidecar's final
//! deregistration removes it. Pods killed by eviction never send one.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::broadcast;
use tokio::time;

use crate::health::monitor::HealthMonitor;

pub struct Reaper {
    monitor: Arc<HealthMonitor>,
    retention: Duration,
}

impl Reaper {
    /// Reap `Deleted` records once `retention` has passed since their last heartbeat.
    pub fn new(monitor: Arc<HealthMonitor>, retention: Duration) -> Self {
        Self { monitor, retention }
    }

    /// How often the map is scanned.
    pub fn period(&self) -> Duration {
        (self.retention / 2).max(Duration::from_secs(1))
    }

    pub async fn run(self, mut shutdown: broadcast::Receiver<()>) {
        tracing::info!(retention_secs = self.retention.as_secs(), "Record reaper starting");

        let mut ticker = time::interval(self.period());
        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    let reaped = self.monitor.reap_deleted(self.retention);
                    if reaped > 0 {
                        tracing::info!(reaped, "Reaped deleted pod records");
                    }
                }
                _ = shutdown.recv() => {
                    tracing::info!("Record reaper received shutdown signal, exiting loop");
                    break;
                }
            }
        }
    }
}
