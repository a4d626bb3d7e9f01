//! Heartbeat sidecar.
//!
//! # Data Flow
//! ```text
//! ticker (every interval)
//!     → probe.rs (write to volume, 2s timeout)
//!     → POST /podHealth (5s timeout)
//!
//! SIGTERM/SIGINT
//!     → stop ticker
//!     → DELETE /podHealth (1s timeout)
//! ```
//!
//! # Design Decisions
//! - Failed posts are logged and skipped; the next tick tries again
//! - First heartbeat is delayed by one interval plus jitter so that pods
//!   started together do not report in lockstep

use std::path::PathBuf;
use std::time::Duration;

use tokio::sync::broadcast;
use tokio::time::{self, Instant, MissedTickBehavior};

use crate::client::{ClientError, MonitorClient};
use crate::config::SidecarConfig;
use crate::health::types::PodIdentity;
use crate::probe::probe_volume;

const PROBE_TIMEOUT: Duration = Duration::from_secs(2);
const REPORT_TIMEOUT: Duration = Duration::from_secs(5);
const DEREGISTER_TIMEOUT: Duration = Duration::from_secs(1);

pub struct Sidecar {
    client: MonitorClient,
    identity: PodIdentity,
    probe_path: PathBuf,
    interval: Duration,
}

impl Sidecar {
    pub fn new(config: SidecarConfig) -> Result<Self, ClientError> {
        let client = MonitorClient::new(&config.monitor_url)?.with_timeout(REPORT_TIMEOUT);
        Ok(Self {
            client,
            identity: PodIdentity::new(config.pod_name, config.namespace),
            probe_path: PathBuf::from(config.probe_path),
            interval: config.interval,
        })
    }

    /// Probe once and report the result. Returns whether the probe passed.
    pub async fn beat(&self) -> bool {
        let is_healthy = probe_volume(&self.probe_path, PROBE_TIMEOUT).await;

        match self.client.report(&self.identity, is_healthy).await {
            Ok(outcome) => tracing::debug!(is_healthy, outcome = outcome.as_str(), "Posted health to monitor"),
            Err(e) => tracing::error!(error = %e, "Could not post health to monitor"),
        }
        is_healthy
    }

    /// Report on every tick until shutdown, then deregister.
    pub async fn run(self, mut shutdown: broadcast::Receiver<()>) {
        let jitter_ms = fastrand::u64(0..=self.interval.as_millis() as u64 / 10);
        let start = Instant::now() + self.interval + Duration::from_millis(jitter_ms);
        let mut ticker = time::interval_at(start, self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        tracing::info!(
            pod = %self.identity.name,
            namespace = %self.identity.namespace,
            interval_secs = self.interval.as_secs(),
            monitor = %self.client.endpoint(),
            "Heartbeat sidecar starting"
        );

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    self.beat().await;
                }
                _ = shutdown.recv() => {
                    tracing::info!("Container will be terminated");
                    break;
                }
            }
        }

        self.deregister().await;
    }

    async fn deregister(&self) {
        let client = self.client.with_timeout(DEREGISTER_TIMEOUT);
        match client.remove(&self.identity).await {
            Ok(outcome) => tracing::info!(outcome = ?outcome, "Deregistered from monitor"),
            Err(e) => tracing::error!(error = %e, "Could not delete health from monitor"),
        }
    }
}
