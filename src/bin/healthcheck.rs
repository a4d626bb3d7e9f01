//! Heartbeat sidecar: probes the pod's volume and reports to the monitor.

use pod_monitor::config::{ObservabilityConfig, SidecarConfig};
use pod_monitor::lifecycle::{wait_for_signal, Shutdown};
use pod_monitor::observability::logging;
use pod_monitor::sidecar::Sidecar;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    logging::init(&ObservabilityConfig::default());

    let config = SidecarConfig::from_env(|var| std::env::var(var).ok())?;
    let sidecar = Sidecar::new(config)?;

    let shutdown = Shutdown::new();
    let task = tokio::spawn(sidecar.run(shutdown.subscribe()));

    wait_for_signal().await;
    shutdown.trigger();
    task.await?;

    Ok(())
}
