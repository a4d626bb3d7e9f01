//! Pod health monitor service.
//!
//! # Architecture Overview
//!
//! ```text
//!   Sidecar heartbeats        ┌──────────────────────────────────────────────┐
//!   ──────────────────────────┼─▶ http ──▶ HealthMonitor ── request queue ──┐ │
//!                             │               ▲                            │ │
//!                             │               │                            ▼ │
//!                             │     reconciliation task          EvictionExecutor
//!                             │               ▲                            │ │
//!                             │               └──── result queue ◀─────────┤ │
//!                             └────────────────────────────────────────────┼─┘
//!                                                                          ▼
//!                                                               Kubernetes API
//!                                                               (DELETE pod)
//! ```

use std::net::SocketAddr;
use std::num::NonZeroU32;
use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use tokio::net::TcpListener;

use pod_monitor::config::load_config;
use pod_monitor::eviction::{eviction_channels, EvictionExecutor, KubernetesClient};
use pod_monitor::health::{HealthMonitor, Reaper};
use pod_monitor::http::HttpServer;
use pod_monitor::lifecycle::{wait_for_signal, Shutdown};
use pod_monitor::observability::{logging, metrics};

#[derive(Parser)]
#[command(name = "pod-monitor")]
#[command(about = "Tracks pod heartbeats and evicts pods that stay unhealthy", long_about = None)]
struct Args {
    /// TOML configuration file. Defaults apply when omitted.
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    let config = load_config(args.config.as_deref())?;

    logging::init(&config.observability);
    tracing::info!("pod-monitor v{} starting", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        bind_address = %config.listener.bind_address,
        error_threshold = ?config.health.error_threshold,
        reap_after_secs = ?config.health.reap_after_secs,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        let addr: SocketAddr = config.observability.metrics_address.parse()?;
        metrics::init_metrics(addr)?;
    }

    let threshold = config
        .health
        .error_threshold
        .and_then(NonZeroU32::new)
        .ok_or("health.error_threshold must be set and greater than zero")?;
    let orchestrator = KubernetesClient::in_cluster(&config.orchestrator)?;

    let shutdown = Shutdown::new();
    let (coordinator, executor_channels) = eviction_channels();
    let monitor = HealthMonitor::new(threshold, coordinator.requests, coordinator.results);

    let executor = EvictionExecutor::new(
        orchestrator,
        executor_channels,
        Duration::from_secs(config.orchestrator.request_timeout_secs),
    );
    let executor_task = tokio::spawn(executor.run(shutdown.subscribe()));

    if let Some(secs) = config.health.reap_after_secs {
        let reaper = Reaper::new(monitor.clone(), Duration::from_secs(secs));
        tokio::spawn(reaper.run(shutdown.subscribe()));
    }

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    let server = HttpServer::new(&config.timeouts, monitor);
    let server_task = tokio::spawn(server.run(listener, shutdown.subscribe()));

    let signal_shutdown = shutdown.clone();
    tokio::spawn(async move {
        wait_for_signal().await;
        signal_shutdown.trigger();
    });

    server_task.await??;
    shutdown.trigger();
    executor_task.await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
