//! Eviction subsystem.
//!
//! # Data Flow
//! ```text
//! HealthMonitor (threshold crossed)
//!     → request queue
//!     → executor.rs (delete via orchestrator.rs)
//!     → result queue
//!     → HealthMonitor reconciliation task
//! ```
//!
//! # Design Decisions
//! - The two queues are the only coupling between monitor and orchestrator
//! - Unbounded queues: the monitor enqueues while holding its lock and
//!   must never block there
//! - Every consumed request produces exactly one result

pub mod executor;
pub mod orchestrator;

use tokio::sync::mpsc;

use crate::health::types::{EvictionRequest, EvictionResult};

pub use executor::EvictionExecutor;
pub use orchestrator::{KubernetesClient, Orchestrator, OrchestratorError};

/// Queue ends held by the health monitor.
pub struct CoordinatorChannels {
    pub requests: mpsc::UnboundedSender<EvictionRequest>,
    pub results: mpsc::UnboundedReceiver<EvictionResult>,
}

/// Queue ends held by the eviction executor.
pub struct ExecutorChannels {
    pub requests: mpsc::UnboundedReceiver<EvictionRequest>,
    pub results: mpsc::UnboundedSender<EvictionResult>,
}

/// Create the request/result queue pair.
pub fn eviction_channels() -> (CoordinatorChannels, ExecutorChannels) {
    let (request_tx, request_rx) = mpsc::unbounded_channel();
    let (result_tx, result_rx) = mpsc::unbounded_channel();

    (
        CoordinatorChannels {
            requests: request_tx,
            results: result_rx,
        },
        ExecutorChannels {
            requests: request_rx,
            results: result_tx,
        },
    )
}
