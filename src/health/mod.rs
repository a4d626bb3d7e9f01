//! Pod health tracking subsystem.
//!
//! # Data Flow
//! ```text
//! Heartbeat (HTTP layer)
//!     → monitor.rs: update record under the map lock
//!     → threshold crossed? → eviction request queue
//!
//! Eviction result queue
//!     → monitor.rs reconciliation task → record marked Deleted/DeleteFailed
//!
//! Reaper (reaper.rs, optional):
//!     Periodic timer → drop old Deleted records
//! ```
//!
//! # Design Decisions
//! - Only consecutive unhealthy reports count; there is no staleness timeout
//! - Failed evictions are not retried; the next heartbeat re-arms them
//! - Nothing is persisted across restarts

pub mod monitor;
pub mod reaper;
pub mod types;

pub use monitor::HealthMonitor;
pub use reaper::Reaper;
pub use types::{
    EvictionRequest, EvictionResult, HealthRecord, HeartbeatOutcome, LifecycleState, PodHealth,
    PodIdentity, RemoveOutcome,
};
