//! Pod identity and health record types.
//!
//! # States
//! - Active: heartbeats are applied, threshold logic armed
//! - DeletePending: eviction requested, waiting for the executor
//! - Deleted: orchestrator confirmed the pod is gone
//! - DeleteFailed: eviction failed, next heartbeat re-arms
//!
//! # State Transitions
//! ```text
//! Active → DeletePending:       error_count >= threshold
//! DeletePending → Deleted:      eviction result success
//! DeletePending → DeleteFailed: eviction result failure
//! DeleteFailed → Active:        healthy heartbeat
//! DeleteFailed → DeletePending: unhealthy heartbeat, still over threshold
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::SystemTime;

/// Identity of a tracked pod: name plus namespace.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PodIdentity {
    pub name: String,
    pub namespace: String,
}

impl PodIdentity {
    pub fn new(name: impl Into<String>, namespace: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            namespace: namespace.into(),
        }
    }
}

impl fmt::Display for PodIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.namespace, self.name)
    }
}

/// Lifecycle of a tracked pod with respect to eviction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LifecycleState {
    Active,
    DeletePending,
    Deleted,
    DeleteFailed,
}

impl LifecycleState {
    /// Heartbeats for pods in these states are rejected.
    pub fn rejects_heartbeats(self) -> bool {
        matches!(self, LifecycleState::DeletePending | LifecycleState::Deleted)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            LifecycleState::Active => "active",
            LifecycleState::DeletePending => "delete_pending",
            LifecycleState::Deleted => "deleted",
            LifecycleState::DeleteFailed => "delete_failed",
        }
    }
}

/// Health record kept for each tracked pod.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HealthRecord {
    /// Consecutive unhealthy heartbeats.
    pub error_count: u32,
    /// Time of the most recent accepted heartbeat.
    pub last_seen: SystemTime,
    pub state: LifecycleState,
}

impl HealthRecord {
    /// Record for a pod seen for the first time.
    pub fn first_seen(is_healthy: bool) -> Self {
        Self {
            error_count: if is_healthy { 0 } else { 1 },
            last_seen: SystemTime::now(),
            state: LifecycleState::Active,
        }
    }
}

/// Request to evict a pod, sent once per threshold crossing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EvictionRequest {
    pub identity: PodIdentity,
}

/// Outcome of an eviction, produced once per consumed request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EvictionResult {
    pub identity: PodIdentity,
    pub success: bool,
}

/// Outcome of a heartbeat report.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeartbeatOutcome {
    /// First heartbeat for this pod; a record was created.
    Created,
    /// Existing record updated.
    Updated,
    /// Pod is pending deletion or deleted; nothing changed.
    Conflict,
}

impl HeartbeatOutcome {
    pub fn as_str(self) -> &'static str {
        match self {
            HeartbeatOutcome::Created => "created",
            HeartbeatOutcome::Updated => "updated",
            HeartbeatOutcome::Conflict => "conflict",
        }
    }
}

/// Outcome of an explicit record removal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemoveOutcome {
    Removed,
    NotFound,
}

/// Point-in-time health view of one pod, as served by the list endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PodHealth {
    pub pod_name: String,
    pub namespace: String,
    pub is_healthy: bool,
    pub error_count: u32,
    pub is_deleted: bool,
}

impl PodHealth {
    pub fn from_record(identity: &PodIdentity, record: &HealthRecord) -> Self {
        Self {
            pod_name: identity.name.clone(),
            namespace: identity.namespace.clone(),
            is_healthy: record.error_count == 0,
            error_count: record.error_count,
            is_deleted: record.state == LifecycleState::Deleted,
        }
    }

    pub fn identity(&self) -> PodIdentity {
        PodIdentity::new(&self.pod_name, &self.namespace)
    }
}
