//! Heartbeat tracking and eviction coordination.
//!
//! # Responsibilities
//! - Own the pod → health record map
//! - Apply heartbeats and detect threshold crossings
//! - Emit one eviction request per crossing
//! - Reconcile eviction results back into records
//!
//! # Design Decisions
//! - One mutex over the whole map; critical sections are short and never
//!   wait on I/O
//! - The eviction request is enqueued inside the same critical section as
//!   the counter update, so concurrent heartbeats cannot double-evict
//! - Request queue is unbounded: a request is only sent on the transition
//!   into DeletePending, so at most one request per record is in flight
//! - The reconciliation task holds a weak reference and is aborted when the
//!   monitor is dropped

use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::num::NonZeroU32;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};
use std::time::{Duration, SystemTime};

use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::health::types::{
    EvictionRequest, EvictionResult, HealthRecord, HeartbeatOutcome, LifecycleState, PodHealth,
    PodIdentity, RemoveOutcome,
};
use crate::observability::metrics;

type RecordMap = HashMap<PodIdentity, HealthRecord>;

/// The record map. Only reachable through [`Records::lock`].
#[derive(Default)]
struct Records(Mutex<RecordMap>);

impl Records {
    fn lock(&self) -> MutexGuard<'_, RecordMap> {
        // Every critical section leaves the map consistent, so a poisoned
        // lock still guards valid data.
        self.0.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Tracks pod heartbeats and requests eviction of pods that stay unhealthy.
pub struct HealthMonitor {
    records: Records,
    error_threshold: NonZeroU32,
    evictions: mpsc::UnboundedSender<EvictionRequest>,
    reconciler: JoinHandle<()>,
}

impl HealthMonitor {
    /// Create a monitor and start its reconciliation task.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn new(
        error_threshold: NonZeroU32,
        evictions: mpsc::UnboundedSender<EvictionRequest>,
        results: mpsc::UnboundedReceiver<EvictionResult>,
    ) -> Arc<Self> {
        Arc::new_cyclic(|monitor| {
            let reconciler = tokio::spawn(reconcile_results(monitor.clone(), results));
            Self {
                records: Records::default(),
                error_threshold,
                evictions,
                reconciler,
            }
        })
    }

    /// Number of consecutive unhealthy heartbeats that triggers eviction.
    pub fn error_threshold(&self) -> NonZeroU32 {
        self.error_threshold
    }

    /// Apply a heartbeat for `identity`.
    pub fn report_heartbeat(&self, identity: PodIdentity, is_healthy: bool) -> HeartbeatOutcome {
        let mut records = self.records.lock();

        let outcome = match records.entry(identity.clone()) {
            Entry::Vacant(entry) => {
                let record = entry.insert(HealthRecord::first_seen(is_healthy));
                tracing::info!(
                    pod = %identity.name,
                    namespace = %identity.namespace,
                    is_healthy,
                    "New pod registered"
                );
                self.check_threshold(&identity, record);
                HeartbeatOutcome::Created
            }
            Entry::Occupied(entry) => {
                let record = entry.into_mut();
                if record.state.rejects_heartbeats() {
                    tracing::warn!(
                        pod = %identity.name,
                        namespace = %identity.namespace,
                        is_healthy,
                        state = record.state.as_str(),
                        error_count = record.error_count,
                        "Pod is already deleted or deletion is pending"
                    );
                    HeartbeatOutcome::Conflict
                } else {
                    if is_healthy {
                        record.error_count = 0;
                        record.state = LifecycleState::Active;
                    } else {
                        record.error_count = record.error_count.saturating_add(1);
                    }
                    record.last_seen = SystemTime::now();

                    tracing::debug!(
                        pod = %identity.name,
                        namespace = %identity.namespace,
                        is_healthy,
                        error_count = record.error_count,
                        "Heartbeat applied"
                    );
                    self.check_threshold(&identity, record);
                    HeartbeatOutcome::Updated
                }
            }
        };

        metrics::record_heartbeat(outcome);
        metrics::set_tracked_pods(records.len());
        outcome
    }

    /// Snapshot of every tracked pod. Order is unspecified.
    pub fn list_health(&self) -> Vec<PodHealth> {
        let records = self.records.lock();
        records
            .iter()
            .map(|(identity, record)| PodHealth::from_record(identity, record))
            .collect()
    }

    /// Copy of the record for one pod.
    pub fn record(&self, identity: &PodIdentity) -> Option<HealthRecord> {
        self.records.lock().get(identity).cloned()
    }

    /// Forget a pod, whatever its state.
    pub fn remove_record(&self, identity: &PodIdentity) -> RemoveOutcome {
        let mut records = self.records.lock();
        match records.remove(identity) {
            Some(record) => {
                tracing::info!(
                    pod = %identity.name,
                    namespace = %identity.namespace,
                    state = record.state.as_str(),
                    "Deleted pod entry"
                );
                metrics::set_tracked_pods(records.len());
                RemoveOutcome::Removed
            }
            None => {
                tracing::warn!(
                    pod = %identity.name,
                    namespace = %identity.namespace,
                    "Pod entry not found for deletion"
                );
                RemoveOutcome::NotFound
            }
        }
    }

    /// Drop `Deleted` records whose last heartbeat is older than `older_than`.
    ///
    /// Returns the number of records removed.
    pub fn reap_deleted(&self, older_than: Duration) -> usize {
        let now = SystemTime::now();
        let mut records = self.records.lock();
        let before = records.len();

        records.retain(|identity, record| {
            let expired = record.state == LifecycleState::Deleted
                && now.duration_since(record.last_seen).unwrap_or_default() >= older_than;
            if expired {
                tracing::debug!(pod = %identity.name, namespace = %identity.namespace, "Reaping deleted pod");
            }
            !expired
        });

        let reaped = before - records.len();
        if reaped > 0 {
            metrics::record_reaped(reaped);
            metrics::set_tracked_pods(records.len());
        }
        reaped
    }

    /// Move a record to DeletePending and enqueue its eviction once the
    /// threshold is reached. Caller holds the lock.
    fn check_threshold(&self, identity: &PodIdentity, record: &mut HealthRecord) {
        if record.state.rejects_heartbeats() || record.error_count < self.error_threshold.get() {
            return;
        }

        record.state = LifecycleState::DeletePending;
        let request = EvictionRequest {
            identity: identity.clone(),
        };

        match self.evictions.send(request) {
            Ok(()) => {
                tracing::info!(
                    pod = %identity.name,
                    namespace = %identity.namespace,
                    error_count = record.error_count,
                    "Pod is unhealthy and will be evicted"
                );
                metrics::record_eviction_requested();
            }
            Err(_) => {
                record.state = LifecycleState::DeleteFailed;
                tracing::error!(
                    pod = %identity.name,
                    namespace = %identity.namespace,
                    "Eviction queue closed, marking eviction as failed"
                );
                metrics::record_eviction_result(false);
            }
        }
    }

    /// Apply the outcome of an eviction. Only a record still waiting on its
    /// eviction takes the result; a removed or re-registered pod keeps its
    /// current state.
    fn reconcile_eviction_result(&self, identity: &PodIdentity, success: bool) {
        let mut records = self.records.lock();
        let Some(record) = records.get_mut(identity) else {
            tracing::debug!(
                pod = %identity.name,
                namespace = %identity.namespace,
                success,
                "Eviction result for untracked pod ignored"
            );
            return;
        };
        if record.state != LifecycleState::DeletePending {
            tracing::debug!(
                pod = %identity.name,
                namespace = %identity.namespace,
                success,
                state = record.state.as_str(),
                "Stale eviction result ignored"
            );
            return;
        }

        record.state = if success {
            LifecycleState::Deleted
        } else {
            LifecycleState::DeleteFailed
        };

        if success {
            tracing::info!(pod = %identity.name, namespace = %identity.namespace, "Pod eviction confirmed");
        } else {
            tracing::warn!(
                pod = %identity.name,
                namespace = %identity.namespace,
                error_count = record.error_count,
                "Pod eviction failed"
            );
        }
    }
}

impl Drop for HealthMonitor {
    fn drop(&mut self) {
        self.reconciler.abort();
    }
}

/// Drain eviction results into the monitor until the channel closes or the
/// monitor is gone.
async fn reconcile_results(
    weak: Weak<HealthMonitor>,
    mut results: mpsc::UnboundedReceiver<EvictionResult>,
) {
    while let Some(result) = results.recv().await {
        let Some(monitor) = weak.upgrade() else {
            break;
        };
        monitor.reconcile_eviction_result(&result.identity, result.success);
    }
    tracing::debug!("Eviction reconciliation stopped");
}
