//! Eviction executor.
//!
//! # Responsibilities
//! - Consume eviction requests in order
//! - Delete the pod through the orchestrator, bounded by a timeout
//! - Produce exactly one result per consumed request
//!
//! # Design Decisions
//! - "Not found" counts as success: the pod is gone either way
//! - No retries; a failed eviction is re-armed by the next heartbeat
//! - An in-flight deletion finishes before shutdown is observed

use std::time::Duration;

use tokio::sync::broadcast;
use tokio::time;

use crate::eviction::orchestrator::{Orchestrator, OrchestratorError};
use crate::eviction::ExecutorChannels;
use crate::health::types::{EvictionRequest, EvictionResult};
use crate::observability::metrics;

/// Runs pod deletions requested by the health monitor.
pub struct EvictionExecutor<O> {
    orchestrator: O,
    channels: ExecutorChannels,
    timeout: Duration,
}

impl<O: Orchestrator> EvictionExecutor<O> {
    pub fn new(orchestrator: O, channels: ExecutorChannels, timeout: Duration) -> Self {
        Self {
            orchestrator,
            channels,
            timeout,
        }
    }

    /// Process requests until shutdown or until the request queue closes.
    pub async fn run(mut self, mut shutdown: broadcast::Receiver<()>) {
        tracing::info!(timeout_secs = self.timeout.as_secs(), "Eviction executor starting");

        loop {
            tokio::select! {
                request = self.channels.requests.recv() => {
                    let Some(request) = request else {
                        tracing::info!("Eviction request queue closed, executor exiting");
                        break;
                    };
                    let result = self.evict(request).await;
                    metrics::record_eviction_result(result.success);
                    if self.channels.results.send(result).is_err() {
                        tracing::warn!("Eviction result queue closed, executor exiting");
                        break;
                    }
                }
                _ = shutdown.recv() => {
                    tracing::info!("Eviction executor received shutdown signal, exiting loop");
                    break;
                }
            }
        }
    }

    /// Delete one pod and classify the outcome.
    pub async fn evict(&self, request: EvictionRequest) -> EvictionResult {
        let identity = request.identity;

        let outcome = match time::timeout(self.timeout, self.orchestrator.delete_pod(&identity)).await {
            Ok(outcome) => outcome,
            Err(_) => Err(OrchestratorError::Timeout(self.timeout)),
        };

        let success = match outcome {
            Ok(()) => {
                tracing::info!(pod = %identity.name, namespace = %identity.namespace, "Pod deleted");
                true
            }
            Err(OrchestratorError::NotFound) => {
                tracing::warn!(pod = %identity.name, namespace = %identity.namespace, "Pod not found");
                true
            }
            Err(e) => {
                tracing::error!(
                    pod = %identity.name,
                    namespace = %identity.namespace,
                    error = %e,
                    "Error deleting pod"
                );
                false
            }
        };

        EvictionResult { identity, success }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::eviction::eviction_channels;
    use crate::health::types::PodIdentity;
    use crate::lifecycle::Shutdown;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[derive(Clone, Copy)]
    enum Behavior {
        Delete,
        Missing,
        Reject,
        Hang,
    }

    struct FakeOrchestrator {
        behavior: Behavior,
        calls: Arc<AtomicUsize>,
    }

    impl FakeOrchestrator {
        fn new(behavior: Behavior) -> Self {
            Self {
                behavior,
                calls: Arc::new(AtomicUsize::new(0)),
            }
        }
    }

    impl Orchestrator for FakeOrchestrator {
        async fn delete_pod(&self, _identity: &PodIdentity) -> Result<(), OrchestratorError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            match self.behavior {
                Behavior::Delete => Ok(()),
                Behavior::Missing => Err(OrchestratorError::NotFound),
                Behavior::Reject => Err(OrchestratorError::Status {
                    status: 403,
                    body: "forbidden".to_string(),
                }),
                Behavior::Hang => {
                    time::sleep(Duration::from_secs(60)).await;
                    Ok(())
                }
            }
        }
    }

    fn request(name: &str) -> EvictionRequest {
        EvictionRequest {
            identity: PodIdentity::new(name, "default"),
        }
    }

    async fn evict_with(behavior: Behavior) -> EvictionResult {
        let (_coordinator, channels) = eviction_channels();
        let executor = EvictionExecutor::new(FakeOrchestrator::new(behavior), channels, Duration::from_millis(50));
        executor.evict(request("worker")).await
    }

    #[tokio::test]
    async fn test_outcome_classification() {
        assert!(evict_with(Behavior::Delete).await.success);
        assert!(evict_with(Behavior::Missing).await.success);
        assert!(!evict_with(Behavior::Reject).await.success);
        assert!(!evict_with(Behavior::Hang).await.success);
    }

    #[tokio::test]
    async fn test_one_result_per_request() {
        let (mut coordinator, channels) = eviction_channels();
        let orchestrator = FakeOrchestrator::new(Behavior::Reject);
        let calls = orchestrator.calls.clone();
        let shutdown = Shutdown::new();

        let executor = EvictionExecutor::new(orchestrator, channels, Duration::from_secs(1));
        let handle = tokio::spawn(executor.run(shutdown.subscribe()));

        for name in ["a", "b", "c"] {
            coordinator.requests.send(request(name)).unwrap();
        }

        for name in ["a", "b", "c"] {
            let result = coordinator.results.recv().await.unwrap();
            assert_eq!(result.identity.name, name);
            assert!(!result.success);
        }
        assert_eq!(calls.load(Ordering::SeqCst), 3);

        drop(coordinator.requests);
        handle.await.unwrap();
    }

    #[tokio::test]
    async fn test_stops_on_shutdown() {
        let (_coordinator, channels) = eviction_channels();
        let shutdown = Shutdown::new();
        let executor = EvictionExecutor::new(FakeOrchestrator::new(Behavior::Delete), channels, Duration::from_secs(1));
        let handle = tokio::spawn(executor.run(shutdown.subscribe()));

        shutdown.trigger();
        time::timeout(Duration::from_secs(1), handle).await.unwrap().unwrap();
    }
}
