//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create Axum Router with all handlers
//! - Wire up middleware (request ID, tracing, timeout)
//! - Serve until the shutdown signal, then drain in-flight requests

use std::sync::Arc;
use std::time::Duration;

use axum::http::HeaderName;
use axum::routing::get;
use axum::Router;
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower::ServiceBuilder;
use tower_http::request_id::{PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use crate::config::TimeoutConfig;
use crate::health::HealthMonitor;
use crate::http::handlers;
use crate::http::request::{MakeRequestUuidV4, X_REQUEST_ID};
use crate::lifecycle::shutdown;

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub monitor: Arc<HealthMonitor>,
}

/// HTTP front end of the health monitor.
pub struct HttpServer {
    router: Router,
}

impl HttpServer {
    pub fn new(timeouts: &TimeoutConfig, monitor: Arc<HealthMonitor>) -> Self {
        let router = Self::build_router(timeouts, AppState { monitor });
        Self { router }
    }

    /// Build the Axum router with all middleware layers.
    #[allow(deprecated)]
    pub fn build_router(timeouts: &TimeoutConfig, state: AppState) -> Router {
        let request_id_header = HeaderName::from_static(X_REQUEST_ID);

        Router::new()
            .route(
                "/podHealth",
                get(handlers::list_health)
                    .post(handlers::report_health)
                    .delete(handlers::remove_health),
            )
            .route("/healthz", get(handlers::liveness))
            .with_state(state)
            .layer(
                ServiceBuilder::new()
                    .layer(SetRequestIdLayer::new(request_id_header.clone(), MakeRequestUuidV4))
                    .layer(TraceLayer::new_for_http())
                    .layer(PropagateRequestIdLayer::new(request_id_header))
                    .layer(TimeoutLayer::new(Duration::from_secs(timeouts.request_secs))),
            )
    }

    /// Run the server, accepting connections on the given listener.
    pub async fn run(
        self,
        listener: TcpListener,
        shutdown_rx: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");

        axum::serve(listener, self.router)
            .with_graceful_shutdown(shutdown::recv(shutdown_rx))
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::eviction::{eviction_channels, ExecutorChannels};
    use crate::health::PodHealth;
    use axum::body::{to_bytes, Body};
    use axum::http::{Method, Request, StatusCode};
    use std::num::NonZeroU32;
    use tower::ServiceExt;

    struct TestApp {
        router: Router,
        monitor: Arc<HealthMonitor>,
        // Dropping the executor side would close the request queue.
        _executor: ExecutorChannels,
    }

    fn app(threshold: u32) -> TestApp {
        let (coordinator, executor) = eviction_channels();
        let monitor = HealthMonitor::new(
            NonZeroU32::new(threshold).unwrap(),
            coordinator.requests,
            coordinator.results,
        );
        let state = AppState {
            monitor: monitor.clone(),
        };
        TestApp {
            router: HttpServer::build_router(&TimeoutConfig::default(), state),
            monitor,
            _executor: executor,
        }
    }

    async fn send(router: &Router, method: Method, uri: &str) -> (StatusCode, Vec<u8>) {
        let request = Request::builder().method(method).uri(uri).body(Body::empty()).unwrap();
        let response = router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, body.to_vec())
    }

    #[tokio::test]
    async fn test_report_status_codes() {
        let TestApp { router, _executor, .. } = app(2);
        let uri = "/podHealth?podName=web-0&namespace=default&isHealthy=false";

        assert_eq!(send(&router, Method::POST, uri).await.0, StatusCode::CREATED);
        assert_eq!(send(&router, Method::POST, uri).await.0, StatusCode::OK);
        assert_eq!(send(&router, Method::POST, uri).await.0, StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[tokio::test]
    async fn test_list_wire_format() {
        let TestApp { router, _executor, .. } = app(3);
        send(&router, Method::POST, "/podHealth?podName=a&namespace=ns&isHealthy=true").await;
        send(&router, Method::POST, "/podHealth?podName=b&namespace=ns&isHealthy=false").await;

        let (status, body) = send(&router, Method::GET, "/podHealth").await;
        assert_eq!(status, StatusCode::OK);

        let mut list: Vec<PodHealth> = serde_json::from_slice(&body).unwrap();
        list.sort_by(|x, y| x.pod_name.cmp(&y.pod_name));
        assert_eq!(list.len(), 2);
        assert!(list[0].is_healthy);
        assert_eq!(list[1].error_count, 1);
        assert!(!list[1].is_healthy);
    }

    #[tokio::test]
    async fn test_empty_list_is_array() {
        let TestApp { router, _executor, .. } = app(3);
        let (status, body) = send(&router, Method::GET, "/podHealth").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, b"[]");
    }

    #[tokio::test]
    async fn test_remove_status_codes() {
        let TestApp { router, monitor, _executor } = app(3);
        send(&router, Method::POST, "/podHealth?podName=a&namespace=ns&isHealthy=true").await;

        let uri = "/podHealth?podName=a&namespace=ns";
        assert_eq!(send(&router, Method::DELETE, uri).await.0, StatusCode::OK);
        assert_eq!(send(&router, Method::DELETE, uri).await.0, StatusCode::NOT_FOUND);
        assert!(monitor.list_health().is_empty());
    }

    #[tokio::test]
    async fn test_invalid_parameters() {
        let TestApp { router, monitor, _executor } = app(3);

        let missing = send(&router, Method::POST, "/podHealth?podName=a&namespace=ns").await;
        assert_eq!(missing.0, StatusCode::BAD_REQUEST);

        let malformed = send(&router, Method::POST, "/podHealth?podName=a&namespace=ns&isHealthy=maybe").await;
        assert_eq!(malformed.0, StatusCode::BAD_REQUEST);

        let empty = send(&router, Method::POST, "/podHealth?podName=&namespace=ns&isHealthy=true").await;
        assert_eq!(empty.0, StatusCode::BAD_REQUEST);

        assert!(monitor.list_health().is_empty());
    }

    #[tokio::test]
    async fn test_request_id_is_set() {
        let TestApp { router, _executor, .. } = app(3);
        let request = Request::builder().uri("/healthz").body(Body::empty()).unwrap();
        let response = router.oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert!(response.headers().contains_key("x-request-id"));
    }
}
