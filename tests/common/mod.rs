//! Shared utilities for integration tests.

use std::net::SocketAddr;
use std::num::NonZeroU32;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

use pod_monitor::config::TimeoutConfig;
use pod_monitor::eviction::{eviction_channels, EvictionExecutor, KubernetesClient};
use pod_monitor::health::HealthMonitor;
use pod_monitor::http::HttpServer;
use pod_monitor::lifecycle::Shutdown;

/// Paths of the requests a mock orchestrator has received.
pub type RequestLog = Arc<Mutex<Vec<String>>>;

/// Start a mock orchestrator API that answers every request with the status
/// chosen by `f` for its path.
pub async fn start_mock_orchestrator<F>(f: F) -> (SocketAddr, RequestLog)
where
    F: Fn(&str) -> u16 + Send + Sync + 'static,
{
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let log: RequestLog = Arc::new(Mutex::new(Vec::new()));
    let f = Arc::new(f);

    let requests = log.clone();
    tokio::spawn(async move {
        while let Ok((mut socket, _)) = listener.accept().await {
            let f = f.clone();
            let requests = requests.clone();
            tokio::spawn(async move {
                let mut buf = Vec::new();
                let mut chunk = [0u8; 1024];
                while !buf.windows(4).any(|w| w == b"\r\n\r\n") {
                    match socket.read(&mut chunk).await {
                        Ok(0) | Err(_) => return,
                        Ok(n) => buf.extend_from_slice(&chunk[..n]),
                    }
                }

                let head = String::from_utf8_lossy(&buf).to_string();
                let mut request_line = head.lines().next().unwrap_or_default().split_whitespace();
                let method = request_line.next().unwrap_or_default().to_string();
                let path = request_line.next().unwrap_or_default().to_string();
                requests.lock().unwrap().push(format!("{method} {path}"));

                let status = f(&path);
                let status_text = match status {
                    200 => "200 OK",
                    403 => "403 Forbidden",
                    404 => "404 Not Found",
                    500 => "500 Internal Server Error",
                    _ => "200 OK",
                };
                let body = "{}";
                let response = format!(
                    "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                    status_text,
                    body.len(),
                    body
                );
                let _ = socket.write_all(response.as_bytes()).await;
                let _ = socket.shutdown().await;
            });
        }
    });

    (addr, log)
}

/// A monitor service running on an ephemeral port.
pub struct TestMonitor {
    pub addr: SocketAddr,
    pub monitor: Arc<HealthMonitor>,
    pub shutdown: Shutdown,
}

impl TestMonitor {
    #[allow(dead_code)]
    pub fn url(&self) -> String {
        format!("http://{}", self.addr)
    }

    #[allow(dead_code)]
    pub fn pod_health_url(&self) -> String {
        format!("http://{}/podHealth", self.addr)
    }
}

/// Start the HTTP server, monitor and executor wired to `orchestrator_addr`.
pub async fn start_monitor(threshold: u32, orchestrator_addr: SocketAddr) -> TestMonitor {
    let orchestrator = KubernetesClient::new(&format!("http://{}", orchestrator_addr), None).unwrap();
    let (coordinator, executor_channels) = eviction_channels();
    let monitor = HealthMonitor::new(
        NonZeroU32::new(threshold).unwrap(),
        coordinator.requests,
        coordinator.results,
    );

    let shutdown = Shutdown::new();
    let executor = EvictionExecutor::new(orchestrator, executor_channels, Duration::from_secs(2));
    tokio::spawn(executor.run(shutdown.subscribe()));

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let server = HttpServer::new(&TimeoutConfig::default(), monitor.clone());
    let server_shutdown = shutdown.subscribe();
    tokio::spawn(async move {
        let _ = server.run(listener, server_shutdown).await;
    });

    TestMonitor {
        addr,
        monitor,
        shutdown,
    }
}

/// Poll `check` until it returns true or `timeout` passes.
#[allow(dead_code)]
pub async fn wait_until<F>(timeout: Duration, mut check: F) -> bool
where
    F: FnMut() -> bool,
{
    let deadline = tokio::time::Instant::now() + timeout;
    while tokio::time::Instant::now() < deadline {
        if check() {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    check()
}
