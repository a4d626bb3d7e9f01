//! Pod health monitor with eviction of persistently unhealthy pods.

pub mod client;
pub mod config;
pub mod eviction;
pub mod health;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod probe;
pub mod sidecar;

pub use config::MonitorConfig;
pub use health::HealthMonitor;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
