//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML, optional)
//!     → loader.rs (parse & deserialize, or defaults)
//!     → loader.rs (environment overrides)
//!     → validation.rs (semantic checks)
//!     → MonitorConfig (validated, immutable)
//!
//! sidecar environment
//!     → sidecar.rs → SidecarConfig
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded; the error threshold never changes
//!   after the monitor is built
//! - Every field but the error threshold has a default; a missing
//!   threshold is fatal at startup
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod sidecar;
pub mod validation;

pub use loader::{load_config, load_config_with, ConfigError};
pub use schema::{
    HealthConfig, ListenerConfig, LogFormat, MonitorConfig, ObservabilityConfig, OrchestratorConfig,
    TimeoutConfig,
};
pub use sidecar::SidecarConfig;
