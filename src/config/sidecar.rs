//! Heartbeat sidecar configuration, read from the environment.

use std::time::Duration;

use crate::config::loader::ConfigError;

/// Settings for the heartbeat sidecar.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SidecarConfig {
    /// Base URL of the monitor service.
    pub monitor_url: String,
    /// Heartbeat interval.
    pub interval: Duration,
    /// This pod's name.
    pub pod_name: String,
    /// This pod's namespace.
    pub namespace: String,
    /// File written by the volume probe.
    pub probe_path: String,
}

impl SidecarConfig {
    /// Read `MONITOR_SVC`, `INTERVAL`, `HOSTNAME`, `NAMESPACE` and `PROBE_PATH`.
    pub fn from_env(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let required = |var: &'static str| {
            lookup(var)
                .filter(|v| !v.is_empty())
                .ok_or(ConfigError::MissingEnv(var))
        };

        let interval_secs = match lookup("INTERVAL") {
            Some(value) => value.trim().parse::<u64>().ok().filter(|secs| *secs > 0).ok_or(ConfigError::Env {
                var: "INTERVAL",
                value,
            })?,
            None => 60,
        };

        Ok(Self {
            monitor_url: required("MONITOR_SVC")?,
            interval: Duration::from_secs(interval_secs),
            pod_name: required("HOSTNAME")?,
            namespace: required("NAMESPACE")?,
            probe_path: lookup("PROBE_PATH").unwrap_or_else(|| "/pvc/probe".to_string()),
        })
    }
}
