//! Volume liveness probe.
//!
//! A pod is healthy when it can write to its mounted volume in time. A
//! hung mount shows up as a timeout rather than an error.

use std::path::Path;
use std::time::Duration;

use tokio::time;

const PROBE_BYTE: u8 = 0x42;

/// Write one byte to `path`, failing after `timeout`.
pub async fn probe_volume(path: &Path, timeout: Duration) -> bool {
    match time::timeout(timeout, tokio::fs::write(path, [PROBE_BYTE])).await {
        Ok(Ok(())) => true,
        Ok(Err(e)) => {
            tracing::error!(path = %path.display(), error = %e, "Could not write probe file");
            false
        }
        Err(_) => {
            tracing::error!(path = %path.display(), timeout_ms = timeout.as_millis() as u64, "Timeout while writing probe file");
            false
        }
    }
}
