//! Client for the pod health API.
//!
//! Used by the heartbeat sidecar and the operator CLI.

use std::time::Duration;

use reqwest::StatusCode;
use thiserror::Error;
use url::Url;

use crate::health::types::{HeartbeatOutcome, PodHealth, PodIdentity, RemoveOutcome};

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("invalid monitor URL {url}: {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("request to monitor failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("monitor returned unexpected status {0}")]
    Status(u16),
}

/// Typed client for `/podHealth`.
#[derive(Debug, Clone)]
pub struct MonitorClient {
    http: reqwest::Client,
    endpoint: Url,
    timeout: Duration,
}

impl MonitorClient {
    /// Create a client for a monitor at `base_url`. A missing scheme
    /// defaults to `http://`.
    pub fn new(base_url: &str) -> Result<Self, ClientError> {
        let mut base = if base_url.contains("://") {
            base_url.to_string()
        } else {
            format!("http://{base_url}")
        };
        if !base.ends_with('/') {
            base.push('/');
        }

        let invalid = |reason: String| ClientError::InvalidUrl {
            url: base_url.to_string(),
            reason,
        };
        let endpoint = Url::parse(&base)
            .and_then(|url| url.join("podHealth"))
            .map_err(|e| invalid(e.to_string()))?;
        if !matches!(endpoint.scheme(), "http" | "https") {
            return Err(invalid(format!("unsupported scheme {}", endpoint.scheme())));
        }

        Ok(Self {
            http: reqwest::Client::new(),
            endpoint,
            timeout: Duration::from_secs(5),
        })
    }

    /// Same client with a different per-request timeout.
    pub fn with_timeout(&self, timeout: Duration) -> Self {
        Self {
            timeout,
            ..self.clone()
        }
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    /// POST a heartbeat.
    pub async fn report(
        &self,
        identity: &PodIdentity,
        is_healthy: bool,
    ) -> Result<HeartbeatOutcome, ClientError> {
        let is_healthy = if is_healthy { "true" } else { "false" };
        let response = self
            .http
            .post(self.endpoint.clone())
            .query(&[
                ("podName", identity.name.as_str()),
                ("namespace", identity.namespace.as_str()),
                ("isHealthy", is_healthy),
            ])
            .timeout(self.timeout)
            .send()
            .await?;

        match response.status() {
            StatusCode::CREATED => Ok(HeartbeatOutcome::Created),
            StatusCode::OK => Ok(HeartbeatOutcome::Updated),
            StatusCode::INTERNAL_SERVER_ERROR => Ok(HeartbeatOutcome::Conflict),
            other => Err(ClientError::Status(other.as_u16())),
        }
    }

    /// GET the health of every tracked pod.
    pub async fn list(&self) -> Result<Vec<PodHealth>, ClientError> {
        let response = self
            .http
            .get(self.endpoint.clone())
            .timeout(self.timeout)
            .send()
            .await?;

        if response.status() != StatusCode::OK {
            return Err(ClientError::Status(response.status().as_u16()));
        }
        Ok(response.json().await?)
    }

    /// DELETE a pod's record.
    pub async fn remove(&self, identity: &PodIdentity) -> Result<RemoveOutcome, ClientError> {
        let response = self
            .http
            .delete(self.endpoint.clone())
            .query(&[
                ("podName", identity.name.as_str()),
                ("namespace", identity.namespace.as_str()),
            ])
            .timeout(self.timeout)
            .send()
            .await?;

        match response.status() {
            StatusCode::OK => Ok(RemoveOutcome::Removed),
            StatusCode::NOT_FOUND => Ok(RemoveOutcome::NotFound),
            other => Err(ClientError::Status(other.as_u16())),
        }
    }
}
