//! Orchestrator client.
//!
//! # Responsibilities
//! - Delete a pod by name and namespace
//! - Distinguish "not found" from other failures
//! - Load in-cluster credentials (service account token, CA)

use std::fs;
use std::future::Future;
use std::path::Path;
use std::time::Duration;

use reqwest::StatusCode;
use thiserror::Error;
use url::Url;

use crate::config::OrchestratorConfig;
use crate::health::types::PodIdentity;

/// Errors from orchestrator calls.
#[derive(Debug, Error)]
pub enum OrchestratorError {
    #[error("pod not found")]
    NotFound,

    #[error("orchestrator returned status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("orchestrator request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("orchestrator request timed out after {0:?}")]
    Timeout(Duration),

    #[error("invalid orchestrator URL: {0}")]
    InvalidUrl(String),

    #[error("failed to read {path}: {source}")]
    Credentials {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

/// Something that can delete pods.
pub trait Orchestrator: Send + Sync + 'static {
    /// Delete the pod. A pod that does not exist yields [`OrchestratorError::NotFound`].
    fn delete_pod(
        &self,
        identity: &PodIdentity,
    ) -> impl Future<Output = Result<(), OrchestratorError>> + Send;
}

/// Kubernetes REST API client.
#[derive(Debug, Clone)]
pub struct KubernetesClient {
    http: reqwest::Client,
    api_url: Url,
    token: Option<String>,
}

impl KubernetesClient {
    /// Create a client for the given API server.
    pub fn new(api_url: &str, token: Option<String>) -> Result<Self, OrchestratorError> {
        Self::with_http(api_url, token, reqwest::Client::new())
    }

    /// Create a client from the pod's service account.
    pub fn in_cluster(config: &OrchestratorConfig) -> Result<Self, OrchestratorError> {
        let api_url = match &config.api_url {
            Some(url) => url.clone(),
            None => api_url_from_env()?,
        };

        let token = read_file(&config.token_path)?;
        let token = token.trim().to_string();

        let mut builder = reqwest::Client::builder();
        if Path::new(&config.ca_cert_path).exists() {
            let pem = fs::read(&config.ca_cert_path).map_err(|source| OrchestratorError::Credentials {
                path: config.ca_cert_path.clone(),
                source,
            })?;
            builder = builder.add_root_certificate(reqwest::Certificate::from_pem(&pem)?);
        } else {
            tracing::warn!(path = %config.ca_cert_path, "CA certificate not found, using system roots");
        }

        tracing::info!(api_url = %api_url, "Using in-cluster orchestrator credentials");
        Self::with_http(&api_url, Some(token), builder.build()?)
    }

    fn with_http(
        api_url: &str,
        token: Option<String>,
        http: reqwest::Client,
    ) -> Result<Self, OrchestratorError> {
        let api_url = Url::parse(api_url).map_err(|e| OrchestratorError::InvalidUrl(format!("{}: {}", api_url, e)))?;
        if api_url.cannot_be_a_base() {
            return Err(OrchestratorError::InvalidUrl(api_url.to_string()));
        }
        Ok(Self { http, api_url, token })
    }

    /// URL of a pod resource.
    pub fn pod_url(&self, identity: &PodIdentity) -> Result<Url, OrchestratorError> {
        let mut url = self.api_url.clone();
        url.path_segments_mut()
            .map_err(|_| OrchestratorError::InvalidUrl(self.api_url.to_string()))?
            .pop_if_empty()
            .extend([
                "api",
                "v1",
                "namespaces",
                identity.namespace.as_str(),
                "pods",
                identity.name.as_str(),
            ]);
        Ok(url)
    }
}

impl Orchestrator for KubernetesClient {
    async fn delete_pod(&self, identity: &PodIdentity) -> Result<(), OrchestratorError> {
        let url = self.pod_url(identity)?;
        let mut request = self.http.delete(url);
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await?;
        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Err(OrchestratorError::NotFound);
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(OrchestratorError::Status {
                status: status.as_u16(),
                body,
            });
        }
        Ok(())
    }
}

fn api_url_from_env() -> Result<String, OrchestratorError> {
    let host = std::env::var("KUBERNETES_SERVICE_HOST")
        .map_err(|_| OrchestratorError::InvalidUrl("KUBERNETES_SERVICE_HOST is not set".to_string()))?;
    let port = std::env::var("KUBERNETES_SERVICE_PORT").unwrap_or_else(|_| "443".to_string());

    if host.contains(':') {
        Ok(format!("https://[{}]:{}", host, port))
    } else {
        Ok(format!("https://{}:{}", host, port))
    }
}

fn read_file(path: &str) -> Result<String, OrchestratorError> {
    fs::read_to_string(path).map_err(|source| OrchestratorError::Credentials {
        path: path.to_string(),
        source,
    })
}
