//! Route handlers for the pod health API.

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;

use crate::health::types::{HeartbeatOutcome, PodHealth, PodIdentity, RemoveOutcome};
use crate::http::error::ApiError;
use crate::http::server::AppState;

/// Query of `POST /podHealth`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportParams {
    pub pod_name: String,
    pub namespace: String,
    pub is_healthy: bool,
}

/// Query of `DELETE /podHealth`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PodParams {
    pub pod_name: String,
    pub namespace: String,
}

fn pod_identity(pod_name: String, namespace: String) -> Result<PodIdentity, ApiError> {
    if pod_name.is_empty() {
        return Err(ApiError::InvalidParameter("podName"));
    }
    if namespace.is_empty() {
        return Err(ApiError::InvalidParameter("namespace"));
    }
    Ok(PodIdentity::new(pod_name, namespace))
}

/// POST /podHealth
pub async fn report_health(
    State(state): State<AppState>,
    Query(params): Query<ReportParams>,
) -> Result<StatusCode, ApiError> {
    let identity = pod_identity(params.pod_name, params.namespace)?;

    match state.monitor.report_heartbeat(identity.clone(), params.is_healthy) {
        HeartbeatOutcome::Created => Ok(StatusCode::CREATED),
        HeartbeatOutcome::Updated => Ok(StatusCode::OK),
        HeartbeatOutcome::Conflict => Err(ApiError::Conflict(identity)),
    }
}

/// GET /podHealth
pub async fn list_health(State(state): State<AppState>) -> Json<Vec<PodHealth>> {
    Json(state.monitor.list_health())
}

/// DELETE /podHealth
pub async fn remove_health(
    State(state): State<AppState>,
    Query(params): Query<PodParams>,
) -> Result<StatusCode, ApiError> {
    let identity = pod_identity(params.pod_name, params.namespace)?;

    match state.monitor.remove_record(&identity) {
        RemoveOutcome::Removed => Ok(StatusCode::OK),
        RemoveOutcome::NotFound => Err(ApiError::NotFound(identity)),
    }
}

/// GET /healthz
pub async fn liveness() -> &'static str {
    "ok"
}
