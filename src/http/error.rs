//! API errors and their HTTP mapping.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use thiserror::Error;

use crate::health::types::PodIdentity;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("missing or empty query parameter: {0}")]
    InvalidParameter(&'static str),

    /// Heartbeat for a pod that is pending deletion or deleted.
    #[error("pod {0} is already deleted or deletion is pending")]
    Conflict(PodIdentity),

    #[error("pod {0} is not tracked")]
    NotFound(PodIdentity),
}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::InvalidParameter(_) => StatusCode::BAD_REQUEST,
            ApiError::Conflict(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            error: self.to_string(),
        };
        (self.status(), Json(body)).into_response()
    }
}
