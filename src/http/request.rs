//! Request ID generation.
//!
//! Every request gets an `x-request-id` (UUID v4) unless the caller sent
//! one. The ID is echoed on the response and recorded by the trace layer.

use axum::http::{HeaderValue, Request};
use tower_http::request_id::{MakeRequestId, RequestId};
use uuid::Uuid;

pub const X_REQUEST_ID: &str = "x-request-id";

#[derive(Debug, Clone, Copy, Default)]
pub struct MakeRequestUuidV4;

impl MakeRequestId for MakeRequestUuidV4 {
    fn make_request_id<B>(&mut self, _request: &Request<B>) -> Option<RequestId> {
        let value: HeaderValue = Uuid::new_v4().to_string().parse().ok()?;
        Some(RequestId::new(value))
    }
}
