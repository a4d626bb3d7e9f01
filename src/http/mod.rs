//! HTTP transport subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, middleware)
//!     → request.rs (request ID)
//!     → handlers.rs (query validation, HealthMonitor call)
//!     → error.rs (outcome → status code)
//! ```
//!
//! # API Routes
//!
//! | Method | Path | Description |
//! |---|---|---|
//! | POST | `/podHealth?podName=&namespace=&isHealthy=` | Report a heartbeat (201 created, 200 updated, 500 conflict) |
//! | GET | `/podHealth` | List pod health |
//! | DELETE | `/podHealth?podName=&namespace=` | Remove a pod record (200, 404 unknown) |
//! | GET | `/healthz` | Liveness of the monitor itself |

pub mod error;
pub mod handlers;
pub mod request;
pub mod server;

pub use error::ApiError;
pub use request::{MakeRequestUuidV4, X_REQUEST_ID};
pub use server::{AppState, HttpServer};
