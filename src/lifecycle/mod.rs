//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Signals (signals.rs):
//!     SIGTERM/SIGINT → wait_for_signal returns
//!
//! Shutdown (shutdown.rs):
//!     trigger → HTTP server drains → executor and reaper exit their loops
//! ```
//!
//! # Design Decisions
//! - One broadcast channel; every long-running task subscribes
//! - The reconciliation task is not a subscriber: it ends with the monitor

pub mod shutdown;
pub mod signals;

pub use shutdown::Shutdown;
pub use signals::wait_for_signal;
