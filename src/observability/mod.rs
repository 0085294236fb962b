//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! Forwarder, server, lifecycle:
//!     → logging.rs (structured log events, stdout)
//!     → per-request span carrying request_id and peer
//! ```

pub mod logging;
