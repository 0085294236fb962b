//! Security subsystem.
//!
//! # Data Flow
//! ```text
//! Resolved target:
//!     → allowlist.rs (hostname must match a permitted entry)
//!     → headers.rs (replace inbound headers with the fixed outbound set)
//!     → Pass to upstream dispatch
//! ```
//!
//! # Design Decisions
//! - Fail closed: a host matching no entry is rejected
//! - No trust in client input: caller headers never reach the upstream

pub mod allowlist;
pub mod headers;

pub use allowlist::HostAllowlist;
pub use headers::OutboundHeaders;
