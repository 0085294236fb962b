//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming Request (path, query)
//!     → target.rs (prefix match, percent-decode, URL parse)
//!     → Return: Target or ForwardError
//! ```
//!
//! # Design Decisions
//! - One route: everything after the prefix is the target
//! - No regex in hot path (prefix matching only)
//! - Deterministic: same input always yields the same target

pub mod target;

pub use target::{Target, TargetResolver};
