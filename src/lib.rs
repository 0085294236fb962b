//! CORS forwarding gateway.
//!
//! Lets a browser reach a small set of trusted APIs that do not send
//! cross-origin headers themselves: `/proxy/<encoded-url>` is checked against
//! a hostname allowlist, forwarded with a fixed header set, and the answer is
//! relayed back with permissive CORS headers.

pub mod config;
pub mod error;
pub mod forwarder;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod resilience;
pub mod routing;
pub mod security;

pub use config::schema::ProxyConfig;
pub use error::ForwardError;
pub use forwarder::Forwarder;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
