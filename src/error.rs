//! Forwarding error taxonomy.
//!
//! Every failure is terminal for its request: it is detected, converted to a
//! response right here, and never propagates past the handler.

use axum::http::{header, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use thiserror::Error;

use crate::http::response;

/// Errors that end a forwarding attempt before an upstream response is relayed.
#[derive(Debug, Error)]
pub enum ForwardError {
    /// Inbound path does not start with the route prefix.
    #[error("Proxy URL required. Use: {prefix}<encoded-url>")]
    Route { prefix: String },

    /// Percent-decoding of the embedded target failed.
    #[error("Invalid URL encoding")]
    Decode,

    /// Decoded target is not an absolute URL with a host.
    #[error("Invalid target URL")]
    Parse { reason: String },

    /// Target hostname matches no allowlist entry.
    #[error("Host not allowed: {host}")]
    HostNotAllowed { host: String },

    /// Inbound body exceeded the configured limit.
    #[error("Request body too large")]
    PayloadTooLarge { limit: usize },

    /// Inbound body could not be read (client aborted, bad framing).
    #[error("Invalid request body")]
    BodyRead { reason: String },

    /// Transport-level failure talking to the upstream.
    #[error("Proxy error: {0}")]
    Upstream(String),
}

impl ForwardError {
    /// HTTP status the error is reported with.
    pub fn status(&self) -> StatusCode {
        match self {
            ForwardError::Route { .. }
            | ForwardError::Decode
            | ForwardError::Parse { .. }
            | ForwardError::BodyRead { .. } => StatusCode::BAD_REQUEST,
            ForwardError::HostNotAllowed { .. } => StatusCode::FORBIDDEN,
            ForwardError::PayloadTooLarge { .. } => StatusCode::PAYLOAD_TOO_LARGE,
            ForwardError::Upstream(_) => StatusCode::BAD_GATEWAY,
        }
    }

    /// Short label for log events.
    pub fn kind(&self) -> &'static str {
        match self {
            ForwardError::Route { .. } => "route",
            ForwardError::Decode => "decode",
            ForwardError::Parse { .. } => "parse",
            ForwardError::HostNotAllowed { .. } => "host_not_allowed",
            ForwardError::PayloadTooLarge { .. } => "payload_too_large",
            ForwardError::BodyRead { .. } => "body_read",
            ForwardError::Upstream(_) => "upstream",
        }
    }
}

impl IntoResponse for ForwardError {
    fn into_response(self) -> Response {
        let mut response = (self.status(), self.to_string()).into_response();
        response.headers_mut().insert(
            header::ACCESS_CONTROL_ALLOW_ORIGIN,
            HeaderValue::from_static(response::ANY),
        );
        response
    }
}
