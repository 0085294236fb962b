//! Response envelopes sent back to the browser.
//!
//! # Responsibilities
//! - Answer CORS preflight requests without touching the upstream
//! - Reshape a materialized upstream response for a cross-origin caller
//!
//! # Design Decisions
//! - Upstream headers are not copied; only Content-Type survives
//! - Content-Length is recomputed from the buffered body, since redirects
//!   and transfer encodings can make the upstream value wrong
//! - Every relayed response is marked `Cache-Control: no-cache`

use axum::body::Body;
use axum::http::header::{
    ACCESS_CONTROL_ALLOW_HEADERS, ACCESS_CONTROL_ALLOW_METHODS, ACCESS_CONTROL_ALLOW_ORIGIN,
    ACCESS_CONTROL_MAX_AGE, CACHE_CONTROL, CONTENT_LENGTH, CONTENT_TYPE,
};
use axum::http::{HeaderMap, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};

use crate::forwarder::UpstreamResponse;

/// Wildcard used for allowed origins and headers.
pub const ANY: &str = "*";
pub const PREFLIGHT_METHODS: &str = "GET, POST, HEAD, OPTIONS";
/// One day, in seconds.
pub const PREFLIGHT_MAX_AGE: &str = "86400";
pub const DEFAULT_CONTENT_TYPE: &str = "application/octet-stream";

/// Header-only acknowledgment of a CORS preflight.
pub fn preflight() -> Response {
    let mut headers = HeaderMap::with_capacity(4);
    headers.insert(ACCESS_CONTROL_ALLOW_ORIGIN, HeaderValue::from_static(ANY));
    headers.insert(
        ACCESS_CONTROL_ALLOW_METHODS,
        HeaderValue::from_static(PREFLIGHT_METHODS),
    );
    headers.insert(ACCESS_CONTROL_ALLOW_HEADERS, HeaderValue::from_static(ANY));
    headers.insert(ACCESS_CONTROL_MAX_AGE, HeaderValue::from_static(PREFLIGHT_MAX_AGE));

    (StatusCode::NO_CONTENT, headers).into_response()
}

/// Relay an upstream response with the cross-origin envelope attached.
pub fn relay(upstream: UpstreamResponse) -> Response {
    let UpstreamResponse {
        status,
        content_type,
        body,
    } = upstream;

    let mut headers = HeaderMap::with_capacity(5);
    headers.insert(
        CONTENT_TYPE,
        content_type.unwrap_or_else(|| HeaderValue::from_static(DEFAULT_CONTENT_TYPE)),
    );
    headers.insert(CONTENT_LENGTH, HeaderValue::from(body.len()));
    headers.insert(ACCESS_CONTROL_ALLOW_ORIGIN, HeaderValue::from_static(ANY));
    headers.insert(ACCESS_CONTROL_ALLOW_HEADERS, HeaderValue::from_static(ANY));
    headers.insert(CACHE_CONTROL, HeaderValue::from_static("no-cache"));

    (status, headers, Body::from(body)).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{to_bytes, Bytes};

    #[tokio::test]
    async fn test_preflight_envelope() {
        let response = preflight();
        assert!(response.status().is_success());
        let headers = response.headers();
        assert_eq!(headers[ACCESS_CONTROL_ALLOW_ORIGIN], "*");
        assert_eq!(headers[ACCESS_CONTROL_ALLOW_METHODS], "GET, POST, HEAD, OPTIONS");
        assert_eq!(headers[ACCESS_CONTROL_ALLOW_HEADERS], "*");
        assert_eq!(headers[ACCESS_CONTROL_MAX_AGE], "86400");

        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert!(body.is_empty());
    }

    #[tokio::test]
    async fn test_relay_envelope() {
        let response = relay(UpstreamResponse {
            status: StatusCode::NOT_FOUND,
            content_type: Some(HeaderValue::from_static("application/json")),
            body: Bytes::from_static(br#"{"error":"DiskNotFoundError"}"#),
        });

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let headers = response.headers();
        assert_eq!(headers[CONTENT_TYPE], "application/json");
        assert_eq!(headers[CONTENT_LENGTH], "29");
        assert_eq!(headers[ACCESS_CONTROL_ALLOW_ORIGIN], "*");
        assert_eq!(headers[ACCESS_CONTROL_ALLOW_HEADERS], "*");
        assert_eq!(headers[CACHE_CONTROL], "no-cache");

        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert_eq!(&body[..], br#"{"error":"DiskNotFoundError"}"#);
    }

    #[test]
    fn test_missing_content_type_defaults() {
        let response = relay(UpstreamResponse {
            status: StatusCode::OK,
            content_type: None,
            body: Bytes::new(),
        });
        assert_eq!(response.headers()[CONTENT_TYPE], "application/octet-stream");
        assert_eq!(response.headers()[CONTENT_LENGTH], "0");
    }
}
