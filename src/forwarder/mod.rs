//! Request forwarding.
//!
//! # Data Flow
//! ```text
//! Inbound request
//!     → OPTIONS? answer preflight, stop
//!     → routing::target (prefix, decode, parse)
//!     → security::allowlist (hostname check)
//!     → security::headers (fixed outbound header set)
//!     → upstream.rs (dispatch, follow redirects, buffer body)
//!     → http::response::relay (CORS envelope)
//! ```
//!
//! Each step either yields a terminal [`ForwardError`] or hands a refined
//! value to the next one. Nothing is shared between requests except the
//! pooled upstream client.

pub mod upstream;

use std::error::Error as StdError;
use std::time::Instant;

use axum::body::{to_bytes, Body, Bytes};
use axum::http::header::InvalidHeaderValue;
use axum::http::{Method, Request};
use axum::response::{IntoResponse, Response};
use http_body_util::LengthLimitError;
use thiserror::Error;

use crate::config::{ForwarderConfig, ProxyConfig};
use crate::error::ForwardError;
use crate::http::response;
use crate::routing::TargetResolver;
use crate::security::{HostAllowlist, OutboundHeaders};

pub use upstream::{HttpUpstream, OutboundRequest, Upstream, UpstreamFailure, UpstreamResponse};

/// Errors building a [`Forwarder`] from configuration.
#[derive(Debug, Error)]
pub enum ForwarderInitError {
    #[error("invalid outbound header value: {0}")]
    Header(#[from] InvalidHeaderValue),

    #[error("failed to build upstream client: {0}")]
    Client(#[from] reqwest::Error),
}

/// Turns one inbound request into exactly one response.
pub struct Forwarder<U = HttpUpstream> {
    targets: TargetResolver,
    allowlist: HostAllowlist,
    outbound: OutboundHeaders,
    max_body_bytes: usize,
    upstream: U,
}

impl Forwarder<HttpUpstream> {
    /// Build a forwarder that talks to the network.
    pub fn from_config(config: &ProxyConfig) -> Result<Self, ForwarderInitError> {
        let upstream = HttpUpstream::new(&config.forwarder, &config.timeouts)?;
        Self::with_upstream(&config.forwarder, upstream)
    }
}

impl<U: Upstream> Forwarder<U> {
    pub fn with_upstream(config: &ForwarderConfig, upstream: U) -> Result<Self, ForwarderInitError> {
        Ok(Self {
            targets: TargetResolver::new(config.path_prefix.clone()),
            allowlist: HostAllowlist::new(&config.allowed_hosts, config.host_match),
            outbound: OutboundHeaders::new(&config.user_agent, &config.accept_language)?,
            max_body_bytes: config.max_body_bytes,
            upstream,
        })
    }

    pub fn allowlist(&self) -> &HostAllowlist {
        &self.allowlist
    }

    /// Handle one request. Never fails: every outcome is a response.
    pub async fn handle(&self, request: Request<Body>) -> Response {
        // Preflight is answered before anything about the request is parsed.
        if request.method() == Method::OPTIONS {
            tracing::debug!(path = %request.uri().path(), "Answering CORS preflight");
            return response::preflight();
        }

        let method = request.method().clone();
        let started = Instant::now();

        match self.forward(request, started).await {
            Ok(response) => response,
            Err(err) => {
                match &err {
                    ForwardError::Upstream(message) => tracing::error!(
                        method = %method,
                        error = %message,
                        elapsed_ms = started.elapsed().as_millis() as u64,
                        "Upstream request failed"
                    ),
                    ForwardError::HostNotAllowed { host } => tracing::warn!(
                        method = %method,
                        host = %host,
                        "Rejected target host"
                    ),
                    ForwardError::Parse { reason } | ForwardError::BodyRead { reason } => tracing::warn!(
                        method = %method,
                        kind = err.kind(),
                        reason = %reason,
                        "Rejected request"
                    ),
                    _ => tracing::warn!(method = %method, kind = err.kind(), "Rejected request"),
                }
                err.into_response()
            }
        }
    }

    async fn forward(&self, request: Request<Body>, started: Instant) -> Result<Response, ForwardError> {
        let target = self.targets.resolve(request.uri())?;

        if !self.allowlist.permits(target.host()) {
            return Err(ForwardError::HostNotAllowed {
                host: target.host().to_string(),
            });
        }

        let (parts, body) = request.into_parts();
        let body = if parts.method == Method::GET || parts.method == Method::HEAD {
            None
        } else {
            Some(self.read_body(body).await?)
        };

        let host = target.host().to_string();
        tracing::debug!(method = %parts.method, host = %host, "Forwarding request");

        let outbound = OutboundRequest {
            method: parts.method.clone(),
            url: target.into_url(),
            headers: self.outbound.rewrite(&parts.headers),
            body,
        };

        let upstream = self
            .upstream
            .send(outbound)
            .await
            .map_err(|failure| ForwardError::Upstream(failure.message().to_string()))?;

        tracing::info!(
            method = %parts.method,
            host = %host,
            status = upstream.status.as_u16(),
            bytes = upstream.body.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Relayed upstream response"
        );

        Ok(response::relay(upstream))
    }

    async fn read_body(&self, body: Body) -> Result<Bytes, ForwardError> {
        to_bytes(body, self.max_body_bytes).await.map_err(|err| {
            if exceeded_limit(&err) {
                ForwardError::PayloadTooLarge {
                    limit: self.max_body_bytes,
                }
            } else {
                ForwardError::BodyRead {
                    reason: err.to_string(),
                }
            }
        })
    }
}

/// True if a body read stopped at the size limit rather than on a transport error.
fn exceeded_limit(err: &axum::Error) -> bool {
    let mut source: Option<&(dyn StdError + 'static)> = Some(err);
    while let Some(e) = source {
        if e.is::<LengthLimitError>() {
            return true;
        }
        source = e.source();
    }
    false
}
