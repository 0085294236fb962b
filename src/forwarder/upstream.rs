//! Upstream dispatch.
//!
//! # Responsibilities
//! - Send one outbound request and materialize the full response
//! - Apply the redirect policy and connect timeout
//! - Bound the whole exchange with the upstream deadline
//!
//! # Design Decisions
//! - One shared client per process; connections are pooled per host
//! - Transport failures keep their full `source()` chain in the message
//! - No retries: a single failed attempt is reported as-is

use std::error::Error as StdError;
use std::future::Future;
use std::time::Duration;

use axum::body::Bytes;
use axum::http::header::CONTENT_TYPE;
use axum::http::{HeaderMap, HeaderValue, Method, StatusCode};
use reqwest::redirect::Policy;
use thiserror::Error;
use url::Url;

use crate::config::{ForwarderConfig, TimeoutConfig};
use crate::resilience::timeouts::with_deadline;

/// A fully rewritten request, ready to leave the gateway.
#[derive(Debug, Clone)]
pub struct OutboundRequest {
    pub method: Method,
    pub url: Url,
    pub headers: HeaderMap,
    /// `None` for GET and HEAD.
    pub body: Option<Bytes>,
}

/// An upstream response with its body already read into memory.
#[derive(Debug, Clone)]
pub struct UpstreamResponse {
    pub status: StatusCode,
    pub content_type: Option<HeaderValue>,
    pub body: Bytes,
}

/// The upstream could not be reached or did not answer in time.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct UpstreamFailure {
    message: String,
}

impl UpstreamFailure {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    /// Flatten an error and its sources into `outer: inner: root`.
    pub fn from_error(err: &(dyn StdError + 'static)) -> Self {
        let mut message = err.to_string();
        let mut source = err.source();
        while let Some(cause) = source {
            let text = cause.to_string();
            if !message.ends_with(&text) {
                message.push_str(": ");
                message.push_str(&text);
            }
            source = cause.source();
        }
        Self { message }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

/// Something that can carry an [`OutboundRequest`] to its target.
pub trait Upstream: Send + Sync + 'static {
    fn send(
        &self,
        request: OutboundRequest,
    ) -> impl Future<Output = Result<UpstreamResponse, UpstreamFailure>> + Send;
}

/// [`Upstream`] backed by a pooled HTTP(S) client.
#[derive(Debug, Clone)]
pub struct HttpUpstream {
    client: reqwest::Client,
    deadline: Duration,
}

impl HttpUpstream {
    pub fn new(forwarder: &ForwarderConfig, timeouts: &TimeoutConfig) -> Result<Self, reqwest::Error> {
        let redirect = if forwarder.follow_redirects {
            Policy::limited(forwarder.max_redirects)
        } else {
            Policy::none()
        };

        let client = reqwest::Client::builder()
            .redirect(redirect)
            .connect_timeout(Duration::from_secs(timeouts.connect_secs))
            .build()?;

        Ok(Self {
            client,
            deadline: Duration::from_secs(timeouts.upstream_secs),
        })
    }

    async fn exchange(&self, request: OutboundRequest) -> Result<UpstreamResponse, reqwest::Error> {
        let OutboundRequest {
            method,
            url,
            headers,
            body,
        } = request;

        let mut builder = self.client.request(method, url).headers(headers);
        if let Some(body) = body {
            builder = builder.body(body);
        }

        let response = builder.send().await?;
        let status = response.status();
        let content_type = response.headers().get(CONTENT_TYPE).cloned();
        let body = response.bytes().await?;

        Ok(UpstreamResponse {
            status,
            content_type,
            body,
        })
    }
}

impl Upstream for HttpUpstream {
    fn send(
        &self,
        request: OutboundRequest,
    ) -> impl Future<Output = Result<UpstreamResponse, UpstreamFailure>> + Send {
        async move {
            match with_deadline(self.deadline, self.exchange(request)).await {
                Ok(Ok(response)) => Ok(response),
                Ok(Err(e)) => Err(UpstreamFailure::from_error(&e)),
                Err(elapsed) => Err(UpstreamFailure::from_error(&elapsed)),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fmt;

    #[derive(Debug)]
    struct Layer {
        text: &'static str,
        source: Option<Box<Layer>>,
    }

    impl fmt::Display for Layer {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str(self.text)
        }
    }

    impl StdError for Layer {
        fn source(&self) -> Option<&(dyn StdError + 'static)> {
            self.source.as_deref().map(|s| s as &(dyn StdError + 'static))
        }
    }

    #[test]
    fn test_failure_message_includes_sources() {
        let err = Layer {
            text: "error sending request",
            source: Some(Box::new(Layer {
                text: "client error (Connect)",
                source: Some(Box::new(Layer {
                    text: "connection refused",
                    source: None,
                })),
            })),
        };
        assert_eq!(
            UpstreamFailure::from_error(&err).message(),
            "error sending request: client error (Connect): connection refused"
        );
    }

    #[test]
    fn test_repeated_source_text_not_duplicated() {
        let err = Layer {
            text: "tcp connect error: connection refused",
            source: Some(Box::new(Layer {
                text: "connection refused",
                source: None,
            })),
        };
        assert_eq!(
            UpstreamFailure::from_error(&err).message(),
            "tcp connect error: connection refused"
        );
    }

    #[tokio::test]
    async fn test_unreachable_upstream_fails() {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let upstream = HttpUpstream::new(&ForwarderConfig::default(), &TimeoutConfig::default()).unwrap();
        let result = upstream
            .send(OutboundRequest {
                method: Method::GET,
                url: Url::parse(&format!("http://{addr}/")).unwrap(),
                headers: HeaderMap::new(),
                body: None,
            })
            .await;

        assert!(!result.unwrap_err().message().is_empty());
    }
}
