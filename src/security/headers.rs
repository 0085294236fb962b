//! Outbound header rewriting.
//!
//! # Responsibilities
//! - Build the complete header set sent upstream
//! - Carry over the caller's `Accept` preference and nothing else
//!
//! # Design Decisions
//! - Inbound headers are never copied wholesale: no cookies, no
//!   authorization, no caller override of the fixed identity
//! - Multiple inbound `Accept` values are joined with ", "
//! - An absent or empty `Accept` becomes `*/*`

use axum::http::header::{ACCEPT, ACCEPT_LANGUAGE, USER_AGENT};
use axum::http::header::InvalidHeaderValue;
use axum::http::{HeaderMap, HeaderValue};

const ACCEPT_ANY: &str = "*/*";

/// The fixed identity presented to upstreams.
#[derive(Debug, Clone)]
pub struct OutboundHeaders {
    user_agent: HeaderValue,
    accept_language: HeaderValue,
}

impl OutboundHeaders {
    pub fn new(user_agent: &str, accept_language: &str) -> Result<Self, InvalidHeaderValue> {
        Ok(Self {
            user_agent: HeaderValue::from_str(user_agent)?,
            accept_language: HeaderValue::from_str(accept_language)?,
        })
    }

    /// Replace `inbound` entirely with the outbound header set.
    pub fn rewrite(&self, inbound: &HeaderMap) -> HeaderMap {
        let mut headers = HeaderMap::with_capacity(3);
        headers.insert(USER_AGENT, self.user_agent.clone());
        headers.insert(ACCEPT, forwarded_accept(inbound));
        headers.insert(ACCEPT_LANGUAGE, self.accept_language.clone());
        headers
    }
}

fn forwarded_accept(inbound: &HeaderMap) -> HeaderValue {
    let values: Vec<&[u8]> = inbound
        .get_all(ACCEPT)
        .iter()
        .map(HeaderValue::as_bytes)
        .filter(|v| !v.is_empty())
        .collect();

    match values.as_slice() {
        [] => HeaderValue::from_static(ACCEPT_ANY),
        [single] => HeaderValue::from_bytes(single)
            .unwrap_or_else(|_| HeaderValue::from_static(ACCEPT_ANY)),
        many => HeaderValue::from_bytes(&many.join(&b", "[..]))
            .unwrap_or_else(|_| HeaderValue::from_static(ACCEPT_ANY)),
    }
}
