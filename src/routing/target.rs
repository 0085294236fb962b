//! Target extraction from the inbound request line.
//!
//! # Responsibilities
//! - Match the route prefix (case-sensitive)
//! - Re-attach the inbound query string to the encoded remainder
//! - Percent-decode strictly (malformed escapes and invalid UTF-8 fail)
//! - Parse the result as an absolute URL with a host
//!
//! # Design Decisions
//! - Works on the raw path so `%2F` in the target survives until decoding
//! - An empty query (`?` alone) appends nothing
//! - Scheme is not restricted here; the upstream client rejects what it cannot speak

use std::borrow::Cow;

use axum::http::Uri;
use url::Url;

use crate::error::ForwardError;

/// A validated, absolute upstream URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Target {
    url: Url,
    host: String,
}

impl Target {
    pub fn url(&self) -> &Url {
        &self.url
    }

    /// Hostname as normalized by URL parsing (lowercase, IPv6 in brackets).
    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn into_url(self) -> Url {
        self.url
    }
}

/// Resolves `<prefix><percent-encoded URL>[?query]` into a [`Target`].
#[derive(Debug, Clone)]
pub struct TargetResolver {
    prefix: String,
}

impl TargetResolver {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Route-match, decode and parse the target carried by `uri`.
    pub fn resolve(&self, uri: &Uri) -> Result<Target, ForwardError> {
        let encoded = self.encoded_target(uri)?;
        let decoded = percent_decode(&encoded)?;
        parse_target(&decoded)
    }

    fn encoded_target(&self, uri: &Uri) -> Result<String, ForwardError> {
        let remainder = uri
            .path()
            .strip_prefix(self.prefix.as_str())
            .ok_or_else(|| ForwardError::Route {
                prefix: self.prefix.clone(),
            })?;

        let mut encoded = remainder.to_string();
        if let Some(query) = uri.query().filter(|q| !q.is_empty()) {
            encoded.push('?');
            encoded.push_str(query);
        }
        Ok(encoded)
    }
}

/// Decode `%XX` escapes, failing on truncated or non-hex escapes and on
/// byte sequences that are not UTF-8. `+` is left as-is.
pub fn percent_decode(input: &str) -> Result<String, ForwardError> {
    let bytes = input.as_bytes();
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'%' {
            let escape = bytes.get(i + 1..i + 3).ok_or(ForwardError::Decode)?;
            if !escape.iter().all(|b| b.is_ascii_hexdigit()) {
                return Err(ForwardError::Decode);
            }
            i += 3;
        } else {
            i += 1;
        }
    }

    urlencoding::decode(input)
        .map(Cow::into_owned)
        .map_err(|_| ForwardError::Decode)
}

fn parse_target(decoded: &str) -> Result<Target, ForwardError> {
    let url = Url::parse(decoded).map_err(|e| ForwardError::Parse {
        reason: e.to_string(),
    })?;

    let host = match url.host_str() {
        Some(host) if !host.is_empty() => host.to_string(),
        _ => {
            return Err(ForwardError::Parse {
                reason: "target has no host".to_string(),
            })
        }
    };

    Ok(Target { url, host })
}
