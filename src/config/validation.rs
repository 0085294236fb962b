//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (timeouts > 0, body limit > 0)
//! - Check that fixed outbound headers are representable
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: ProxyConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::net::SocketAddr;

use axum::http::HeaderValue;
use thiserror::Error;

use crate::config::schema::ProxyConfig;

/// A single semantic problem in a configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("listener.bind_address '{0}' is not a socket address")]
    BindAddress(String),

    #[error("forwarder.path_prefix '{0}' must start and end with '/'")]
    PathPrefix(String),

    #[error("forwarder.allowed_hosts must not be empty")]
    EmptyAllowlist,

    #[error("forwarder.allowed_hosts entry '{0}' is not a hostname")]
    AllowlistEntry(String),

    #[error("forwarder.max_redirects must be > 0 when follow_redirects is set")]
    MaxRedirects,

    #[error("forwarder.max_body_bytes must be > 0")]
    MaxBodyBytes,

    #[error("forwarder.{field} is not a valid header value")]
    HeaderValue { field: &'static str },

    #[error("timeouts.{field} must be > 0")]
    Timeout { field: &'static str },
}

/// Check a parsed configuration, collecting every problem found.
pub fn validate_config(config: &ProxyConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::BindAddress(config.listener.bind_address.clone()));
    }

    let forwarder = &config.forwarder;
    let prefix = &forwarder.path_prefix;
    if !(prefix.starts_with('/') && prefix.ends_with('/')) {
        errors.push(ValidationError::PathPrefix(prefix.clone()));
    }

    if forwarder.allowed_hosts.is_empty() {
        errors.push(ValidationError::EmptyAllowlist);
    }
    for entry in &forwarder.allowed_hosts {
        if entry.trim().is_empty() || entry.starts_with('.') || entry.contains(char::is_whitespace) {
            errors.push(ValidationError::AllowlistEntry(entry.clone()));
        }
    }

    if forwarder.follow_redirects && forwarder.max_redirects == 0 {
        errors.push(ValidationError::MaxRedirects);
    }
    if forwarder.max_body_bytes == 0 {
        errors.push(ValidationError::MaxBodyBytes);
    }

    if HeaderValue::from_str(&forwarder.user_agent).is_err() {
        errors.push(ValidationError::HeaderValue { field: "user_agent" });
    }
    if HeaderValue::from_str(&forwarder.accept_language).is_err() {
        errors.push(ValidationError::HeaderValue { field: "accept_language" });
    }

    if config.timeouts.connect_secs == 0 {
        errors.push(ValidationError::Timeout { field: "connect_secs" });
    }
    if config.timeouts.upstream_secs == 0 {
        errors.push(ValidationError::Timeout { field: "upstream_secs" });
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
