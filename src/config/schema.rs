//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the gateway.
//! All types derive Serde traits for deserialization from config files, and
//! every field has a default so an empty file describes a working deployment.

use serde::{Deserialize, Serialize};

/// Root configuration for the gateway.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct ProxyConfig {
    /// Listener configuration (bind address).
    pub listener: ListenerConfig,

    /// Forwarding rules: route prefix, allowlist, outbound identity.
    pub forwarder: ForwarderConfig,

    /// Timeout configuration.
    pub timeouts: TimeoutConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:8080").
    pub bind_address: String,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
        }
    }
}

/// How a target hostname is compared against allowlist entries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum HostMatch {
    /// Hostname equals the entry or ends with `"." + entry`.
    #[default]
    Label,
    /// Hostname ends with the entry as a plain string.
    ///
    /// `eviltrap-disk.yandex.ru` passes an entry of `disk.yandex.ru` in this
    /// mode. Only use it where the legacy behavior is required.
    Suffix,
}

/// Forwarder configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ForwarderConfig {
    /// Path prefix that introduces the encoded target URL.
    pub path_prefix: String,

    /// Hostnames (and their subdomains) that may be forwarded to.
    pub allowed_hosts: Vec<String>,

    /// Matching mode for `allowed_hosts`.
    pub host_match: HostMatch,

    /// Follow upstream redirects and relay the final response.
    pub follow_redirects: bool,

    /// Redirect hops allowed when `follow_redirects` is set.
    pub max_redirects: usize,

    /// Fixed User-Agent sent upstream.
    pub user_agent: String,

    /// Fixed Accept-Language sent upstream.
    pub accept_language: String,

    /// Largest inbound request body forwarded, in bytes.
    pub max_body_bytes: usize,
}

impl Default for ForwarderConfig {
    fn default() -> Self {
        Self {
            path_prefix: "/proxy/".to_string(),
            allowed_hosts: vec![
                "cloud-api.yandex.net".to_string(),
                "downloader.disk.yandex.ru".to_string(),
                "disk.yandex.ru".to_string(),
                "downloader.disk.yandex.net".to_string(),
            ],
            host_match: HostMatch::Label,
            follow_redirects: true,
            max_redirects: 10,
            user_agent: "Mozilla/5.0 ScheduleApp/1.0".to_string(),
            accept_language: "ru".to_string(),
            max_body_bytes: 10 * 1024 * 1024, // 10MB
        }
    }
}

/// Timeout configuration for upstream calls.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Connection establishment timeout in seconds.
    pub connect_secs: u64,

    /// Deadline for the whole upstream exchange (send, redirects, body read) in seconds.
    pub upstream_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            connect_secs: 10,
            upstream_secs: 30,
        }
    }
}

/// Log line layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Full,
    Compact,
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Log line layout.
    pub log_format: LogFormat,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_format: LogFormat::Full,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_file_yields_defaults() {
        let config: ProxyConfig = toml::from_str("").unwrap();
        assert_eq!(config.forwarder.path_prefix, "/proxy/");
        assert_eq!(config.forwarder.allowed_hosts.len(), 4);
        assert_eq!(config.forwarder.host_match, HostMatch::Label);
        assert!(config.forwarder.follow_redirects);
        assert_eq!(config.timeouts.upstream_secs, 30);
    }

    #[test]
    fn test_partial_section_keeps_other_defaults() {
        let config: ProxyConfig = toml::from_str(
            r#"
            [forwarder]
            allowed_hosts = ["api.example.com"]
            host_match = "suffix"
            "#,
        )
        .unwrap();
        assert_eq!(config.forwarder.allowed_hosts, vec!["api.example.com"]);
        assert_eq!(config.forwarder.host_match, HostMatch::Suffix);
        assert_eq!(config.forwarder.accept_language, "ru");
        assert_eq!(config.listener.bind_address, "0.0.0.0:8080");
    }

    #[test]
    fn test_unknown_host_match_is_rejected() {
        let result: Result<ProxyConfig, _> = toml::from_str(
            r#"
            [forwarder]
            host_match = "regex"
            "#,
        );
        assert!(result.is_err());
    }
}
