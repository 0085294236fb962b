//! Upstream hostname allowlist.
//!
//! # Responsibilities
//! - Decide whether a target hostname may be forwarded to
//! - Support strict label-boundary matching and the legacy string-suffix match
//!
//! # Design Decisions
//! - Entries are normalized to lowercase (URL parsing lowercases hostnames)
//! - Entry order is preserved; the first matching entry is reported
//! - Blank entries are dropped; an empty allowlist permits nothing

use crate::config::HostMatch;

/// An ordered set of permitted hostname suffixes.
#[derive(Debug, Clone)]
pub struct HostAllowlist {
    entries: Vec<String>,
    mode: HostMatch,
}

impl HostAllowlist {
    pub fn new<I, S>(entries: I, mode: HostMatch) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            entries: entries
                .into_iter()
                .map(|e| e.as_ref().trim().trim_end_matches('.').to_ascii_lowercase())
                .filter(|e| !e.is_empty())
                .collect(),
            mode,
        }
    }

    /// Returns the entry that admits `host`, if any.
    pub fn matching_entry(&self, host: &str) -> Option<&str> {
        let host = host.trim_end_matches('.');
        self.entries
            .iter()
            .find(|entry| match self.mode {
                HostMatch::Suffix => host.ends_with(entry.as_str()),
                HostMatch::Label => {
                    host == entry.as_str()
                        || host
                            .strip_suffix(entry.as_str())
                            .is_some_and(|rest| rest.ends_with('.'))
                }
            })
            .map(String::as_str)
    }

    /// Returns true if `host` may be forwarded to.
    pub fn permits(&self, host: &str) -> bool {
        self.matching_entry(host).is_some()
    }

    pub fn entries(&self) -> &[String] {
        &self.entries
    }

    pub fn mode(&self) -> HostMatch {
        self.mode
    }
}
