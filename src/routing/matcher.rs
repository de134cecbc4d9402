//! Site matching logic.
//!
//! # Responsibilities
//! - Match parsed hostname (exact match, case-insensitive)
//! - Match parsed port when the site pins one
//! - Match path prefix (case-sensitive)
//! - Combine conditions with AND semantics
//!
//! # Design Decisions
//! - Matchers read `RequestParams`, never the raw `Host` header, so
//!   `example.com` and `example.com:80` are the same site on plaintext
//! - Host matching is case-insensitive (RFC 9110 host names)
//! - Path matching is case-sensitive
//! - No regex to guarantee O(n) matching

use crate::http::RequestParams;

/// Trait for matching requests against conditions.
pub trait Matcher: Send + Sync + std::fmt::Debug {
    /// Returns true if the request matches this condition.
    fn matches(&self, params: &RequestParams) -> bool;
}

/// Matches hostname and, optionally, port.
#[derive(Debug, Clone)]
pub struct HostMatcher {
    expected_host: String,
    expected_port: Option<u16>,
}

impl HostMatcher {
    /// Create a new host matcher.
    /// The host is normalized to lowercase for case-insensitive matching.
    pub fn new(host: impl Into<String>, port: Option<u16>) -> Self {
        Self {
            expected_host: host.into().to_lowercase(),
            expected_port: port,
        }
    }
}

impl Matcher for HostMatcher {
    fn matches(&self, params: &RequestParams) -> bool {
        params.hostname.eq_ignore_ascii_case(&self.expected_host)
            && self.expected_port.map_or(true, |port| port == params.port)
    }
}

/// Matches the request path prefix.
#[derive(Debug, Clone)]
pub struct PathPrefixMatcher {
    prefix: String,
}

impl PathPrefixMatcher {
    /// Create a new path prefix matcher.
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }
}

impl Matcher for PathPrefixMatcher {
    fn matches(&self, params: &RequestParams) -> bool {
        params.path.starts_with(&self.prefix)
    }
}

/// Combines multiple matchers with AND semantics.
#[derive(Debug)]
pub struct AndMatcher {
    matchers: Vec<Box<dyn Matcher>>,
}

impl AndMatcher {
    pub fn new(matchers: Vec<Box<dyn Matcher>>) -> Self {
        Self { matchers }
    }
}

impl Matcher for AndMatcher {
    fn matches(&self, params: &RequestParams) -> bool {
        self.matchers.iter().all(|m| m.matches(params))
    }
}
