//! Host header parsing.
//!
//! # Responsibilities
//! - Split a `Host` value (or request-target authority) into hostname and port
//! - Infer the port from the connection scheme when none is given
//!
//! # Design Decisions
//! - Total function: every input yields a value, never an error
//! - A malformed, zero or out-of-range port suffix is dropped and the
//!   scheme-default port is used instead; the hostname is kept
//! - IPv6 literals (`[::1]:8080`) are returned without their brackets
//! - Hostname is returned as written (no case folding, no trailing-dot strip)

use std::fmt;

/// Port assumed for plaintext connections without an explicit port.
pub const HTTP_DEFAULT_PORT: u16 = 80;

/// Port assumed for encrypted connections without an explicit port.
pub const HTTPS_DEFAULT_PORT: u16 = 443;

/// Hostname and port extracted from a host string.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct HostPort {
    pub hostname: String,
    pub port: u16,
}

impl fmt::Display for HostPort {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.hostname.contains(':') {
            write!(f, "[{}]:{}", self.hostname, self.port)
        } else {
            write!(f, "{}:{}", self.hostname, self.port)
        }
    }
}

/// Where the port of a [`HostPort`] came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PortSource {
    /// A valid port suffix was present.
    Explicit,
    /// No port suffix; the scheme default was used.
    Default,
    /// A port suffix was present but unusable; the scheme default was used.
    Rejected,
}

/// Result of [`parse_host`], keeping track of how the port was chosen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedHost {
    pub host_port: HostPort,
    pub port_source: PortSource,
}

/// Default port for the connection scheme.
pub fn default_port(https: bool) -> u16 {
    if https {
        HTTPS_DEFAULT_PORT
    } else {
        HTTP_DEFAULT_PORT
    }
}

/// Parse a host string into a hostname and port.
///
/// ```
/// use lite_httpd::http::host::parse_host_str;
///
/// let hp = parse_host_str("example.com:8443", true);
/// assert_eq!(hp.hostname, "example.com");
/// assert_eq!(hp.port, 8443);
///
/// let hp = parse_host_str("[::1]", false);
/// assert_eq!(hp.hostname, "::1");
/// assert_eq!(hp.port, 80);
/// ```
pub fn parse_host_str(host: &str, https: bool) -> HostPort {
    parse_host(host, https).host_port
}

/// Same as [`parse_host_str`], also reporting whether the port was explicit,
/// defaulted or rejected.
pub fn parse_host(host: &str, https: bool) -> ParsedHost {
    let (hostname, suffix) = split_host(host);

    let (port, port_source) = match suffix {
        None => (default_port(https), PortSource::Default),
        Some(raw) => match parse_port(raw) {
            Some(port) => (port, PortSource::Explicit),
            None => (default_port(https), PortSource::Rejected),
        },
    };

    ParsedHost {
        host_port: HostPort {
            hostname: hostname.to_string(),
            port,
        },
        port_source,
    }
}

/// Split off the raw port suffix, respecting IPv6 literal brackets.
fn split_host(host: &str) -> (&str, Option<&str>) {
    if let Some(rest) = host.strip_prefix('[') {
        return match rest.split_once(']') {
            Some((literal, "")) => (literal, None),
            // Anything after the bracket that is not `:port` ends up rejected.
            Some((literal, tail)) => {
                (literal, Some(tail.strip_prefix(':').unwrap_or(tail)))
            }
            // Unterminated literal.
            None => (host, None),
        };
    }

    match host.split_once(':') {
        Some((name, port)) if !port.contains(':') => (name, Some(port)),
        // Bare IPv6 address or no colon at all: no port.
        _ => (host, None),
    }
}

fn parse_port(raw: &str) -> Option<u16> {
    if raw.is_empty() || !raw.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    raw.parse::<u16>().ok().filter(|port| *port != 0)
}
