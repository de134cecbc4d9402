//! Projection of a raw request into [`RequestParams`].
//!
//! # Responsibilities
//! - Pick the host source (`Host` header, then request-target authority)
//! - Resolve hostname and port through [`parse_host`](crate::http::host::parse_host)
//! - Copy method, path, query, headers and body handle as-is
//!
//! # Design Decisions
//! - Never fails: a missing host gives an empty hostname, a bad port gives
//!   the scheme default. Routing decides what to do with either.
//! - The raw request is only read, never modified or retained
//! - The body is a `Bytes` handle, so copying it does not copy the payload

use std::borrow::Cow;
use std::net::SocketAddr;

use axum::body::Bytes;
use axum::http::{header, HeaderMap, Method, Version};
use serde::Serialize;

use crate::http::host::{parse_host, HostPort, ParsedHost, PortSource, HTTP_DEFAULT_PORT};
use crate::http::raw::RawRequest;
use crate::http::request_id::X_REQUEST_ID;
use crate::observability::metrics;

/// Normalized request handed to routing and handlers.
#[derive(Debug, Clone)]
pub struct RequestParams {
    pub hostname: String,
    pub port: u16,
    /// Encryption state the default port was derived from.
    pub https: bool,
    pub method: Method,
    pub path: String,
    pub query: Option<String>,
    pub version: Version,
    pub headers: HeaderMap,
    pub body: Bytes,
    pub remote_addr: Option<SocketAddr>,
    pub request_id: Option<String>,
}

impl Default for RequestParams {
    fn default() -> Self {
        Self {
            hostname: String::new(),
            port: HTTP_DEFAULT_PORT,
            https: false,
            method: Method::GET,
            path: String::new(),
            query: None,
            version: Version::HTTP_11,
            headers: HeaderMap::new(),
            body: Bytes::new(),
            remote_addr: None,
            request_id: None,
        }
    }
}

impl RequestParams {
    /// Build a fresh `RequestParams` from a raw request.
    pub fn from_raw<R: RawRequest + ?Sized>(request: &R) -> Self {
        let mut params = Self::default();
        build(&mut params, request);
        params
    }

    /// Hostname and port as a pair.
    pub fn host_port(&self) -> HostPort {
        HostPort {
            hostname: self.hostname.clone(),
            port: self.port,
        }
    }

    /// Borrowed, serializable view used for echo responses and logs.
    pub fn summary(&self) -> ParamsSummary<'_> {
        ParamsSummary {
            method: self.method.as_str(),
            path: &self.path,
            query: self.query.as_deref(),
            hostname: &self.hostname,
            port: self.port,
            https: self.https,
            version: format!("{:?}", self.version),
            headers: self
                .headers
                .iter()
                .map(|(name, value)| HeaderView {
                    name: name.as_str(),
                    value: String::from_utf8_lossy(value.as_bytes()),
                })
                .collect(),
            body_len: self.body.len(),
            remote_addr: self.remote_addr.map(|addr| addr.to_string()),
            request_id: self.request_id.as_deref(),
        }
    }
}

/// Populate `params` from `request`.
///
/// Every field of `params` is overwritten.
pub fn build<R: RawRequest + ?Sized>(params: &mut RequestParams, request: &R) {
    let https = request.is_encrypted();

    let host = request
        .header(header::HOST.as_str())
        .or_else(|| request.authority())
        .unwrap_or_default();

    let parsed = parse_host(host, https);
    if let Some(reason) = fallback_reason(&parsed) {
        tracing::debug!(
            host = %host,
            resolved = %parsed.host_port,
            path = %request.path(),
            reason,
            "Host resolved with fallback"
        );
        metrics::record_host_fallback(reason);
    }

    params.hostname = parsed.host_port.hostname;
    params.port = parsed.host_port.port;
    params.https = https;
    params.method = request.method().clone();
    params.path = request.path().to_string();
    params.query = request.query().map(str::to_string);
    params.version = request.version();
    params.headers = request.headers().clone();
    params.body = request.body().clone();
    params.remote_addr = request.remote_addr();
    params.request_id = request.header(X_REQUEST_ID).map(str::to_string);
}

/// Why a host needed a fallback: a rejected port suffix, or no hostname at
/// all (absent host, or a value like `:8080` or `[]`).
fn fallback_reason(parsed: &ParsedHost) -> Option<&'static str> {
    match parsed.port_source {
        PortSource::Rejected => Some("malformed_port"),
        _ if parsed.host_port.hostname.is_empty() => Some("missing_host"),
        _ => None,
    }
}

/// Serializable view of [`RequestParams`].
#[derive(Debug, Serialize)]
pub struct ParamsSummary<'a> {
    pub method: &'a str,
    pub path: &'a str,
    pub query: Option<&'a str>,
    pub hostname: &'a str,
    pub port: u16,
    pub https: bool,
    pub version: String,
    pub headers: Vec<HeaderView<'a>>,
    pub body_len: usize,
    pub remote_addr: Option<String>,
    pub request_id: Option<&'a str>,
}

#[derive(Debug, Serialize)]
pub struct HeaderView<'a> {
    pub name: &'a str,
    pub value: Cow<'a, str>,
}
