//! Read-only view of a fully received request.
//!
//! The params builder only needs a handful of accessors from the transport.
//! They are collected in [`RawRequest`] so the builder never depends on how
//! the request was received, and implemented for `Request<Bytes>` which is
//! what the server hands over once the body has been buffered.

use std::net::SocketAddr;

use axum::body::Bytes;
use axum::http::{uri::Scheme, HeaderMap, Method, Request, Version};

/// Transport facts about the connection a request arrived on.
///
/// Inserted as a request extension by the server before the params are built.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConnectionInfo {
    /// Whether the connection is TLS-encrypted.
    pub encrypted: bool,
    /// Peer address, when known.
    pub remote_addr: Option<SocketAddr>,
}

/// Accessors the params builder reads from a raw request.
pub trait RawRequest {
    /// Value of the named header, if present and valid visible ASCII.
    fn header(&self, name: &str) -> Option<&str>;

    /// `host[:port]` component of the request target, without userinfo.
    fn authority(&self) -> Option<&str>;

    fn method(&self) -> &Method;

    fn path(&self) -> &str;

    fn query(&self) -> Option<&str>;

    fn version(&self) -> Version;

    fn headers(&self) -> &HeaderMap;

    fn body(&self) -> &Bytes;

    /// Whether the request arrived over an encrypted connection.
    fn is_encrypted(&self) -> bool;

    fn remote_addr(&self) -> Option<SocketAddr>;
}

impl RawRequest for Request<Bytes> {
    fn header(&self, name: &str) -> Option<&str> {
        Request::headers(self).get(name).and_then(|v| v.to_str().ok())
    }

    fn authority(&self) -> Option<&str> {
        self.uri().authority().map(|authority| {
            let raw = authority.as_str();
            raw.rsplit_once('@').map_or(raw, |(_, host)| host)
        })
    }

    fn method(&self) -> &Method {
        Request::method(self)
    }

    fn path(&self) -> &str {
        self.uri().path()
    }

    fn query(&self) -> Option<&str> {
        self.uri().query()
    }

    fn version(&self) -> Version {
        Request::version(self)
    }

    fn headers(&self) -> &HeaderMap {
        Request::headers(self)
    }

    fn body(&self) -> &Bytes {
        Request::body(self)
    }

    fn is_encrypted(&self) -> bool {
        match self.extensions().get::<ConnectionInfo>() {
            Some(info) => info.encrypted,
            None => self.uri().scheme() == Some(&Scheme::HTTPS),
        }
    }

    fn remote_addr(&self) -> Option<SocketAddr> {
        self.extensions()
            .get::<ConnectionInfo>()
            .and_then(|info| info.remote_addr)
    }
}
