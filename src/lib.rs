//! Lightweight HTTP daemon.
//!
//! Every request is projected into a [`RequestParams`](http::RequestParams)
//! (method, path, headers, body, and a hostname/port pair resolved from the
//! `Host` header with the scheme-default port) before it reaches the virtual
//! host table.

pub mod config;
pub mod http;
pub mod lifecycle;
pub mod net;
pub mod observability;
pub mod routing;

pub use config::schema::ServerConfig;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
