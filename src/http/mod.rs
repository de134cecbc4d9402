//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP/TLS connection
//!     → server.rs (Axum setup, request ID, limits, body buffering)
//!     → raw.rs (read-only view + connection encryption flag)
//!     → params.rs (build RequestParams)
//!         → host.rs (hostname + port, scheme-default port)
//!     → routing (virtual host lookup)
//!     → JSON response
//! ```

pub mod host;
pub mod params;
pub mod raw;
pub mod request_id;
pub mod server;

pub use host::{parse_host, parse_host_str, HostPort, PortSource};
pub use params::{build, RequestParams};
pub use raw::{ConnectionInfo, RawRequest};
pub use request_id::X_REQUEST_ID;
pub use server::{HttpServer, ServerError};
