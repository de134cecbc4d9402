//! Network layer subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming TCP connection
//!     → plaintext: axum::serve
//!     → encrypted: tls.rs (rustls handshake via axum-server)
//!     → Hand off to HTTP layer with the encryption flag
//! ```

pub mod tls;
