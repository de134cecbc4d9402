//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Check referential integrity (default site exists)
//! - Validate value ranges (timeouts > 0, ports valid)
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: ServerConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::collections::HashSet;
use std::net::SocketAddr;

use thiserror::Error;

use crate::config::schema::ServerConfig;

/// A single semantic problem in the configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("invalid {field} address: {value}")]
    InvalidAddress { field: &'static str, value: String },

    #[error("{0} must be greater than zero")]
    Zero(&'static str),

    #[error("TLS {0} path is empty")]
    EmptyTlsPath(&'static str),

    #[error("site #{0} has an empty name")]
    EmptySiteName(usize),

    #[error("site '{0}' is defined more than once")]
    DuplicateSite(String),

    #[error("site '{0}' has an empty hostname")]
    EmptyHostname(String),

    #[error("site '{0}' has port 0")]
    ZeroPort(String),

    #[error("default site '{0}' does not exist")]
    UnknownDefaultSite(String),
}

/// Check a parsed configuration for semantic errors.
pub fn validate_config(config: &ServerConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::InvalidAddress {
            field: "listener.bind_address",
            value: config.listener.bind_address.clone(),
        });
    }

    if config.observability.metrics_enabled
        && config.observability.metrics_address.parse::<SocketAddr>().is_err()
    {
        errors.push(ValidationError::InvalidAddress {
            field: "observability.metrics_address",
            value: config.observability.metrics_address.clone(),
        });
    }

    if let Some(tls) = &config.listener.tls {
        if tls.cert_path.is_empty() {
            errors.push(ValidationError::EmptyTlsPath("cert"));
        }
        if tls.key_path.is_empty() {
            errors.push(ValidationError::EmptyTlsPath("key"));
        }
    }

    if config.timeouts.request_secs == 0 {
        errors.push(ValidationError::Zero("timeouts.request_secs"));
    }
    if config.limits.max_body_bytes == 0 {
        errors.push(ValidationError::Zero("limits.max_body_bytes"));
    }

    let mut names = HashSet::new();
    for (index, site) in config.sites.iter().enumerate() {
        if site.name.is_empty() {
            errors.push(ValidationError::EmptySiteName(index));
        } else if !names.insert(site.name.as_str()) {
            errors.push(ValidationError::DuplicateSite(site.name.clone()));
        }
        if site.hostname.is_empty() {
            errors.push(ValidationError::EmptyHostname(site.name.clone()));
        }
        if site.port == Some(0) {
            errors.push(ValidationError::ZeroPort(site.name.clone()));
        }
    }

    if let Some(default_site) = &config.server.default_site {
        if !names.contains(default_site.as_str()) {
            errors.push(ValidationError::UnknownDefaultSite(default_site.clone()));
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
