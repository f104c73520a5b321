//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Check that addresses parse before anything binds or probes
//! - Validate value ranges (timeouts nonzero, paths absolute)
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: AppConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::net::SocketAddr;

use thiserror::Error;
use url::Url;

use crate::config::schema::AppConfig;

/// A single semantic problem with the configuration.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("listener.bind_address {0:?} is not a socket address")]
    BindAddress(String),

    #[error("upstream.address {0:?} must be an absolute http:// URL with a host")]
    UpstreamAddress(String),

    #[error("storage.data_dir must not be empty")]
    DataDir,

    #[error("probe.health_path {0:?} must start with '/'")]
    HealthPath(String),

    #[error("probe.{0} must be greater than zero")]
    ZeroTimeout(&'static str),

    #[error("probe.tunnel_address {0:?} is not a socket address")]
    TunnelAddress(String),

    #[error("observability.metrics_address {0:?} is not a socket address")]
    MetricsAddress(String),
}

/// Validate a deserialized configuration, collecting every error.
pub fn validate_config(config: &AppConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::BindAddress(
            config.listener.bind_address.clone(),
        ));
    }

    match Url::parse(&config.upstream.address) {
        Ok(url) if url.scheme() == "http" && url.host_str().is_some_and(|h| !h.is_empty()) => {}
        _ => errors.push(ValidationError::UpstreamAddress(
            config.upstream.address.clone(),
        )),
    }

    if config.storage.data_dir.trim().is_empty() {
        errors.push(ValidationError::DataDir);
    }

    if !config.probe.health_path.starts_with('/') {
        errors.push(ValidationError::HealthPath(config.probe.health_path.clone()));
    }
    if config.probe.status_timeout_secs == 0 {
        errors.push(ValidationError::ZeroTimeout("status_timeout_secs"));
    }
    if config.probe.test_timeout_secs == 0 {
        errors.push(ValidationError::ZeroTimeout("test_timeout_secs"));
    }
    if config.probe.tunnel_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::TunnelAddress(
            config.probe.tunnel_address.clone(),
        ));
    }

    if config.observability.metrics_enabled
        && config
            .observability
            .metrics_address
            .parse::<SocketAddr>()
            .is_err()
    {
        errors.push(ValidationError::MetricsAddress(
            config.observability.metrics_address.clone(),
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
