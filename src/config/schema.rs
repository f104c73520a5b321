//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the proxy
//! and its control surface. All types derive Serde traits for
//! deserialization from the TOML config file; every field carries a default
//! so the zero-config container deployment behaves like the original.

use serde::{Deserialize, Serialize};

/// Root configuration.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct AppConfig {
    /// Listener configuration (bind address).
    pub listener: ListenerConfig,

    /// Viewer backend the proxy forwards to.
    pub upstream: UpstreamConfig,

    /// Durable state written by the control surface.
    pub storage: StorageConfig,

    /// Reachability probe settings.
    pub probe: ProbeConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:8080").
    pub bind_address: String,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
        }
    }
}

/// Viewer backend target.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct UpstreamConfig {
    /// Base URL of the log viewer backend. Plain HTTP/1.1; its `/` path
    /// doubles as the liveness probe target.
    pub address: String,
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            address: "http://127.0.0.1:8081".to_string(),
        }
    }
}

/// Durable-state location.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Directory holding the env file, SSH key material, and reload marker.
    pub data_dir: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_dir: "/app/data".to_string(),
        }
    }
}

/// Reachability probe settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ProbeConfig {
    /// Path probed on the remote runtime; 200 means healthy.
    pub health_path: String,

    /// Timeout for the implicit status probes, in seconds.
    pub status_timeout_secs: u64,

    /// Timeout for the operator-triggered test probe, in seconds.
    pub test_timeout_secs: u64,

    /// Local address an external SSH tunnel is expected to listen on.
    /// `ssh://` endpoints are always probed here, never directly.
    pub tunnel_address: String,
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self {
            health_path: "/_ping".to_string(),
            status_timeout_secs: 2,
            test_timeout_secs: 4,
            tunnel_address: "127.0.0.1:2375".to_string(),
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Default tracing filter used when RUST_LOG is unset.
    pub log_level: String,

    /// Enable the Prometheus metrics exporter.
    pub metrics_enabled: bool,

    /// Metrics exporter bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "remote_log_proxy=info,tower_http=info".to_string(),
            metrics_enabled: false,
            metrics_address: "127.0.0.1:9090".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_original_deployment() {
        let config = AppConfig::default();
        assert_eq!(config.listener.bind_address, "0.0.0.0:8080");
        assert_eq!(config.upstream.address, "http://127.0.0.1:8081");
        assert_eq!(config.storage.data_dir, "/app/data");
        assert_eq!(config.probe.health_path, "/_ping");
        assert_eq!(config.probe.status_timeout_secs, 2);
        assert_eq!(config.probe.test_timeout_secs, 4);
        assert_eq!(config.probe.tunnel_address, "127.0.0.1:2375");
        assert!(!config.observability.metrics_enabled);
    }

    #[test]
    fn partial_toml_keeps_other_defaults() {
        let config: AppConfig =
            toml::from_str("[listener]\nbind_address = \"127.0.0.1:9999\"").unwrap();
        assert_eq!(config.listener.bind_address, "127.0.0.1:9999");
        assert_eq!(config.upstream.address, "http://127.0.0.1:8081");
        assert_eq!(config.probe.tunnel_address, "127.0.0.1:2375");
    }
}
