//! Remote Log Proxy
//!
//! A small control plane in front of a container-log viewer. The proxy
//! forwards everything to the viewer backend except `/config`, where an
//! operator points the viewer at a remote Docker endpoint, persists that
//! choice, and checks reachability.
//!
//! # Architecture Overview
//!
//! ```text
//!                 ┌──────────────────────────────────────────────┐
//!                 │               REMOTE LOG PROXY               │
//!                 │                                              │
//!  /config  ──────┼─▶ http/control ──▶ endpoint (validate)       │
//!                 │        │      ──▶ store    (env.sh, SSH key) │
//!                 │        │      ──▶ reload   (marker file)     │
//!                 │        └─────▶ health     (probe remote)     │
//!                 │                                              │
//!  everything ────┼─▶ http/proxy ────────────────▶ viewer backend│
//!  else           │                                              │
//!                 │  config: TOML schema/loader/validation/paths │
//!                 │  observability: tracing + Prometheus metrics │
//!                 └──────────────────────────────────────────────┘
//! ```
//!
//! The external supervisor that watches the reload marker and actually
//! re-establishes the Docker connection or SSH tunnel is not part of
//! this crate; the contract here ends at writing the marker.

// Core subsystems
pub mod config;
pub mod endpoint;
pub mod http;
pub mod reload;
pub mod store;

// Cross-cutting concerns
pub mod health;
pub mod observability;

pub use config::{load_or_default, AppConfig, ConfigError};
pub use http::HttpServer;
