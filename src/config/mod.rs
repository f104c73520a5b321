//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML, optional)
//!     → loader.rs (parse & deserialize, defaults when absent)
//!     → validation.rs (semantic checks)
//!     → AppConfig (validated, immutable)
//!     → shared by value to the server at startup
//!
//! paths.rs derives every on-disk location (env.sh, SSH key,
//! reload marker) from the configured data directory.
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded; restart to change it
//! - All fields have defaults so the service runs with no file at all
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod paths;
pub mod schema;
pub mod validation;

pub use loader::{load_or_default, ConfigError};
pub use paths::StoragePaths;
pub use schema::{AppConfig, ObservabilityConfig, ProbeConfig};
