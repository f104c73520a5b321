//! Reachability probing.
//!
//! # Data Flow
//! ```text
//! raw host descriptor
//!     → endpoint codec (scheme + authority)
//!     → tcp: GET http://host:port/_ping        (direct)
//!       ssh: GET http://127.0.0.1:2375/_ping   (local tunnel, never
//!                                                the remote host)
//!     → elapsed ms on 200, classified failure otherwise
//! ```
//!
//! # Design Decisions
//! - Probe failures render as status strings; they never cross the
//!   request boundary as errors and are never retried automatically
//! - Two timeouts: short for the implicit status grid, longer for the
//!   operator-triggered test button

pub mod probe;

pub use probe::{ProbeError, Prober, RemoteStatus, Severity};
