//! HTTP surface: control pages, JSON control API, proxy passthrough.
//!
//! # Data Flow
//! ```text
//! inbound request
//!     → server.rs (router + request-id/trace middleware)
//!     → /config...  → control.rs (form handlers, JSON API)
//!                     → page.rs (HTML rendering)
//!     → everything else → proxy.rs (stream to the viewer backend)
//! ```

pub mod control;
pub mod page;
pub mod proxy;
pub mod server;

pub use server::HttpServer;
