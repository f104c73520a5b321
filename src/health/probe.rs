//! Health probes against the remote runtime and the viewer backend.

use std::time::{Duration, Instant};

use axum::body::Body;
use axum::http::Request;
use hyper_util::{
    client::legacy::{connect::HttpConnector, Client},
    rt::TokioExecutor,
};
use thiserror::Error;
use tokio::time;

use crate::config::ProbeConfig;
use crate::endpoint::{parse_endpoint, split_label, Scheme};
use crate::observability::metrics;

/// Longest response-body excerpt carried in a failure message.
const BODY_EXCERPT_BYTES: usize = 256;
/// Read cap when draining a non-200 response body.
const BODY_READ_LIMIT: usize = 64 * 1024;

/// A single probe failure, rendered verbatim into status strings.
#[derive(Debug, Error)]
pub enum ProbeError {
    #[error("timeout after {0}s")]
    Timeout(u64),

    #[error("{0}")]
    Transport(String),

    #[error("status {status}: {body}")]
    BadStatus { status: u16, body: String },
}

/// Severity classes for the status grid, derived from the message
/// prefix so the rendering layer never re-parses error types.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Ok,
    Warn,
    Bad,
}

impl Severity {
    /// Classify a rendered status value: `OK` and `WARN` prefixes map
    /// to their severities, everything else is bad.
    pub fn from_prefix(value: &str) -> Self {
        if value.starts_with("OK") {
            Severity::Ok
        } else if value.starts_with("WARN") {
            Severity::Warn
        } else {
            Severity::Bad
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Ok => "ok",
            Severity::Warn => "warn",
            Severity::Bad => "bad",
        }
    }
}

/// One line of the status grid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteStatus {
    pub value: String,
    pub severity: Severity,
}

/// Issues bounded reachability checks against the configured remote
/// endpoint and the viewer backend. Cheap to clone; the inner client
/// is reference-counted.
#[derive(Clone)]
pub struct Prober {
    client: Client<HttpConnector, Body>,
    config: ProbeConfig,
    backend_url: String,
}

impl Prober {
    pub fn new(config: ProbeConfig, backend_url: impl Into<String>) -> Self {
        let client = Client::builder(TokioExecutor::new()).build(HttpConnector::new());
        Self {
            client,
            config,
            backend_url: backend_url.into(),
        }
    }

    /// GET the health path on `authority` with a bounded timeout.
    /// 200 yields the elapsed wall-clock time; anything else is a
    /// classified failure.
    pub async fn ping(&self, authority: &str, timeout: Duration) -> Result<Duration, ProbeError> {
        let uri = format!("http://{}{}", authority, self.config.health_path);
        let request = Request::builder()
            .method("GET")
            .uri(uri.as_str())
            .header("user-agent", "remote-log-proxy-probe")
            .body(Body::empty())
            .map_err(|e| ProbeError::Transport(e.to_string()))?;

        let start = Instant::now();
        let response = match time::timeout(timeout, self.client.request(request)).await {
            Ok(Ok(response)) => response,
            Ok(Err(e)) => {
                tracing::warn!(uri = %uri, error = %e, "Probe failed: connection error");
                return Err(ProbeError::Transport(error_chain(&e)));
            }
            Err(_) => {
                tracing::warn!(uri = %uri, "Probe failed: timeout");
                return Err(ProbeError::Timeout(timeout.as_secs()));
            }
        };
        let elapsed = start.elapsed();

        let status = response.status();
        if status.as_u16() == 200 {
            return Ok(elapsed);
        }

        tracing::warn!(uri = %uri, status = %status, "Probe failed: non-200 status");
        // The body read shares the probe's deadline: a remote that sends
        // failure headers and then stalls must not hold the request open.
        // On deadline the status alone is reported.
        let remaining = timeout.saturating_sub(start.elapsed());
        let body = match time::timeout(
            remaining,
            axum::body::to_bytes(Body::new(response.into_body()), BODY_READ_LIMIT),
        )
        .await
        {
            Ok(Ok(bytes)) => excerpt(&bytes),
            _ => String::new(),
        };
        Err(ProbeError::BadStatus {
            status: status.as_u16(),
            body,
        })
    }

    /// Implicit status check for the status grid (short timeout).
    ///
    /// `ssh://` endpoints are never dialed directly: the probe targets
    /// the local tunnel address, and failures carry tunnel wording so
    /// "tunnel not up" reads differently from "remote not responding".
    pub async fn remote_status(&self, raw_host: &str) -> RemoteStatus {
        if raw_host.is_empty() {
            return RemoteStatus {
                value: "not configured".to_string(),
                severity: Severity::Warn,
            };
        }
        let (base, _) = split_label(raw_host);
        let endpoint = match parse_endpoint(&base) {
            Ok(endpoint) => endpoint,
            Err(_) => {
                return RemoteStatus {
                    value: "invalid format".to_string(),
                    severity: Severity::Bad,
                };
            }
        };

        let timeout = Duration::from_secs(self.config.status_timeout_secs);
        let start = Instant::now();
        match endpoint.scheme {
            Scheme::Tcp => match self.ping(&endpoint.authority, timeout).await {
                Ok(elapsed) => {
                    metrics::record_probe("remote", "ok", start);
                    RemoteStatus {
                        value: format!("OK - {}ms", elapsed.as_millis()),
                        severity: Severity::Ok,
                    }
                }
                Err(e) => {
                    metrics::record_probe("remote", "err", start);
                    RemoteStatus {
                        value: format!("ERR - {}", e),
                        severity: Severity::Bad,
                    }
                }
            },
            Scheme::Ssh => match self.ping(&self.config.tunnel_address, timeout).await {
                Ok(elapsed) => {
                    metrics::record_probe("tunnel", "ok", start);
                    RemoteStatus {
                        value: format!("OK - tunnel {}ms", elapsed.as_millis()),
                        severity: Severity::Ok,
                    }
                }
                Err(e) => {
                    metrics::record_probe("tunnel", "err", start);
                    RemoteStatus {
                        value: format!("ERR - tunnel {}", e),
                        severity: Severity::Bad,
                    }
                }
            },
        }
    }

    /// Operator-triggered test (longer timeout, verbose wording).
    pub async fn test_remote(&self, raw_host: &str) -> String {
        let (base, _) = split_label(raw_host);
        let endpoint = match parse_endpoint(&base) {
            Ok(endpoint) => endpoint,
            Err(e) => return format!("Error: {}", e),
        };

        let timeout = Duration::from_secs(self.config.test_timeout_secs);
        let start = Instant::now();
        match endpoint.scheme {
            Scheme::Tcp => match self.ping(&endpoint.authority, timeout).await {
                Ok(elapsed) => {
                    metrics::record_probe("remote", "ok", start);
                    format!("Test Docker: OK ({}ms)", elapsed.as_millis())
                }
                Err(e) => {
                    metrics::record_probe("remote", "err", start);
                    format!("Test Docker: ERR - {}", e)
                }
            },
            Scheme::Ssh => match self.ping(&self.config.tunnel_address, timeout).await {
                Ok(elapsed) => {
                    metrics::record_probe("tunnel", "ok", start);
                    format!("Test Docker (SSH tunnel): OK ({}ms)", elapsed.as_millis())
                }
                Err(e) => {
                    metrics::record_probe("tunnel", "err", start);
                    format!("Test Docker (SSH tunnel): ERR - {}", e)
                }
            },
        }
    }

    /// Liveness of the viewer backend itself. Any response short of a
    /// server error counts as active: the backend answers 4xx on
    /// unauthenticated paths while still being perfectly alive.
    pub async fn backend_status(&self) -> String {
        let request = match Request::builder()
            .method("GET")
            .uri(self.backend_url.as_str())
            .header("user-agent", "remote-log-proxy-probe")
            .body(Body::empty())
        {
            Ok(request) => request,
            Err(_) => return "ERR - unavailable".to_string(),
        };

        let timeout = Duration::from_secs(self.config.status_timeout_secs);
        let start = Instant::now();
        match time::timeout(timeout, self.client.request(request)).await {
            Ok(Ok(response)) => {
                let status = response.status().as_u16();
                if (200..500).contains(&status) {
                    metrics::record_probe("backend", "ok", start);
                    "OK - backend active".to_string()
                } else {
                    metrics::record_probe("backend", "err", start);
                    format!("WARN - status {}", status)
                }
            }
            _ => {
                metrics::record_probe("backend", "err", start);
                "ERR - unavailable".to_string()
            }
        }
    }
}

/// Join an error with its source chain into one readable line.
fn error_chain(e: &dyn std::error::Error) -> String {
    let mut message = e.to_string();
    let mut source = e.source();
    while let Some(inner) = source {
        message.push_str(": ");
        message.push_str(&inner.to_string());
        source = inner.source();
    }
    message
}

/// First bytes of a response body as trimmed text, cut at a char
/// boundary at most [`BODY_EXCERPT_BYTES`] in.
fn excerpt(bytes: &[u8]) -> String {
    let text = String::from_utf8_lossy(bytes);
    let trimmed = text.trim();
    let mut end = trimmed.len().min(BODY_EXCERPT_BYTES);
    while end > 0 && !trimmed.is_char_boundary(end) {
        end -= 1;
    }
    trimmed[..end].to_string()
}
