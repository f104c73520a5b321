//! Reverse-proxy passthrough to the viewer backend.
//!
//! # Responsibilities
//! - Rewrite the request URI onto the single upstream authority
//! - Strip hop-by-hop headers in both directions
//! - Append the client address to `x-forwarded-for`
//! - Stream both bodies without buffering (log tails stay live)
//!
//! # Design Decisions
//! - One upstream, no retries, no load balancing: failures surface as
//!   502 and the operator checks the status grid

use std::net::SocketAddr;
use std::time::Instant;

use axum::{
    body::Body,
    extract::{ConnectInfo, State},
    http::{
        header::{HeaderMap, HeaderValue},
        uri::{PathAndQuery, Scheme},
        Request, StatusCode, Uri, Version,
    },
    response::{IntoResponse, Response},
};

use crate::http::server::AppState;
use crate::observability::metrics;

/// Hop-by-hop headers never forwarded through a proxy.
const HOP_BY_HOP: [&str; 8] = [
    "connection",
    "keep-alive",
    "proxy-authenticate",
    "proxy-authorization",
    "te",
    "trailer",
    "transfer-encoding",
    "upgrade",
];

/// Forward any non-control request to the viewer backend.
pub async fn proxy_handler(
    State(state): State<AppState>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    request: Request<Body>,
) -> Response {
    let start = Instant::now();
    let method = request.method().to_string();
    let path = request.uri().path().to_string();

    let (mut parts, body) = request.into_parts();

    let mut uri_parts = parts.uri.clone().into_parts();
    uri_parts.scheme = Some(Scheme::HTTP);
    uri_parts.authority = Some(state.upstream.as_ref().clone());
    if uri_parts.path_and_query.is_none() {
        uri_parts.path_and_query = Some(PathAndQuery::from_static("/"));
    }
    let uri = match Uri::from_parts(uri_parts) {
        Ok(uri) => uri,
        Err(e) => {
            tracing::error!(path = %path, error = %e, "Failed to rewrite upstream URI");
            metrics::record_request(&method, 502, start);
            return (StatusCode::BAD_GATEWAY, "Upstream request failed").into_response();
        }
    };

    parts.uri = uri;
    // The viewer backend speaks HTTP/1.1; so does the probe client.
    parts.version = Version::HTTP_11;
    strip_hop_by_hop(&mut parts.headers);
    // The client sets Host from the rewritten URI.
    parts.headers.remove("host");
    append_forwarded_for(&mut parts.headers, addr.ip().to_string());

    match state.client.request(Request::from_parts(parts, body)).await {
        Ok(response) => {
            let status = response.status().as_u16();
            tracing::debug!(method = %method, path = %path, status = status, "Proxied request");
            metrics::record_request(&method, status, start);

            let (mut parts, body) = response.into_parts();
            strip_hop_by_hop(&mut parts.headers);
            Response::from_parts(parts, Body::new(body))
        }
        Err(e) => {
            tracing::error!(method = %method, path = %path, error = %e, "Upstream error");
            metrics::record_request(&method, 502, start);
            (StatusCode::BAD_GATEWAY, "Upstream request failed").into_response()
        }
    }
}

fn strip_hop_by_hop(headers: &mut HeaderMap) {
    for name in HOP_BY_HOP {
        headers.remove(name);
    }
}

fn append_forwarded_for(headers: &mut HeaderMap, client_ip: String) {
    let value = match headers.get("x-forwarded-for").and_then(|v| v.to_str().ok()) {
        Some(existing) => format!("{}, {}", existing, client_ip),
        None => client_ip,
    };
    if let Ok(value) = HeaderValue::from_str(&value) {
        headers.insert("x-forwarded-for", value);
    }
}
