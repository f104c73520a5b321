//! HTTP server setup.
//!
//! # Responsibilities
//! - Create the Axum router: control surface under `/config`, proxy
//!   fallback for everything else
//! - Wire up middleware (request IDs, tracing)
//! - Bind to the listener and serve with graceful shutdown

use std::net::SocketAddr;
use std::str::FromStr;
use std::sync::Arc;

use axum::{
    body::Body,
    http::uri::Authority,
    routing::{get, post},
    Router,
};
use hyper_util::{
    client::legacy::{connect::HttpConnector, Client},
    rt::TokioExecutor,
};
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::{
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};
use url::Url;

use crate::config::validation::ValidationError;
use crate::config::{AppConfig, ConfigError, StoragePaths};
use crate::health::Prober;
use crate::http::control;
use crate::http::proxy::proxy_handler;
use crate::reload::ReloadSignal;
use crate::store::ConfigStore;

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<ConfigStore>,
    pub prober: Prober,
    pub reload: Arc<ReloadSignal>,
    pub client: Client<HttpConnector, Body>,
    pub upstream: Arc<Authority>,
}

/// The control surface plus reverse-proxy server.
pub struct HttpServer {
    router: Router,
}

impl HttpServer {
    /// Build the full router from validated configuration.
    pub fn new(config: AppConfig) -> Result<Self, ConfigError> {
        let upstream_url = Url::parse(&config.upstream.address).map_err(|_| {
            ConfigError::Validation(vec![ValidationError::UpstreamAddress(
                config.upstream.address.clone(),
            )])
        })?;
        let host = upstream_url.host_str().unwrap_or_default();
        let port = upstream_url.port_or_known_default().unwrap_or(80);
        let upstream = Authority::from_str(&format!("{}:{}", host, port)).map_err(|_| {
            ConfigError::Validation(vec![ValidationError::UpstreamAddress(
                config.upstream.address.clone(),
            )])
        })?;

        let paths = StoragePaths::new(&config.storage.data_dir);
        let store = Arc::new(ConfigStore::new(paths.clone()));
        let reload = Arc::new(ReloadSignal::new(paths));
        let prober = Prober::new(config.probe.clone(), upstream_url.to_string());
        let client = Client::builder(TokioExecutor::new()).build(HttpConnector::new());

        let state = AppState {
            store,
            prober,
            reload,
            client,
            upstream: Arc::new(upstream),
        };

        Ok(Self {
            router: Self::build_router(state),
        })
    }

    /// Control routes first; anything unmatched streams through to the
    /// viewer backend. Other `/config/...` paths reuse the main
    /// handlers, matching how existing deployments link to the page.
    fn build_router(state: AppState) -> Router {
        Router::new()
            .route(
                "/config",
                get(control::show_config).post(control::post_config),
            )
            .route("/config/test", post(control::handle_test))
            .route("/config/api/status", get(control::api_status))
            .route("/config/api/test", post(control::api_test))
            .route("/config/api/apply", post(control::api_apply))
            .route(
                "/config/{*rest}",
                get(control::show_config).post(control::post_config),
            )
            .fallback(proxy_handler)
            .with_state(state)
            .layer(
                ServiceBuilder::new()
                    .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
                    .layer(TraceLayer::new_for_http())
                    .layer(PropagateRequestIdLayer::x_request_id()),
            )
    }

    /// Run the server, accepting connections on the given listener.
    pub async fn run(self, listener: TcpListener) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");

        let app = self
            .router
            .into_make_service_with_connect_info::<SocketAddr>();

        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

/// Wait for shutdown signal (Ctrl+C).
async fn shutdown_signal() {
    tokio::signal::ctrl_c()
        .await
        .expect("Failed to install Ctrl+C handler");
    tracing::info!("Shutdown signal received");
}
