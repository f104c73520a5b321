//! End-to-end tests: real router, real listener, TempDir data directory,
//! stub viewer backend.

use std::net::SocketAddr;

use axum::{body::Body, extract::Request, routing::get, Json, Router};
use serde_json::Value;
use tempfile::TempDir;
use tokio::net::TcpListener;

use remote_log_proxy::{AppConfig, HttpServer};

/// Stub viewer backend: `/` answers liveness, everything else echoes
/// the request path and proxy-relevant headers back as JSON.
async fn spawn_upstream() -> SocketAddr {
    let app = Router::new()
        .route("/", get(|| async { "viewer backend" }))
        .fallback(|req: Request<Body>| async move {
            let (parts, _) = req.into_parts();
            let header = |name: &str| {
                parts
                    .headers
                    .get(name)
                    .and_then(|v| v.to_str().ok())
                    .map(str::to_string)
            };
            Json(serde_json::json!({
                "path": parts.uri.path(),
                "x_forwarded_for": header("x-forwarded-for"),
                "x_request_id": header("x-request-id"),
                "connection": header("connection"),
            }))
        });
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    addr
}

/// An address where nothing listens, so probes fail immediately.
async fn dead_addr() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    listener.local_addr().unwrap()
}

struct TestProxy {
    base: String,
    data_dir: TempDir,
}

async fn spawn_proxy() -> TestProxy {
    let upstream = spawn_upstream().await;
    let data_dir = TempDir::new().unwrap();

    let mut config = AppConfig::default();
    config.upstream.address = format!("http://{}", upstream);
    config.storage.data_dir = data_dir.path().to_string_lossy().into_owned();
    config.probe.status_timeout_secs = 1;
    config.probe.test_timeout_secs = 1;
    config.probe.tunnel_address = dead_addr().await.to_string();

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let server = HttpServer::new(config).unwrap();
    tokio::spawn(async move {
        server.run(listener).await.unwrap();
    });

    TestProxy {
        base: format!("http://{}", addr),
        data_dir,
    }
}

#[tokio::test]
async fn config_page_renders_with_status_grid() {
    let proxy = spawn_proxy().await;

    let response = reqwest::get(format!("{}/config", proxy.base)).await.unwrap();
    assert_eq!(response.status(), 200);

    let body = response.text().await.unwrap();
    assert!(body.contains("Remote Docker Configuration"));
    assert!(body.contains("Viewer Backend"));
    assert!(body.contains("OK - backend active"));
    assert!(body.contains("not configured"));
}

#[tokio::test]
async fn saving_writes_the_env_file_and_confirms() {
    let proxy = spawn_proxy().await;
    let remote = dead_addr().await;
    let host = format!("tcp://{}", remote);

    let client = reqwest::Client::new();
    let response = client
        .post(format!("{}/config", proxy.base))
        .form(&[("remote_host", host.as_str()), ("remote_label", "Prod")])
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 200);
    let body = response.text().await.unwrap();
    assert!(body.contains("Configuration saved."), "got page:\n{}", body);

    let content = std::fs::read_to_string(proxy.data_dir.path().join("env.sh")).unwrap();
    assert_eq!(
        content,
        format!(
            "# Autogenerated by Remote Log Proxy config\n\
             export DOZZLE_REMOTE_HOST=\"{}\"\n\
             export DOZZLE_REMOTE_LABEL=\"Prod\"\n\
             # You can add other variables here\n",
            host
        )
    );
}

#[tokio::test]
async fn save_and_apply_writes_the_reload_marker() {
    let proxy = spawn_proxy().await;
    let remote = dead_addr().await;

    let client = reqwest::Client::new();
    let response = client
        .post(format!("{}/config", proxy.base))
        .form(&[
            ("remote_host", format!("tcp://{}", remote).as_str()),
            ("apply", "1"),
        ])
        .send()
        .await
        .unwrap();
    let body = response.text().await.unwrap();
    assert!(body.contains("Applied. Give it a few seconds to reconnect."));

    let marker = proxy.data_dir.path().join("reload");
    assert!(marker.is_file());
    let stamp = std::fs::read_to_string(marker).unwrap();
    chrono::DateTime::parse_from_rfc3339(&stamp).unwrap();
}

#[tokio::test]
async fn invalid_host_is_rejected_before_anything_persists() {
    let proxy = spawn_proxy().await;

    let client = reqwest::Client::new();
    let response = client
        .post(format!("{}/config", proxy.base))
        .form(&[("remote_host", "http://host:80")])
        .send()
        .await
        .unwrap();
    let body = response.text().await.unwrap();
    assert!(body.contains("Error: invalid scheme (tcp:// or ssh://)"));
    assert!(!proxy.data_dir.path().join("env.sh").exists());
}

#[tokio::test]
async fn combined_descriptor_in_the_host_field_is_split() {
    let proxy = spawn_proxy().await;
    let remote = dead_addr().await;

    let client = reqwest::Client::new();
    client
        .post(format!("{}/config", proxy.base))
        .form(&[("remote_host", format!("tcp://{}|East", remote).as_str())])
        .send()
        .await
        .unwrap();

    let content = std::fs::read_to_string(proxy.data_dir.path().join("env.sh")).unwrap();
    assert!(content.contains(&format!("export DOZZLE_REMOTE_HOST=\"tcp://{}\"", remote)));
    assert!(content.contains("export DOZZLE_REMOTE_LABEL=\"East\""));
}

#[tokio::test]
async fn test_connection_reports_unconfigured_remote() {
    let proxy = spawn_proxy().await;

    let client = reqwest::Client::new();
    let response = client
        .post(format!("{}/config/test", proxy.base))
        .send()
        .await
        .unwrap();
    let body = response.text().await.unwrap();
    assert!(body.contains("Remote not configured"));
}

#[tokio::test]
async fn json_status_reflects_saved_state() {
    let proxy = spawn_proxy().await;
    let remote = dead_addr().await;
    let host = format!("ssh://deploy@{}", remote.ip());

    let client = reqwest::Client::new();
    client
        .post(format!("{}/config", proxy.base))
        .form(&[("remote_host", host.as_str()), ("remote_label", "Prod")])
        .send()
        .await
        .unwrap();

    let status: Value = client
        .get(format!("{}/config/api/status", proxy.base))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    assert_eq!(status["host"], host);
    assert_eq!(status["label"], "Prod");
    assert_eq!(status["ssh_key_configured"], false);
    assert_eq!(status["backend"]["value"], "OK - backend active");
    assert_eq!(status["backend"]["severity"], "ok");
    // ssh endpoints probe the (dead) tunnel address, never the remote
    let remote_value = status["remote"]["value"].as_str().unwrap();
    assert!(
        remote_value.starts_with("ERR - tunnel "),
        "got {}",
        remote_value
    );
    assert_eq!(status["remote"]["severity"], "bad");
}

#[tokio::test]
async fn json_test_and_apply_round_trip() {
    let proxy = spawn_proxy().await;

    let client = reqwest::Client::new();
    let result: Value = client
        .post(format!("{}/config/api/test", proxy.base))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(result["ok"], false);
    assert_eq!(result["message"], "Remote not configured");

    let applied: Value = client
        .post(format!("{}/config/api/apply", proxy.base))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(applied["status"], "applied");
    assert!(proxy.data_dir.path().join("reload").is_file());
}

#[tokio::test]
async fn ssh_key_save_and_clear_through_the_form() {
    let proxy = spawn_proxy().await;
    let remote = dead_addr().await;
    let host = format!("ssh://deploy@{}", remote.ip());

    let client = reqwest::Client::new();
    client
        .post(format!("{}/config", proxy.base))
        .form(&[
            ("remote_host", host.as_str()),
            ("ssh_key", "-----BEGIN KEY-----\r\nabc\r\n-----END KEY-----"),
        ])
        .send()
        .await
        .unwrap();

    let key_path = proxy.data_dir.path().join(".ssh/id_rsa");
    let key = std::fs::read_to_string(&key_path).unwrap();
    assert_eq!(key, "-----BEGIN KEY-----\nabc\n-----END KEY-----\n");

    let page = client
        .get(format!("{}/config", proxy.base))
        .send()
        .await
        .unwrap()
        .text()
        .await
        .unwrap();
    assert!(page.contains("Saved key (leave empty to keep)"));

    client
        .post(format!("{}/config", proxy.base))
        .form(&[("remote_host", host.as_str()), ("clear_ssh_key", "on")])
        .send()
        .await
        .unwrap();
    assert!(!key_path.exists());
}

#[tokio::test]
async fn other_config_paths_reuse_the_main_handler() {
    let proxy = spawn_proxy().await;

    let response = reqwest::get(format!("{}/config/anything/else", proxy.base))
        .await
        .unwrap();
    assert_eq!(response.status(), 200);
    let body = response.text().await.unwrap();
    assert!(body.contains("Remote Docker Configuration"));
}

#[tokio::test]
async fn non_config_requests_stream_through_to_the_backend() {
    let proxy = spawn_proxy().await;

    let response = reqwest::get(format!("{}/containers/web/logs", proxy.base))
        .await
        .unwrap();
    assert_eq!(response.status(), 200);

    // PropagateRequestIdLayer copies the generated id onto the response.
    let request_id = response
        .headers()
        .get("x-request-id")
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);

    let echoed: Value = response.json().await.unwrap();
    assert_eq!(echoed["path"], "/containers/web/logs");
    assert!(echoed["x_forwarded_for"].as_str().unwrap().contains("127.0.0.1"));
    assert_eq!(echoed["x_request_id"].as_str(), request_id.as_deref());
    assert!(echoed["connection"].is_null());
}

#[tokio::test]
async fn method_discipline_on_control_routes() {
    let proxy = spawn_proxy().await;

    let client = reqwest::Client::new();
    let response = client
        .get(format!("{}/config/test", proxy.base))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 405);

    let response = client
        .delete(format!("{}/config", proxy.base))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 405);
}
