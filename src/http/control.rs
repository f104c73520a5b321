//! Control-surface handlers.
//!
//! # Data Flow
//! ```text
//! POST /config form
//!     → trim + legacy host|label split
//!     → validate host, validate label     (terminal: render Error:)
//!     → store.save, store.save_key        (terminal: render Error:)
//!     → store.load (operator sees the state actually on disk)
//!     → optional reload marker ("Save & Apply")
//!     → page with fresh status grid
//! ```
//!
//! # Design Decisions
//! - Validate-then-persist: nothing is written once validation fails
//! - Every response re-probes and redisplays full state, so a partial
//!   write (env file saved, key write failed) is visible, not hidden
//! - Probe failures render as status text, never as HTTP errors

use axum::{
    extract::{rejection::FormRejection, State},
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    Form, Json,
};
use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

use crate::endpoint::{split_label, validate_host, validate_label};
use crate::http::page::{self, css_class, StatusLine};
use crate::http::server::AppState;
use crate::store::ConfigSnapshot;

/// Fields of the configuration form. Everything is optional so a
/// partial submission still deserializes.
#[derive(Debug, Default, Deserialize)]
pub struct ConfigForm {
    #[serde(default)]
    remote_host: String,
    #[serde(default)]
    remote_label: String,
    #[serde(default)]
    ssh_key: String,
    #[serde(default)]
    clear_ssh_key: Option<String>,
    #[serde(default)]
    apply: Option<String>,
}

/// Handle `GET /config`: render the current state with no flash message.
pub async fn show_config(State(state): State<AppState>) -> Html<String> {
    let snapshot = state.store.load();
    render_page(&state, &snapshot, "").await
}

/// Handle `POST /config`: save (and optionally apply) the submitted form.
pub async fn post_config(
    State(state): State<AppState>,
    form: Result<Form<ConfigForm>, FormRejection>,
) -> Html<String> {
    let snapshot = state.store.load();
    let form = match form {
        Ok(Form(form)) => form,
        Err(e) => {
            tracing::warn!(error = %e, "Rejected config form");
            return render_page(&state, &snapshot, "Error: invalid form").await;
        }
    };

    let mut host = form.remote_host.trim().to_string();
    let mut label = form.remote_label.trim().to_string();
    // A combined descriptor pasted into the host field fills an empty
    // label field.
    if host.contains('|') && label.is_empty() {
        let (base, embedded) = split_label(&host);
        host = base;
        label = embedded;
    }
    let clear_key = form.clear_ssh_key.as_deref().is_some_and(|v| !v.is_empty());

    if let Err(e) = validate_host(&host) {
        return render_page(&state, &snapshot, &format!("Error: {}", e)).await;
    }
    if let Err(e) = validate_label(&label) {
        return render_page(&state, &snapshot, &format!("Error: {}", e)).await;
    }
    if let Err(e) = state.store.save(&host, &label) {
        tracing::error!(error = %e, "Failed to write env file");
        return render_page(&state, &snapshot, &format!("Error: {}", e)).await;
    }
    if let Err(e) = state.store.save_key(&form.ssh_key, clear_key) {
        tracing::error!(error = %e, "Failed to write SSH key");
        return render_page(&state, &snapshot, &format!("Error: {}", e)).await;
    }

    tracing::info!(host = %host, label = %label, "Configuration saved");
    let updated = state.store.load();

    if form.apply.as_deref().is_some_and(|v| !v.is_empty()) {
        if let Err(e) = state.reload.request() {
            tracing::error!(error = %e, "Failed to write reload marker");
            return render_page(&state, &updated, &format!("Error: {}", e)).await;
        }
        return render_page(&state, &updated, "Applied. Give it a few seconds to reconnect.")
            .await;
    }

    render_page(
        &state,
        &updated,
        "Configuration saved. Use “Save & Apply” to reload without restarting.",
    )
    .await
}

/// Handle `POST /config/test`: operator-triggered probe with verbose wording.
pub async fn handle_test(State(state): State<AppState>) -> Html<String> {
    let snapshot = state.store.load();
    if let Err(e) = validate_host(&snapshot.host) {
        return render_page(&state, &snapshot, &format!("Error: {}", e)).await;
    }
    if snapshot.host.is_empty() {
        return render_page(&state, &snapshot, "Remote not configured").await;
    }
    let message = state.prober.test_remote(&snapshot.host).await;
    render_page(&state, &snapshot, &message).await
}

#[derive(Serialize)]
pub struct StatusPayload {
    pub value: String,
    pub severity: &'static str,
}

#[derive(Serialize)]
pub struct ConfigStatus {
    pub host: String,
    pub label: String,
    pub ssh_key_configured: bool,
    pub backend: StatusPayload,
    pub remote: StatusPayload,
}

#[derive(Serialize)]
pub struct TestResult {
    pub ok: bool,
    pub message: String,
}

/// Handle `GET /config/api/status`: snapshot plus live probes as JSON.
pub async fn api_status(State(state): State<AppState>) -> Json<ConfigStatus> {
    let snapshot = state.store.load();
    let backend = state.prober.backend_status().await;
    let remote = state.prober.remote_status(&snapshot.host).await;

    Json(ConfigStatus {
        host: snapshot.host,
        label: snapshot.label,
        ssh_key_configured: snapshot.ssh_key_configured,
        backend: StatusPayload {
            severity: crate::health::Severity::from_prefix(&backend).as_str(),
            value: backend,
        },
        remote: StatusPayload {
            value: remote.value,
            severity: remote.severity.as_str(),
        },
    })
}

/// Handle `POST /config/api/test`: the test button as JSON.
pub async fn api_test(State(state): State<AppState>) -> Json<TestResult> {
    let snapshot = state.store.load();
    if let Err(e) = validate_host(&snapshot.host) {
        return Json(TestResult {
            ok: false,
            message: format!("Error: {}", e),
        });
    }
    if snapshot.host.is_empty() {
        return Json(TestResult {
            ok: false,
            message: "Remote not configured".to_string(),
        });
    }
    let message = state.prober.test_remote(&snapshot.host).await;
    let ok = message.contains(": OK (");
    Json(TestResult { ok, message })
}

/// Handle `POST /config/api/apply`: write the reload marker.
pub async fn api_apply(State(state): State<AppState>) -> Response {
    match state.reload.request() {
        Ok(()) => Json(serde_json::json!({
            "status": "applied",
            "requested_at": Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true),
        }))
        .into_response(),
        Err(e) => {
            tracing::error!(error = %e, "Failed to write reload marker");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(serde_json::json!({ "error": e.to_string() })),
            )
                .into_response()
        }
    }
}

/// Probe both status lines and render the page.
async fn render_page(state: &AppState, snapshot: &ConfigSnapshot, message: &str) -> Html<String> {
    let backend = state.prober.backend_status().await;
    let remote = state.prober.remote_status(&snapshot.host).await;
    let lines = [
        StatusLine {
            label: "Viewer Backend".to_string(),
            class: css_class(crate::health::Severity::from_prefix(&backend)),
            value: backend,
        },
        StatusLine {
            label: "Remote Docker".to_string(),
            class: css_class(remote.severity),
            value: remote.value,
        },
    ];
    Html(page::render(snapshot, message, &lines))
}
