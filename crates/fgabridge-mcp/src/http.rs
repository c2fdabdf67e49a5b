//! HTTP transport.
//!
//! Three surfaces share one dispatch path:
//!
//! - `POST /call` — the plain synchronous envelope `{"tool", "args"}`,
//!   answering `{"result"}` or `{"error"}` with a meaningful status code.
//! - `POST /mcp` — JSON-RPC 2.0 over HTTP.
//! - `GET /sse` + `POST /messages/{session_id}` — the SSE bridge: the GET
//!   opens a stream and announces its message endpoint, the POST feeds
//!   JSON-RPC requests whose responses are emitted as `message` events.
//!
//! `GET /healthz` answers `OK` unconditionally for readiness probes.

use crate::error::McpError;
use crate::protocol::{JsonRpcRequest, JsonRpcResponse};
use crate::server::McpServer;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::sse::{Event, KeepAlive, Sse};
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use futures::Stream;
use serde_json::{json, Value};
use std::collections::HashMap;
use std::convert::Infallible;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, RwLock};
use tower_http::trace::TraceLayer;

/// Shared state for all HTTP routes.
#[derive(Clone)]
pub struct AppState {
    server: Arc<McpServer>,
    /// Open SSE streams, keyed by session id.
    sessions: Arc<RwLock<HashMap<String, mpsc::Sender<JsonRpcResponse>>>>,
}

impl AppState {
    pub fn new(server: Arc<McpServer>) -> Self {
        Self {
            server,
            sessions: Arc::new(RwLock::new(HashMap::new())),
        }
    }
}

/// Build the router serving every HTTP surface.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/healthz", get(handle_healthz))
        .route("/call", post(handle_call))
        .route("/mcp", post(handle_mcp_post))
        .route("/sse", get(handle_sse))
        .route("/messages/{session_id}", post(handle_message))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn handle_healthz() -> &'static str {
    "OK"
}

fn error_body(message: impl Into<String>) -> Json<Value> {
    Json(json!({ "error": message.into() }))
}

async fn handle_call(
    State(state): State<AppState>,
    payload: Result<Json<Value>, JsonRejection>,
) -> (StatusCode, Json<Value>) {
    let body = match payload {
        Ok(Json(body)) => body,
        Err(rejection) => {
            return (StatusCode::BAD_REQUEST, error_body(rejection.body_text()));
        }
    };

    if !body.is_object() {
        return (
            StatusCode::BAD_REQUEST,
            error_body("request body must be a JSON object"),
        );
    }

    let Some(tool) = body.get("tool").and_then(Value::as_str) else {
        return (
            StatusCode::BAD_REQUEST,
            error_body("Missing 'tool' in request body"),
        );
    };
    let args = body.get("args").cloned().unwrap_or_else(|| json!({}));

    let client = match state.server.provider().client().await {
        Ok(client) => client,
        Err(e) => {
            tracing::error!(tool, error = %e, "client acquisition failed");
            return (StatusCode::INTERNAL_SERVER_ERROR, error_body(e.to_string()));
        }
    };

    match crate::dispatch::dispatch(&client, state.server.tools(), tool, &args).await {
        Ok(result) => (StatusCode::OK, Json(json!({ "result": result }))),
        Err(e) => (StatusCode::BAD_REQUEST, error_body(e.to_string())),
    }
}

async fn handle_mcp_post(
    State(state): State<AppState>,
    payload: Result<Json<JsonRpcRequest>, JsonRejection>,
) -> impl IntoResponse {
    match payload {
        Ok(Json(request)) => {
            let response = state.server.handle_request(request).await;
            (StatusCode::OK, Json(response)).into_response()
        }
        Err(rejection) => (
            StatusCode::BAD_REQUEST,
            Json(JsonRpcResponse::error(None, -32700, rejection.body_text())),
        )
            .into_response(),
    }
}

async fn handle_sse(
    State(state): State<AppState>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let session_id = uuid::Uuid::new_v4().to_string();
    let (event_tx, mut event_rx) = mpsc::channel::<JsonRpcResponse>(64);

    state
        .sessions
        .write()
        .await
        .insert(session_id.clone(), event_tx);
    tracing::debug!(session_id = %session_id, "SSE session opened");

    let stream = async_stream::stream! {
        // Tell the client where to POST its requests for this session.
        yield Ok::<_, Infallible>(Event::default()
            .event("endpoint")
            .data(format!("/messages/{session_id}")));

        while let Some(response) = event_rx.recv().await {
            if let Ok(data) = serde_json::to_string(&response) {
                yield Ok(Event::default().event("message").data(data));
            }
        }
    };

    Sse::new(stream).keep_alive(
        KeepAlive::new()
            .interval(Duration::from_secs(30))
            .text("ping"),
    )
}

async fn handle_message(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
    payload: Result<Json<JsonRpcRequest>, JsonRejection>,
) -> (StatusCode, Json<Value>) {
    let request = match payload {
        Ok(Json(request)) => request,
        Err(rejection) => {
            return (StatusCode::BAD_REQUEST, error_body(rejection.body_text()));
        }
    };

    let Some(sender) = state.sessions.read().await.get(&session_id).cloned() else {
        return (StatusCode::NOT_FOUND, error_body("unknown session"));
    };

    let is_notification = request.id.is_none();
    let response = state.server.handle_request(request).await;

    if !is_notification && sender.send(response).await.is_err() {
        // Stream consumer went away; drop the dead session.
        state.sessions.write().await.remove(&session_id);
        return (StatusCode::NOT_FOUND, error_body("session closed"));
    }

    (StatusCode::ACCEPTED, Json(json!({ "status": "accepted" })))
}

/// HTTP server for the SSE transport.
pub struct HttpServer {
    state: AppState,
    addr: String,
}

impl HttpServer {
    pub fn new(server: Arc<McpServer>, addr: impl Into<String>) -> Self {
        Self {
            state: AppState::new(server),
            addr: addr.into(),
        }
    }

    /// Bind and serve until SIGINT/SIGTERM.
    pub async fn run(self) -> Result<(), McpError> {
        let provider = self.state.server.provider().clone();
        let app = router(self.state);

        let listener = tokio::net::TcpListener::bind(&self.addr)
            .await
            .map_err(|e| McpError::StartupFailed(format!("failed to bind {}: {e}", self.addr)))?;

        tracing::info!(addr = %self.addr, "HTTP server listening");

        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        provider.close().await;
        Ok(())
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        let _ = tokio::signal::ctrl_c().await;
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::warn!(error = %e, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("shutdown signal received");
}
