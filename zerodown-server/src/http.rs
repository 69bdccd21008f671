//! Dashboard HTTP server
//!
//! Axum-based server that renders the maintenance dashboard and proxies chat
//! messages to the remote chat service.
//!
//! Architecture: each endpoint has a thin axum handler that resolves the
//! session cookie and delegates to a pure inner function. The inner functions
//! are directly testable without axum dispatch machinery.
//!
//! Endpoints:
//! - GET  /                  — dashboard page
//! - POST /chat              — chat form submit (HTMX reply fragment or full page)
//! - GET  /api/tickets       — active tickets as view models
//! - GET  /api/chat/history  — transcript of the cookie session
//! - POST /api/chat          — send a chat message, returns appended messages
//! - GET  /health            — health check with DB status
//! - GET  /version           — server version info

use std::sync::Arc;

use anyhow::Result;
use axum::extract::{Form, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{Html, IntoResponse};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_cookies::{CookieManagerLayer, Cookies};
use tower_http::trace::TraceLayer;
use zerodown_core::config::HttpConfig;
use zerodown_core::dashboard::{self, Dashboard};
use zerodown_core::models::{ChatMessage, TicketView};
use zerodown_core::{
    ChatLogStore, ChatTransport, HttpChatClient, PgStore, SessionId, TicketStore, Transcript,
    ZeroDownConfig, ZeroDownError,
};

use crate::render;
use crate::session::session_from_cookies;

/// Shared state for all HTTP handlers
#[derive(Clone)]
pub struct HttpState {
    pub tickets: Arc<dyn TicketStore>,
    pub chat_logs: Arc<dyn ChatLogStore>,
    pub transport: Arc<dyn ChatTransport>,
    /// Present in production; health reports unavailable without it.
    pub pool: Option<PgPool>,
    pub fallback_action: String,
}

impl HttpState {
    /// Wire Postgres stores and the HTTP chat client from config.
    pub fn from_config(pool: PgPool, config: &ZeroDownConfig) -> Result<Self, ZeroDownError> {
        let store = Arc::new(PgStore::new(pool.clone()));
        let transport = HttpChatClient::new(&config.chat)?;

        Ok(Self {
            tickets: store.clone(),
            chat_logs: store,
            transport: Arc::new(transport),
            pool: Some(pool),
            fallback_action: config.dashboard.fallback_action.clone(),
        })
    }
}

/// Build the Axum router with all endpoints
pub fn build_router(state: Arc<HttpState>) -> Router {
    Router::new()
        .route("/", get(dashboard_handler))
        .route("/chat", post(chat_form_handler))
        .route("/api/tickets", get(tickets_handler))
        .route("/api/chat/history", get(history_handler))
        .route("/api/chat", post(chat_api_handler))
        .route("/health", get(health_handler))
        .route("/version", get(version_handler))
        .with_state(state)
        .layer(CookieManagerLayer::new())
        .layer(TraceLayer::new_for_http())
}

/// Start the HTTP server on the configured address.
/// Gracefully shuts down when the broadcast shutdown signal fires.
pub async fn start_http_server(
    state: HttpState,
    http: &HttpConfig,
    mut shutdown: broadcast::Receiver<()>,
) -> Result<()> {
    let addr = format!("{}:{}", http.host, http.port);

    let app = build_router(Arc::new(state));
    let listener = TcpListener::bind(&addr).await?;
    tracing::info!("0down.AI dashboard listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            let _ = shutdown.recv().await;
            tracing::info!("HTTP server shutting down...");
        })
        .await?;

    Ok(())
}

// ============================================================================
// Request / Response DTOs
// ============================================================================

#[derive(Debug, Deserialize, Default)]
pub struct ChatForm {
    #[serde(default)]
    pub message: String,
}

#[derive(Debug, Deserialize)]
pub struct ChatApiRequest {
    pub message: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ChatApiResponse {
    pub status: String,
    pub session_id: SessionId,
    pub messages: Vec<ChatMessage>,
}

// ============================================================================
// Inner (directly testable) business logic functions
// ============================================================================

/// Inner page load — tickets and history for `session`, fetched concurrently.
pub async fn dashboard_inner(state: &HttpState, session: SessionId) -> Dashboard {
    Dashboard::load(
        state.tickets.as_ref(),
        state.chat_logs.as_ref(),
        session,
        &state.fallback_action,
    )
    .await
}

/// Inner chat — one round-trip; returns only the appended messages.
pub async fn chat_inner(state: &HttpState, session: &SessionId, message: &str) -> Vec<ChatMessage> {
    let mut transcript = Transcript::new();
    transcript
        .send(state.transport.as_ref(), message, session)
        .await
        .to_vec()
}

/// Inner chat for non-HTMX form posts — the full dashboard with the new turn
/// appended after the stored history.
pub async fn chat_page_inner(state: &HttpState, session: SessionId, message: &str) -> Dashboard {
    let mut page = dashboard_inner(state, session).await;
    page.transcript
        .send(state.transport.as_ref(), message, &page.session)
        .await;
    page
}

pub async fn tickets_inner(state: &HttpState) -> Vec<TicketView> {
    dashboard::fetch_alerts(state.tickets.as_ref(), &state.fallback_action).await
}

pub async fn history_inner(state: &HttpState, session: &SessionId) -> Vec<ChatMessage> {
    dashboard::fetch_transcript(state.chat_logs.as_ref(), session)
        .await
        .messages()
        .to_vec()
}

/// Inner health check — queries DB and returns (status_code, json_body).
pub async fn health_inner(pool: Option<&PgPool>) -> (StatusCode, serde_json::Value) {
    let Some(pool) = pool else {
        return (
            StatusCode::SERVICE_UNAVAILABLE,
            serde_json::json!({
                "status": "unhealthy",
                "error": "database not configured",
            }),
        );
    };

    match zerodown_core::db::health_check(pool).await {
        Ok(pg_ver) => (
            StatusCode::OK,
            serde_json::json!({
                "status": "healthy",
                "version": env!("CARGO_PKG_VERSION"),
                "postgresql": pg_ver,
            }),
        ),
        Err(e) => (
            StatusCode::SERVICE_UNAVAILABLE,
            serde_json::json!({
                "status": "unhealthy",
                "error": e.to_string(),
            }),
        ),
    }
}

/// Inner version — returns version info (pure, no IO).
pub fn version_inner() -> serde_json::Value {
    serde_json::json!({
        "version": env!("CARGO_PKG_VERSION"),
        "protocol": "zerodown/1",
    })
}

// ============================================================================
// Axum handler wrappers (thin — delegate to inner functions)
// ============================================================================

pub async fn dashboard_handler(
    State(state): State<Arc<HttpState>>,
    cookies: Cookies,
) -> impl IntoResponse {
    let session = session_from_cookies(&cookies);
    let page = dashboard_inner(&state, session).await;
    Html(render::page(&page))
}

pub async fn chat_form_handler(
    State(state): State<Arc<HttpState>>,
    cookies: Cookies,
    headers: HeaderMap,
    Form(form): Form<ChatForm>,
) -> impl IntoResponse {
    let session = session_from_cookies(&cookies);

    if is_htmx(&headers) {
        let appended = chat_inner(&state, &session, &form.message).await;
        Html(render::reply_fragment(&appended))
    } else {
        let page = chat_page_inner(&state, session, &form.message).await;
        Html(render::page(&page))
    }
}

pub async fn tickets_handler(State(state): State<Arc<HttpState>>) -> impl IntoResponse {
    Json(tickets_inner(&state).await)
}

pub async fn history_handler(
    State(state): State<Arc<HttpState>>,
    cookies: Cookies,
) -> impl IntoResponse {
    let session = session_from_cookies(&cookies);
    Json(history_inner(&state, &session).await)
}

pub async fn chat_api_handler(
    State(state): State<Arc<HttpState>>,
    cookies: Cookies,
    Json(req): Json<ChatApiRequest>,
) -> impl IntoResponse {
    let session = session_from_cookies(&cookies);
    let message = req.message.unwrap_or_default();
    let messages = chat_inner(&state, &session, &message).await;

    Json(ChatApiResponse {
        status: "ok".to_string(),
        session_id: session,
        messages,
    })
}

pub async fn health_handler(State(state): State<Arc<HttpState>>) -> impl IntoResponse {
    let (status, body) = health_inner(state.pool.as_ref()).await;
    (status, Json(body))
}

pub async fn version_handler() -> impl IntoResponse {
    (StatusCode::OK, Json(version_inner()))
}

// ============================================================================
// Helpers
// ============================================================================

/// True when the request was issued by HTMX.
pub fn is_htmx(headers: &HeaderMap) -> bool {
    headers
        .get("hx-request")
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v.eq_ignore_ascii_case("true"))
}

// ============================================================================
// Unit Tests — call inner functions directly
// ============================================================================
