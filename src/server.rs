use axum::{
    Router,
    body::Bytes,
    extract::{DefaultBodyLimit, State, rejection::BytesRejection},
    response::Response,
    routing::post,
};
use serde_json::Value;
use std::sync::Arc;

use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use tracing::{info, warn};

use crate::AppState;
use crate::adapter::ResponseAdapter;
use crate::config::AppConfig;
use crate::database::DatabaseClient;
use crate::error::ChatError;
use crate::upstream::UpstreamClient;

/// Compose the application state from configuration.
///
/// The database client is built here, once. Missing Supabase settings are
/// logged and leave `database` empty; the chat route does not need it.
pub fn build_state(config: Arc<AppConfig>) -> anyhow::Result<AppState> {
    let upstream = UpstreamClient::new(config.upstream_url()?);
    let adapter = Arc::new(ResponseAdapter::new(upstream, config.stream_mode()));

    info!(
        name: "upstream.config.loaded",
        url = %config.upstream.url,
        mode = ?adapter.mode(),
        "Upstream configuration loaded"
    );

    let database = match DatabaseClient::connect(&config.database) {
        Ok(client) => {
            info!(name: "database.connected", url = %client.base_url(), "Supabase client ready");
            Some(Arc::new(client))
        }
        Err(ChatError::Config(reason)) => {
            warn!(name: "database.disabled", %reason, "Supabase client not configured");
            None
        }
        Err(e) => return Err(e.into()),
    };

    Ok(AppState {
        adapter,
        database,
        config,
    })
}

/// Build the router for `state`.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/api/chat", post(api_chat))
        .layer(DefaultBodyLimit::disable())
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Start the Axum server with the provided configuration.
pub async fn start_server(config: Arc<AppConfig>) -> anyhow::Result<()> {
    let state = build_state(Arc::clone(&config))?;
    let app = build_router(state);

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    info!(
        name: "server.started",
        address = %addr,
        "Server started"
    );

    axum::serve(listener, app.into_make_service()).await?;
    Ok(())
}

// ─────────────────────────────────────────────────────────────────────────────
// API Handlers
// ─────────────────────────────────────────────────────────────────────────────

/// POST /api/chat - Forward a chat body upstream and stream the answer back.
///
/// The body is taken as raw bytes so that an unreadable or malformed body
/// fails the same way as an upstream failure instead of with an extractor
/// rejection.
async fn api_chat(
    State(state): State<AppState>,
    body: Result<Bytes, BytesRejection>,
) -> Result<Response, ChatError> {
    let body = body.map_err(ChatError::Body)?;
    let body: Value = serde_json::from_slice(&body).map_err(ChatError::InvalidRequest)?;

    tracing::info!(
        name: "chat.request",
        upstream = %state.config.upstream.url,
        mode = ?state.adapter.mode(),
        "Received chat request"
    );

    state.adapter.adapt(&body).await
}
