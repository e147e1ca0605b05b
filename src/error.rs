//! Error type for the chat gateway.
//!
//! Every failure on the chat path collapses to the same opaque HTTP 500 for
//! the client. The full cause only ever reaches the server log.

use axum::{
    Json,
    extract::rejection::BytesRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;

/// Message returned to the client for every chat failure.
pub const CHAT_FAILURE_MESSAGE: &str = "Failed to communicate with chat API";

/// Errors that can occur while proxying a chat request.
#[derive(Debug, thiserror::Error)]
pub enum ChatError {
    /// The inbound request body could not be read.
    #[error("Failed to read request body: {0}")]
    Body(#[source] BytesRejection),

    /// The inbound request body was not valid JSON.
    #[error("Invalid request body: {0}")]
    InvalidRequest(#[source] serde_json::Error),

    /// The upstream could not be reached, or its body could not be read.
    #[error("Upstream transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The upstream answered with a non-success status.
    #[error("FastAPI responded with status: {}", .0.as_u16())]
    UpstreamStatus(StatusCode),

    /// The upstream body was not a usable JSON document.
    #[error("Upstream decode error: {0}")]
    Decode(String),

    /// Required configuration is missing or invalid.
    #[error("Configuration error: {0}")]
    Config(String),
}

impl IntoResponse for ChatError {
    fn into_response(self) -> Response {
        tracing::error!(
            name: "chat.failed",
            error = %self,
            "Error communicating with FastAPI"
        );

        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "error": CHAT_FAILURE_MESSAGE })),
        )
            .into_response()
    }
}
