//! Response adapter.
//!
//! The web client consumes `/api/chat` as an event stream. When the upstream
//! streams natively its bytes are passed through untouched. Otherwise the
//! single JSON answer is wrapped into a two-frame stream: one message event
//! followed by the `[DONE]` sentinel.
//!
//! # Example
//!
//! ```rust
//! use bd_law_chat::adapter::{AdaptedMessage, extract_reply, message_frame};
//! use serde_json::json;
//!
//! let reply = extract_reply(&json!({ "response": "Hello" })).unwrap();
//! let frame = message_frame(&AdaptedMessage::assistant(reply));
//! assert!(frame.starts_with("data: {\"type\":\"message\""));
//! assert!(frame.ends_with("\n\n"));
//! ```

use std::convert::Infallible;

use axum::{
    body::{Body, Bytes},
    http::header,
    response::{IntoResponse, Response},
};
use futures::Stream;
use serde::Serialize;
use serde_json::Value;

use crate::error::ChatError;
use crate::upstream::UpstreamClient;

/// Terminating frame of a synthesized stream.
pub const DONE_FRAME: &str = "data: [DONE]\n\n";

/// Reply fields in the order they are tried. Callers depend on this order.
const REPLY_FIELDS: [&str; 3] = ["response", "message", "content"];

/// Which branch the adapter takes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamMode {
    /// Upstream answers with an event stream; forward it as-is.
    Native,
    /// Upstream answers with one JSON document; synthesize the stream.
    Simulated,
}

/// Author of an adapted message; replies are always from the assistant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Assistant,
}

/// Message shape the web client's chat hook expects.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AdaptedMessage {
    /// Unix time in milliseconds at construction, as a decimal string.
    pub id: String,
    pub role: Role,
    pub content: String,
}

impl AdaptedMessage {
    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            id: chrono::Utc::now().timestamp_millis().to_string(),
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

#[derive(Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
enum OutgoingEvent<'a> {
    Message { message: &'a AdaptedMessage },
}

/// Pull the reply text out of a non-streaming upstream answer.
///
/// The first *truthy* field among `response`, `message`, `content` wins.
/// Null, `false`, `0` and `""` are skipped. Strings are used verbatim; any
/// other truthy value is rendered as compact JSON. A document without any of
/// the fields (including non-object documents) yields an empty reply, while a
/// bare `null` document is rejected.
pub fn extract_reply(data: &Value) -> Result<String, ChatError> {
    if data.is_null() {
        return Err(ChatError::Decode("upstream returned null".to_string()));
    }

    Ok(REPLY_FIELDS
        .iter()
        .filter_map(|field| data.get(*field))
        .find_map(truthy_text)
        .unwrap_or_default())
}

fn truthy_text(value: &Value) -> Option<String> {
    match value {
        Value::Null | Value::Bool(false) => None,
        Value::String(s) if s.is_empty() => None,
        Value::String(s) => Some(s.clone()),
        Value::Number(n) if n.as_f64() == Some(0.0) => None,
        other => Some(other.to_string()),
    }
}

/// Format `message` as a single `data:` frame.
pub fn message_frame(message: &AdaptedMessage) -> String {
    let json = serde_json::to_string(&OutgoingEvent::Message { message })
        .unwrap_or_else(|e| serde_json::json!({ "type": "error", "error": e.to_string() }).to_string());

    format!("data: {json}\n\n")
}

/// Two-frame stream carrying one complete message.
pub fn synthesize(
    message: AdaptedMessage,
) -> impl Stream<Item = Result<Bytes, Infallible>> + Send + 'static {
    async_stream::stream! {
        yield Ok(Bytes::from(message_frame(&message)));
        yield Ok(Bytes::from_static(DONE_FRAME.as_bytes()));
    }
}

fn event_stream(body: Body) -> Response {
    (
        [
            (header::CONTENT_TYPE, "text/event-stream"),
            (header::CACHE_CONTROL, "no-cache"),
            (header::CONNECTION, "keep-alive"),
        ],
        body,
    )
        .into_response()
}

/// Forwards a chat body upstream and shapes the answer as an event stream.
#[derive(Debug, Clone)]
pub struct ResponseAdapter {
    upstream: UpstreamClient,
    mode: StreamMode,
}

impl ResponseAdapter {
    #[must_use]
    pub fn new(upstream: UpstreamClient, mode: StreamMode) -> Self {
        Self { upstream, mode }
    }

    pub fn mode(&self) -> StreamMode {
        self.mode
    }

    pub async fn adapt(&self, body: &Value) -> Result<Response, ChatError> {
        let resp = self.upstream.post_json(body).await?;

        match self.mode {
            StreamMode::Native => {
                // Upstream status is not inspected in this branch.
                Ok(event_stream(Body::from_stream(resp.bytes_stream())))
            }
            StreamMode::Simulated => {
                let status = resp.status();
                if !status.is_success() {
                    return Err(ChatError::UpstreamStatus(status));
                }

                let bytes = resp.bytes().await?;
                let data: Value =
                    serde_json::from_slice(&bytes).map_err(|e| ChatError::Decode(e.to_string()))?;
                let message = AdaptedMessage::assistant(extract_reply(&data)?);

                Ok(event_stream(Body::from_stream(synthesize(message))))
            }
        }
    }
}
