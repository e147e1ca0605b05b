//! Bangladesh Law AI chat gateway
//!
//! Server side of the Bangladesh Law AI web client. Chat requests are
//! forwarded to a FastAPI backend and the answer is always returned to the
//! browser as an event stream, whether or not the backend streams itself.
//!
//! # Architecture
//!
//! - **Server**: Axum HTTP server exposing `POST /api/chat`
//! - **Adapter**: pass-through or synthesized SSE framing of upstream answers
//! - **Database**: explicitly constructed Supabase REST client
//!
//! # Modules
//!
//! - [`adapter`]: Response adapter and SSE framing
//! - [`config`]: Layered configuration (defaults, file, env, CLI)
//! - [`database`]: Supabase client
//! - [`error`]: Gateway error type
//! - [`server`]: Router and server startup
//! - [`upstream`]: HTTP client for the FastAPI backend

#![allow(clippy::missing_fields_in_debug)]

pub mod adapter;
pub mod config;
pub mod database;
pub mod error;
pub mod server;
pub mod upstream;

use crate::adapter::ResponseAdapter;
use crate::config::AppConfig;
use crate::database::DatabaseClient;

use std::sync::Arc;

/// Application state shared across all handlers.
#[derive(Clone, Debug)]
pub struct AppState {
    /// Forwards chat bodies upstream and shapes the reply stream.
    pub adapter: Arc<ResponseAdapter>,
    /// Supabase client, absent when the project settings are not configured.
    pub database: Option<Arc<DatabaseClient>>,
    /// Global Configuration
    pub config: Arc<AppConfig>,
}
