//! Layered configuration for the chat gateway.
//!
//! Sources, lowest to highest precedence: built-in defaults, a config file,
//! `LAWCHAT_`-prefixed environment variables, the legacy environment names the
//! web client deployment already sets (`FASTAPI_URL` and friends), and finally
//! CLI flags.

use crate::adapter::StreamMode;
use clap::Parser;
use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::env;
use std::path::PathBuf;
use url::Url;

/// Upstream chat endpoint used when nothing else is configured.
pub const DEFAULT_UPSTREAM_URL: &str = "http://localhost:8000/chat";

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Config file path
    #[arg(short, long, env = "CONFIG_FILE")]
    pub config: Option<String>,

    /// Address to bind
    #[arg(long)]
    pub host: Option<String>,

    /// Port to listen on
    #[arg(long, env = "PORT")]
    pub port: Option<u16>,

    /// Upstream chat endpoint
    #[arg(long)]
    pub upstream_url: Option<String>,

    /// Log output format (pretty or json)
    #[arg(long)]
    pub log_format: Option<String>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub upstream: UpstreamConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub port: u16,
    pub host: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct UpstreamConfig {
    /// FastAPI chat endpoint every request is forwarded to.
    pub url: String,
    /// Whether the endpoint answers with an event stream itself.
    pub supports_streaming: bool,
}

/// Supabase project settings. Both values are optional here; they are only
/// checked when the database client is constructed.
#[derive(Debug, Deserialize, Clone, Default)]
pub struct DatabaseConfig {
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub anon_key: Option<String>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct LoggingConfig {
    pub format: LogFormat,
}

#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Pretty,
    Json,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from_args(std::env::args())
    }

    pub fn load_from_args<I, T>(args: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = T>,
        T: Into<std::ffi::OsString> + Clone,
    {
        let cli = Cli::try_parse_from(args).map_err(|e| ConfigError::Message(e.to_string()))?;

        // 1. Defaults
        let mut builder = Config::builder()
            .set_default("server.host", "0.0.0.0")?
            .set_default("server.port", 3000)?
            .set_default("upstream.url", DEFAULT_UPSTREAM_URL)?
            .set_default("upstream.supports_streaming", false)?
            .set_default("logging.format", "pretty")?;

        // 2. Config file: explicit path must exist, ./config.* is optional
        builder = match &cli.config {
            Some(path) => builder.add_source(File::from(PathBuf::from(path)).required(true)),
            None => builder.add_source(File::with_name("config").required(false)),
        };

        // 3. Prefixed environment, e.g. LAWCHAT_SERVER__PORT=8080
        builder = builder.add_source(
            Environment::with_prefix("LAWCHAT")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        // 4. Legacy names
        if let Some(url) = non_empty_var("FASTAPI_URL") {
            builder = builder.set_override("upstream.url", url)?;
        }
        if let Ok(flag) = env::var("FASTAPI_SUPPORTS_STREAMING") {
            // Only the exact string "true" turns native streaming on.
            builder = builder.set_override("upstream.supports_streaming", flag == "true")?;
        }
        if let Ok(url) = env::var("NEXT_PUBLIC_SUPABASE_URL") {
            builder = builder.set_override("database.url", url)?;
        }
        if let Ok(key) = env::var("NEXT_PUBLIC_SUPABASE_ANON_KEY") {
            builder = builder.set_override("database.anon_key", key)?;
        }

        // 5. CLI flags
        if let Some(host) = cli.host {
            builder = builder.set_override("server.host", host)?;
        }
        if let Some(port) = cli.port {
            builder = builder.set_override("server.port", i64::from(port))?;
        }
        if let Some(url) = cli.upstream_url {
            builder = builder.set_override("upstream.url", url)?;
        }
        if let Some(format) = cli.log_format {
            builder = builder.set_override("logging.format", format)?;
        }

        builder.build()?.try_deserialize()
    }

    /// Parsed upstream endpoint.
    pub fn upstream_url(&self) -> Result<Url, ConfigError> {
        Url::parse(&self.upstream.url).map_err(|e| {
            ConfigError::Message(format!("invalid upstream url {:?}: {e}", self.upstream.url))
        })
    }

    /// Adapter branch selected by `upstream.supports_streaming`.
    pub fn stream_mode(&self) -> StreamMode {
        if self.upstream.supports_streaming {
            StreamMode::Native
        } else {
            StreamMode::Simulated
        }
    }
}

fn non_empty_var(key: &str) -> Option<String> {
    env::var(key).ok().filter(|v| !v.is_empty())
}
