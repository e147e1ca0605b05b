use bd_law_chat::adapter::StreamMode;
use bd_law_chat::config::{AppConfig, DEFAULT_UPSTREAM_URL, LogFormat};
use bd_law_chat::database::DatabaseClient;
use bd_law_chat::error::ChatError;
use serial_test::serial;
use std::env;
use std::io::Write;

const ARGS: [&str; 1] = ["bd-law-chat"];

// Helper to clear environment variables that might interfere with tests
fn clear_env_vars() {
    unsafe {
        for key in [
            "CONFIG_FILE",
            "PORT",
            "FASTAPI_URL",
            "FASTAPI_SUPPORTS_STREAMING",
            "NEXT_PUBLIC_SUPABASE_URL",
            "NEXT_PUBLIC_SUPABASE_ANON_KEY",
            "LAWCHAT_SERVER__PORT",
            "LAWCHAT_UPSTREAM__URL",
        ] {
            env::remove_var(key);
        }
    }
}

#[test]
#[serial]
fn test_default_config() {
    clear_env_vars();

    let config = AppConfig::load_from_args(ARGS).expect("Failed to load config");
    assert_eq!(config.server.port, 3000);
    assert_eq!(config.server.host, "0.0.0.0");
    assert_eq!(config.upstream.url, DEFAULT_UPSTREAM_URL);
    assert_eq!(config.stream_mode(), StreamMode::Simulated);
    assert_eq!(config.logging.format, LogFormat::Pretty);
    assert!(config.database.url.is_none());
    assert!(config.database.anon_key.is_none());
}

#[test]
#[serial]
fn test_legacy_upstream_env() {
    clear_env_vars();
    unsafe {
        env::set_var("FASTAPI_URL", "http://backend:9000/chat");
        env::set_var("FASTAPI_SUPPORTS_STREAMING", "true");
    }

    let config = AppConfig::load_from_args(ARGS).expect("Failed to load config");
    assert_eq!(config.upstream.url, "http://backend:9000/chat");
    assert_eq!(config.stream_mode(), StreamMode::Native);

    clear_env_vars();
}

#[test]
#[serial]
fn test_streaming_flag_requires_exact_true() {
    clear_env_vars();

    for value in ["TRUE", "1", "yes", ""] {
        unsafe {
            env::set_var("FASTAPI_SUPPORTS_STREAMING", value);
        }
        let config = AppConfig::load_from_args(ARGS).expect("Failed to load config");
        assert_eq!(config.stream_mode(), StreamMode::Simulated, "value {value:?}");
    }

    clear_env_vars();
}

#[test]
#[serial]
fn test_empty_upstream_env_falls_back_to_default() {
    clear_env_vars();
    unsafe {
        env::set_var("FASTAPI_URL", "");
    }

    let config = AppConfig::load_from_args(ARGS).expect("Failed to load config");
    assert_eq!(config.upstream.url, DEFAULT_UPSTREAM_URL);

    clear_env_vars();
}

#[test]
#[serial]
fn test_prefixed_env_override() {
    clear_env_vars();
    unsafe {
        env::set_var("LAWCHAT_SERVER__PORT", "9090");
    }

    let config = AppConfig::load_from_args(ARGS).expect("Failed to load config");
    assert_eq!(config.server.port, 9090);

    clear_env_vars();
}

#[test]
#[serial]
fn test_file_load() {
    clear_env_vars();

    let mut file = tempfile::Builder::new()
        .suffix(".yaml")
        .tempfile()
        .expect("Failed to create temp config");
    write!(
        file,
        r#"
server:
  port: 7070
upstream:
  url: http://file-backend/chat
  supports_streaming: true
logging:
  format: json
"#
    )
    .unwrap();

    unsafe {
        env::set_var("CONFIG_FILE", file.path());
    }

    let config = AppConfig::load_from_args(ARGS).expect("Failed to load config from file");
    assert_eq!(config.server.port, 7070);
    assert_eq!(config.upstream.url, "http://file-backend/chat");
    assert_eq!(config.stream_mode(), StreamMode::Native);
    assert_eq!(config.logging.format, LogFormat::Json);

    clear_env_vars();
}

#[test]
#[serial]
fn test_missing_explicit_file_fails() {
    clear_env_vars();

    let result = AppConfig::load_from_args(["bd-law-chat", "--config", "does-not-exist.yaml"]);
    assert!(result.is_err());
}

#[test]
#[serial]
fn test_cli_flags_beat_env() {
    clear_env_vars();
    unsafe {
        env::set_var("FASTAPI_URL", "http://from-env/chat");
        env::set_var("LAWCHAT_SERVER__PORT", "9090");
    }

    let config = AppConfig::load_from_args([
        "bd-law-chat",
        "--port",
        "5050",
        "--upstream-url",
        "http://from-cli/chat",
    ])
    .expect("Failed to load config");
    assert_eq!(config.server.port, 5050);
    assert_eq!(config.upstream.url, "http://from-cli/chat");

    clear_env_vars();
}

#[test]
#[serial]
fn test_missing_database_env_fails_on_connect_not_load() {
    clear_env_vars();

    let config = AppConfig::load_from_args(ARGS).expect("Load must not require database settings");
    let err = DatabaseClient::connect(&config.database).unwrap_err();
    assert!(matches!(err, ChatError::Config(_)));
}

#[test]
#[serial]
fn test_database_env_is_picked_up() {
    clear_env_vars();
    unsafe {
        env::set_var("NEXT_PUBLIC_SUPABASE_URL", "https://demo.supabase.co");
        env::set_var("NEXT_PUBLIC_SUPABASE_ANON_KEY", "anon-key");
    }

    let config = AppConfig::load_from_args(ARGS).expect("Failed to load config");
    let client = DatabaseClient::connect(&config.database).expect("Failed to build client");
    assert_eq!(client.base_url().as_str(), "https://demo.supabase.co/");

    clear_env_vars();
}
