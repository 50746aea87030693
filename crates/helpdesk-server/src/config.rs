//! Server configuration loaded from environment variables.
//!
//! All settings have sensible defaults so the server can start with zero
//! configuration for local development.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

/// Server configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Socket address for the HTTP (axum) API server.
    /// Env: `HTTP_ADDR`
    /// Default: `0.0.0.0:8080`
    pub http_addr: SocketAddr,

    /// Filesystem path of the SQLite database.
    /// Env: `DB_PATH`
    /// Default: `./helpdesk.db`
    pub db_path: PathBuf,

    /// Root URL of the Ollama endpoint the classifier talks to.
    /// Env: `OLLAMA_URL`
    /// Default: `http://127.0.0.1:11434`
    pub ollama_url: String,

    /// Model the classifier asks for.
    /// Env: `TRIAGE_MODEL`
    /// Default: `qwen3:4b`
    pub triage_model: String,

    /// Whole-request timeout for one classification.  An expired timeout is
    /// treated like any other classifier failure (fallback verdict).
    /// Env: `TRIAGE_TIMEOUT_SECS`
    /// Default: `30`
    pub triage_timeout: Duration,

    /// Human-readable name for this instance.
    /// Env: `INSTANCE_NAME`
    /// Default: `"TechCorp Support"`
    pub instance_name: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            http_addr: ([0, 0, 0, 0], 8080).into(),
            db_path: PathBuf::from("./helpdesk.db"),
            ollama_url: "http://127.0.0.1:11434".to_string(),
            triage_model: "qwen3:4b".to_string(),
            triage_timeout: Duration::from_secs(30),
            instance_name: "TechCorp Support".to_string(),
        }
    }
}

impl ServerConfig {
    /// Load configuration from environment variables, falling back to defaults.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(addr) = std::env::var("HTTP_ADDR") {
            if let Ok(parsed) = addr.parse::<SocketAddr>() {
                config.http_addr = parsed;
            } else {
                tracing::warn!(value = %addr, "Invalid HTTP_ADDR, using default");
            }
        }

        if let Ok(path) = std::env::var("DB_PATH") {
            config.db_path = PathBuf::from(path);
        }

        if let Ok(url) = std::env::var("OLLAMA_URL") {
            config.ollama_url = url.trim_end_matches('/').to_string();
        }

        if let Ok(model) = std::env::var("TRIAGE_MODEL") {
            config.triage_model = model;
        }

        if let Ok(val) = std::env::var("TRIAGE_TIMEOUT_SECS") {
            if let Ok(secs) = val.parse::<u64>() {
                config.triage_timeout = Duration::from_secs(secs);
            } else {
                tracing::warn!(value = %val, "Invalid TRIAGE_TIMEOUT_SECS, using default");
            }
        }

        if let Ok(name) = std::env::var("INSTANCE_NAME") {
            config.instance_name = name;
        }

        // RUST_LOG is handled directly by tracing-subscriber's EnvFilter,
        // so we do not store it here.

        config
    }
}
