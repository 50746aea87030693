//! # helpdesk-server
//!
//! HTTP server for the AI-triage helpdesk.
//!
//! This binary wires the pieces together:
//! - **SQLite store** for customers, tickets, and their message threads
//! - **Triage classifier** (Ollama-backed) that drafts a reply, scores
//!   sentiment, and decides whether a human must take over
//! - **Lifecycle engine** owning the ticket state machine
//! - **REST API** (axum) exposing exactly the engine surface to the
//!   submission form and the agent dashboard

mod api;
mod config;
mod error;

use std::sync::Arc;

use tracing::info;
use tracing_subscriber::EnvFilter;

use helpdesk_engine::LifecycleEngine;
use helpdesk_store::Database;
use helpdesk_triage::OllamaClassifier;

use crate::api::AppState;
use crate::config::ServerConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // -----------------------------------------------------------------------
    // 1. Initialize tracing (respects RUST_LOG env var)
    // -----------------------------------------------------------------------
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,helpdesk_server=debug")),
        )
        .init();

    info!("Starting helpdesk server v{}", env!("CARGO_PKG_VERSION"));

    // -----------------------------------------------------------------------
    // 2. Load configuration
    // -----------------------------------------------------------------------
    let config = ServerConfig::from_env();
    info!(?config, "Loaded configuration");

    // -----------------------------------------------------------------------
    // 3. Initialize subsystems
    // -----------------------------------------------------------------------
    let db = Database::open(&config.db_path)?;

    let classifier = Arc::new(OllamaClassifier::new(
        config.ollama_url.clone(),
        config.triage_model.clone(),
        config.triage_timeout,
    ));

    let engine = Arc::new(LifecycleEngine::new(db, classifier));

    let http_addr = config.http_addr;
    let state = AppState {
        engine,
        config: Arc::new(config),
    };

    // -----------------------------------------------------------------------
    // 4. Run the HTTP API server (blocks until shutdown)
    // -----------------------------------------------------------------------
    tokio::select! {
        result = api::serve(state, http_addr) => {
            if let Err(e) = result {
                tracing::error!(error = %e, "HTTP server failed");
                return Err(e);
            }
        }
        _ = tokio::signal::ctrl_c() => {
            info!("Received Ctrl+C, shutting down");
        }
    }

    Ok(())
}
