//! DormDesk Server — hostel maintenance chat backend
//!
//! Main entry point that wires all crates together and starts the server.

use std::sync::Arc;

use tracing_subscriber::{EnvFilter, fmt};

use dormdesk_api::AppState;
use dormdesk_core::config::AppConfig;
use dormdesk_core::error::AppError;
use dormdesk_realtime::ChatEngine;
use dormdesk_store::MemoryMessageStore;

#[tokio::main]
async fn main() {
    let config = match load_configuration() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load configuration: {}", e);
            std::process::exit(1);
        }
    };

    init_logging(&config);

    if let Err(e) = run(config).await {
        tracing::error!("Server error: {}", e);
        std::process::exit(1);
    }
}

/// Load configuration from file and environment
fn load_configuration() -> Result<AppConfig, AppError> {
    let config_path =
        std::env::var("DORMDESK_CONFIG").unwrap_or_else(|_| "config/default".to_string());

    AppConfig::load(&config_path)
}

/// Initialize tracing/logging
fn init_logging(config: &AppConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.logging.level));

    match config.logging.format.as_str() {
        "json" => {
            fmt()
                .json()
                .with_env_filter(filter)
                .with_target(true)
                .with_thread_ids(true)
                .init();
        }
        _ => {
            fmt().pretty().with_env_filter(filter).with_target(true).init();
        }
    }
}

/// Main server run function
async fn run(config: AppConfig) -> Result<(), AppError> {
    tracing::info!("Starting DormDesk v{}", env!("CARGO_PKG_VERSION"));

    // The chat core only touches the message log through the store
    // trait; the in-process backend is the default deployment.
    let store = Arc::new(MemoryMessageStore::new());
    let chat = ChatEngine::new(config.realtime.clone(), store);

    let addr = format!("{}:{}", config.server.host, config.server.port);

    let state = AppState {
        config: Arc::new(config),
        chat: chat.clone(),
    };
    let app = dormdesk_api::build_router(state);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(addr = %addr, "DormDesk server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(chat))
        .await?;

    Ok(())
}

/// Waits for Ctrl-C, then shuts the chat engine down.
async fn shutdown_signal(chat: ChatEngine) {
    if tokio::signal::ctrl_c().await.is_err() {
        tracing::error!("Failed to listen for shutdown signal");
        return;
    }
    tracing::info!("Shutdown signal received");
    chat.shutdown();
}
