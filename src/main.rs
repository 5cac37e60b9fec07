//! NotiHub agent: headless real-time notification client.
//!
//! Loads configuration, opens the event stream for the signed-in user, and
//! mirrors new notifications to the native surface until stopped.

use std::sync::Arc;

use tracing_subscriber::{EnvFilter, fmt};

use notihub_client::{Endpoint, HttpEventSource, HttpNotificationApi};
use notihub_core::config::AppConfig;
use notihub_core::error::AppError;
use notihub_core::traits::notifier::NativeNotifier;
use notihub_realtime::NotificationEngine;
use notihub_realtime::bridge::{ConsoleNotifier, TracingNotifier};

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
        tracing::error!("Agent error: {}", e);
        std::process::exit(1);
    }
}

/// Load configuration for `NOTIHUB_ENV` and validate it
fn load_configuration() -> Result<AppConfig, AppError> {
    let env = std::env::var("NOTIHUB_ENV").unwrap_or_else(|_| "development".to_string());

    let config = match std::env::var("NOTIHUB_CONFIG") {
        Ok(path) => AppConfig::load_file(&path)?,
        Err(_) => AppConfig::load(&env)?,
    };
    config.validate()?;
    Ok(config)
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
            fmt()
                .pretty()
                .with_env_filter(filter)
                .with_target(true)
                .init();
        }
    }
}

/// Run the engine until a shutdown signal arrives
async fn run(config: AppConfig) -> Result<(), AppError> {
    tracing::info!("Starting NotiHub agent v{}", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        api = %config.api.base_url,
        stream = %config.stream.path,
        language = %config.locale.language,
        "Configuration loaded"
    );

    let endpoint = Endpoint::new(&config.api, &config.session)?;
    let notifier: Arc<dyn NativeNotifier> = match config.logging.format.as_str() {
        "json" => Arc::new(TracingNotifier),
        _ => Arc::new(ConsoleNotifier::new(config.native.permission)),
    };

    let engine = NotificationEngine::new(
        config,
        Arc::new(HttpNotificationApi::new(endpoint.clone())),
        Arc::new(HttpEventSource::new(endpoint)),
        notifier,
    );

    let permission = engine.start().await?;
    tracing::info!(
        unread = engine.store().unread_count(),
        ?permission,
        "Agent running; press Ctrl-C to stop"
    );

    shutdown_signal().await;

    engine.shutdown().await;
    tracing::info!("NotiHub agent stopped");
    Ok(())
}

/// Wait for Ctrl-C or SIGTERM
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}
