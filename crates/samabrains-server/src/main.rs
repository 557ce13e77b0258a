//! `SamaBrains` server entry point.
//!
//! Loads configuration, wires the Brevo transport and the in-memory counter
//! store into the application state, then starts the Axum HTTP server with
//! graceful shutdown.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use tokio::net::TcpListener;
use tracing::{info, warn};

use samabrains_core::brevo::BrevoTransport;
use samabrains_server::config::ServerConfig;
use samabrains_server::routes::build_router;
use samabrains_server::state::AppState;
use samabrains_store::MemoryStore;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load configuration from environment.
    let config = ServerConfig::from_env();

    init_tracing(&config);

    for warning in &config.warnings {
        warn!("{warning}");
    }
    log_startup(&config);

    let transport = BrevoTransport::new(config.brevo_api_url.clone(), config.brevo_timeout)
        .context("failed to build Brevo HTTP client")?;
    let state = Arc::new(AppState::new(
        &config,
        Arc::new(transport),
        Arc::new(MemoryStore::new()),
    ));

    let app = build_router(state, &config.site_dir);

    let listener = TcpListener::bind(config.bind_addr)
        .await
        .with_context(|| format!("failed to bind to {}", config.bind_addr))?;

    info!(addr = %config.bind_addr, "SamaBrains server listening");

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await
    .context("server error")?;

    info!("SamaBrains server stopped");
    Ok(())
}

/// JSON lines in production, compact human-readable lines otherwise.
/// `RUST_LOG` overrides the configured level.
fn init_tracing(config: &ServerConfig) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.log_level));

    if config.environment.is_production() {
        tracing_subscriber::fmt().with_env_filter(filter).json().init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).compact().init();
    }
}

fn log_startup(config: &ServerConfig) {
    let operator = config.operator_mailbox();

    info!(
        mode = config.environment.as_str(),
        brevo_api_key = if config.brevo_api_key.is_some() { "configured" } else { "missing" },
        contact_email = %operator.email,
        contact_email_source = if config.contact_email.is_some() { "env" } else { "default" },
        sender = ?config.sender_identity,
        site_dir = %config.site_dir.display(),
        trust_proxy = config.trust_proxy,
        "SamaBrains server starting"
    );

    if config.brevo_api_key.is_none() {
        warn!("BREVO_API_KEY is not set, contact submissions will fail with a configuration error");
    }
    if !config.environment.is_production() {
        warn!("development mode, every origin may call /api");
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c().await.ok();
    };

    #[cfg(unix)]
    let terminate = async {
        if let Ok(mut sig) =
            tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
        {
            sig.recv().await;
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    info!("shutdown signal received, stopping server");
}
