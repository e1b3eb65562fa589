//! # lexdoc-api: Binary Entry Point
//!
//! Starts the HTTP server and the background job scheduler.
//! Set `LEXDOC_LOG_JSON=true` for JSON log lines.

use lexdoc_api::middleware::metrics::install_recorder;
use lexdoc_api::state::{AppConfig, AppState};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    let json = std::env::var("LEXDOC_LOG_JSON")
        .map(|v| v.eq_ignore_ascii_case("true"))
        .unwrap_or(false);
    if json {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }

    let config = AppConfig::from_env().map_err(|e| {
        tracing::error!("configuration error: {e}");
        e
    })?;
    let port = config.port;
    let metrics_enabled = config.metrics_enabled;
    if config.auth_token.is_none() {
        tracing::warn!("AUTH_TOKEN not set; callers are identified by X-Actor-Id headers");
    }

    let mut state = AppState::try_with_config(config).map_err(|e| {
        tracing::error!("content store initialization failed: {e}");
        e
    })?;
    if metrics_enabled {
        state = state.with_metrics(install_recorder()?);
    }

    let jobs = lexdoc_api::scheduler::spawn(state.lifecycle.clone(), &state.config.jobs);
    let app = lexdoc_api::app(state);

    let addr = std::net::SocketAddr::from(([0, 0, 0, 0], port));
    tracing::info!("lexdoc API listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    for job in jobs {
        job.abort();
    }
    tracing::info!("shutdown complete");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("failed to listen for shutdown signal: {e}");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutdown signal received");
}
