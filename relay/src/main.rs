mod config;
mod errors;
mod metrics;
mod normalize;
mod webhook;

use axum::{routing::get, Router};
use config::RelayConfig;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = match RelayConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            error!("{}", e);
            std::process::exit(1);
        }
    };

    info!("Starting Tive webhook relay");
    info!("HTTP server: {}", config.http_addr);
    info!("Upstream: {}", config.upstream_url);

    if let Err(e) = metrics::init_metrics() {
        warn!("Failed to register metrics: {}", e);
    }

    if let Err(e) = run(config).await {
        error!("Relay failed: {}", e);
        std::process::exit(1);
    }

    info!("Shutting down");
}

async fn run(config: RelayConfig) -> errors::Result<()> {
    let app = Router::new()
        .route("/health", get(health_handler))
        .route("/metrics", get(metrics_handler))
        .merge(webhook::create_router(&config, reqwest::Client::new()));

    let listener = tokio::net::TcpListener::bind(config.http_addr).await?;
    info!("HTTP server listening on {}", config.http_addr);

    let server_handle = tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap_or_else(|e| {
            error!("HTTP server error: {}", e);
        });
    });

    tokio::select! {
        _ = server_handle => {
            error!("HTTP server terminated");
        }
        _ = tokio::signal::ctrl_c() => {
            info!("Received shutdown signal");
        }
    }

    Ok(())
}

async fn health_handler() -> &'static str {
    "ok"
}

async fn metrics_handler() -> String {
    metrics::gather_metrics()
}
