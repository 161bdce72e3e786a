use anyhow::Context;
use axum::Router;
use std::net::SocketAddr;
use tracing::{error, info};

use zed_lake_datasource::api::{handlers::AppState, routes};
use zed_lake_datasource::config::Config;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load configuration
    let config = Config::from_env().context("Failed to load configuration")?;

    // Initialize logging
    let default_level = config.logging.level.clone();
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level)),
        )
        .with_ansi(config.logging.style != "never")
        .init();

    info!("Using Zed lake at {}", config.datasource_settings().base_url());

    let state = AppState::from_config(&config)
        .inspect_err(|e| error!("Failed to initialize lake client: {}", e))
        .context("Failed to initialize lake client")?;

    // Create router with state
    let app: Router = routes::create_router_with_state(state);

    // Start server
    let addr: SocketAddr = config
        .server_address()
        .parse()
        .with_context(|| format!("Invalid server address {}", config.server_address()))?;
    info!("Server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
