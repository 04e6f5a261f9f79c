use std::sync::Arc;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use inventory_api::{build_app, config::AppConfig, connect};

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    if let Err(err) = run().await {
        error!(error = %err, "Server stopped");
        std::process::exit(1);
    }
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::from_env()?;

    let db = connect(&config).await?;
    let app = build_app(Arc::new(db), &config);

    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    info!(addr = %config.bind_addr, "Running");
    axum::serve(listener, app).await?;
    Ok(())
}
