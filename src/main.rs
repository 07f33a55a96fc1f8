use std::sync::Arc;

use anyhow::Context;

use smart_school_console::{config, server};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present so cargo run picks up the subsystem URLs
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let config = Arc::new(config::config().clone());
    tracing::info!("Starting Smart School console in {:?} mode", config.environment);

    let app = server::app(config);

    let port = std::env::var("CONSOLE_PORT")
        .ok()
        .or_else(|| std::env::var("PORT").ok())
        .and_then(|s| s.parse::<u16>().ok())
        .unwrap_or(3000);

    let listener = server::bind("0.0.0.0", port).await?;
    tracing::info!("Smart School console listening on http://{}", listener.local_addr()?);

    axum::serve(listener, app).await.context("console server stopped")?;
    Ok(())
}
