//! TrailHunt - Location-Based Scavenger Hunt Backend
//!
//! Main entry point for the server.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use trailhunt::config;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting TrailHunt v{}", env!("CARGO_PKG_VERSION"));

    let config = config::load_config()?;
    tracing::info!("Data directory: {}", config.data_dir.display());

    trailhunt::server::run(config).await
}
