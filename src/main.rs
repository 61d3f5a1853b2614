use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use timebot::config::Config;
use timebot::handler::UpdateHandler;
use timebot::server;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,timebot=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Config path: first argument, then TIMEBOT_CONFIG, then ./config.toml
    let config_path = std::env::args()
        .nth(1)
        .or_else(|| std::env::var("TIMEBOT_CONFIG").ok())
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("config.toml"));

    info!("Loading configuration from: {}", config_path.display());
    let config = Config::load(&config_path)
        .with_context(|| format!("Failed to load config from {}", config_path.display()))?;

    info!("Configuration loaded successfully");
    info!("  Port: {}", config.server.port);
    info!("  Webhook path: {}", config.server.webhook_path);

    let handler = Arc::new(UpdateHandler::from_token(&config.telegram.bot_token));

    info!("Bot is starting...");
    server::serve(handler, &config.server).await?;

    Ok(())
}
