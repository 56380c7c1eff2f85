mod bot;
mod commands;
mod config;
mod dadata;
mod platform;
mod session;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use teloxide::prelude::*;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::bot::InnBot;
use crate::config::Config;
use crate::dadata::DadataClient;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,innbot=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config_path = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("config.toml"));

    info!("Loading configuration from: {}", config_path.display());
    let config = Config::load(&config_path)
        .with_context(|| format!("Failed to load config from {}", config_path.display()))?;

    info!("Configuration loaded successfully");
    info!("  DaData endpoint: {}", config.dadata.find_party_url());
    info!("  Request timeout: {}s", config.dadata.timeout_secs);
    info!(
        "  Max concurrent lookups: {}",
        config.dadata.max_concurrent_requests
    );

    let dadata = DadataClient::new(config.dadata.clone())?;
    let core = Arc::new(InnBot::new(Arc::new(dadata)));

    let bot = Bot::new(&config.telegram.bot_token);
    let me = bot
        .get_me()
        .await
        .context("Failed to reach Telegram with the configured bot token")?;
    info!("Bot {} (@{}) is starting...", me.first_name, me.username());

    platform::telegram::run(core, bot).await?;

    Ok(())
}
