mod bot;
mod command;
mod config;
mod platform;
mod translate;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use teloxide::prelude::*;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::bot::Relay;
use crate::config::Config;
use crate::platform::telegram::{self, TelegramSender};
use crate::translate::GoogleTranslator;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,traductora=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    if let Some(path) = config::load_dotenv()? {
        info!("Loaded environment from {}", path.display());
    }

    let config = match std::env::args().nth(1).map(PathBuf::from) {
        Some(path) => {
            info!("Loading configuration from: {}", path.display());
            Config::load(&path)
                .with_context(|| format!("Failed to load config from {}", path.display()))?
        }
        None => Config::from_env().context("Failed to load config from environment")?,
    };

    info!("Configuration loaded successfully");
    info!("  Authorized chat: {}", config.telegram.authorized_chat_id);
    info!("  Translate endpoint: {}", config.translate.base_url);

    let translator = GoogleTranslator::new(config.translate.clone());

    let mut bot = Bot::new(&config.telegram.bot_token);
    if let Some(api_url) = &config.telegram.api_url {
        let url = reqwest::Url::parse(api_url)
            .with_context(|| format!("Invalid Telegram API URL: {}", api_url))?;
        bot = bot.set_api_url(url);
    }

    let me = bot.get_me().await.context("Failed to fetch bot account")?;
    let bot_username = me.user.username.clone().unwrap_or_default();
    info!("Using account: {}", bot_username);

    let relay = Arc::new(Relay::new(
        config.telegram.authorized_chat_id,
        bot_username,
        Arc::new(translator),
        Arc::new(TelegramSender::new(bot.clone())),
    ));

    info!("Bot is starting...");
    telegram::run(bot, relay, config.telegram.poll_timeout()).await?;

    Ok(())
}
