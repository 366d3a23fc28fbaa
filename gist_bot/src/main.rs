mod bot;
mod config;
mod dependencies;
mod message_history;

use std::sync::Arc;

use anyhow::Result;
use gist_core::conversation::storage::ConversationStore;
use gist_core::recap::handler::Recap;
use gist_core::summarizer::handler::SummarizationClient;
use teloxide::prelude::*;

use crate::bot::handler_tree::handler_tree;
use crate::config::{AppConfig, HistoryBackend};
use crate::dependencies::BotDependencies;

fn open_store(config: &AppConfig) -> Result<ConversationStore> {
    let store = match config.history_backend {
        HistoryBackend::Sled => {
            let db = sled::open(&config.history_path)?;
            ConversationStore::with_sled(&db)?
        }
        HistoryBackend::File => ConversationStore::with_files(&config.history_path)?,
    };
    Ok(store)
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt::init();
    log::info!("Starting gist_bot...");

    let config = AppConfig::from_env()?;
    log::info!(
        "Using {:?} history at {} and summarizer at {}",
        config.history_backend,
        config.history_path.display(),
        config.summarizer_domain
    );

    let store = open_store(&config)?;
    let client = SummarizationClient::from_config(config.transport_config(), config.max_wait)?;

    let bot_deps = BotDependencies {
        store: store.clone(),
        recap: Arc::new(Recap::new(store, client)),
    };

    let bot = Bot::new(&config.telegram_bot_token);

    Dispatcher::builder(bot, handler_tree())
        .dependencies(dptree::deps![bot_deps])
        .enable_ctrlc_handler()
        .build()
        .dispatch()
        .await;

    Ok(())
}
