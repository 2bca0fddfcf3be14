use std::sync::Arc;

use dotenv::dotenv;
use teloxide::{
    dispatching::dialogue::{serializer::Json, InMemStorage, SqliteStorage, Storage},
    prelude::*,
};

use hcm202_bot::{
    bot::{locks::ChatLocks, schema, DialogueStorage, HandlerError, State},
    chat::{CompletionClient, HttpCompletionClient},
    config::Config,
    content::Catalog,
    feedback::{FeedbackStore, SupabaseFeedbackStore},
};

#[tokio::main]
async fn main() -> Result<(), HandlerError> {
    dotenv().ok();
    pretty_env_logger::init();
    log::info!("Starting HCM202 study bot...");

    let config = Config::from_env()?;
    let catalog = Arc::new(Catalog::load(&config.content_dir)?);

    let client: Arc<dyn CompletionClient> = Arc::new(HttpCompletionClient::new(
        &config.chat_api_url,
        config.chat_api_key.clone(),
        &config.chat_model,
        config.chat_temperature,
        config.chat_timeout,
    )?);
    let store: Arc<dyn FeedbackStore> = Arc::new(SupabaseFeedbackStore::new(
        config.supabase_url.clone(),
        config.supabase_anon_key.clone(),
        &config.feedback_table,
        config.chat_timeout,
    )?);

    let storage: DialogueStorage = match &config.dialogue_db {
        Some(path) => {
            log::info!("Keeping dialogues in {}", path);
            SqliteStorage::open(path, Json).await?.erase()
        }
        None => {
            log::info!("Keeping dialogues in memory");
            InMemStorage::<State>::new().erase()
        }
    };

    let locks = Arc::new(ChatLocks::new());
    let bot = Bot::from_env();

    Dispatcher::builder(bot, schema())
        .dependencies(dptree::deps![storage, catalog, client, store, locks])
        .enable_ctrlc_handler()
        .build()
        .dispatch()
        .await;

    Ok(())
}
