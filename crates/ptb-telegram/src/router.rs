use std::sync::Arc;

use teloxide::{dispatching::Dispatcher, dptree, prelude::*};

use ptb_core::{bot::PhraseBot, config::Config, store::PhraseStore};

use crate::handlers;
use crate::TelegramMessenger;

#[derive(Clone)]
pub struct AppState {
    pub bot: Arc<PhraseBot>,
    pub messenger: TelegramMessenger,
}

pub async fn run_polling(cfg: Arc<Config>, store: Arc<PhraseStore>) -> anyhow::Result<()> {
    let tg = Bot::new(cfg.bot_api_token.clone());

    // Knowing our own username lets `/speak@other_bot` in groups be ignored.
    let me = match tg.get_me().await {
        Ok(me) => {
            tracing::info!("started as @{}", me.username());
            Some(me.username().to_string())
        }
        Err(e) => {
            tracing::warn!("getMe failed, accepting commands for any bot name: {e}");
            None
        }
    };

    let bot = PhraseBot::new(cfg.clone(), store)?.with_bot_username(me.as_deref());
    tracing::info!(
        "phrases: {} ({}), admin: @{}",
        bot.store().len().await,
        cfg.phrases_file.display(),
        cfg.admin_username
    );

    let state = Arc::new(AppState {
        bot: Arc::new(bot),
        messenger: TelegramMessenger::new(tg.clone()),
    });

    let handler =
        dptree::entry().branch(Update::filter_message().endpoint(handlers::handle_message));

    tracing::info!("bot is listening");
    Dispatcher::builder(tg, handler)
        .dependencies(dptree::deps![state])
        .build()
        .dispatch()
        .await;

    Ok(())
}
