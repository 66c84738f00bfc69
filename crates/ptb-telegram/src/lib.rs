//! Telegram adapter (teloxide).
//!
//! Maps Telegram updates into `ptb-core` messages and sends the replies back
//! with their quick-reply keyboards.

use teloxide::{
    prelude::*,
    types::{KeyboardButton, KeyboardMarkup, KeyboardRemove, ReplyMarkup},
};

use tokio::time::sleep;

pub mod handlers;
pub mod router;

use ptb_core::{
    domain::ChatId,
    errors::Error,
    messaging::types::{Reply, ReplyKeyboard},
    Result,
};

#[derive(Clone)]
pub struct TelegramMessenger {
    bot: Bot,
}

impl TelegramMessenger {
    pub fn new(bot: Bot) -> Self {
        Self { bot }
    }

    pub fn bot(&self) -> Bot {
        self.bot.clone()
    }

    fn tg_chat(chat_id: ChatId) -> teloxide::types::ChatId {
        teloxide::types::ChatId(chat_id.0)
    }

    fn map_err(e: teloxide::RequestError) -> Error {
        Error::External(format!("telegram error: {e}"))
    }

    async fn with_retry<T, Fut>(&self, mut op: impl FnMut() -> Fut) -> Result<T>
    where
        Fut: std::future::IntoFuture<Output = std::result::Result<T, teloxide::RequestError>>,
        Fut::IntoFuture: Send,
    {
        const MAX_RETRIES: usize = 1;
        let mut attempts = 0usize;
        loop {
            match op().await {
                Ok(v) => return Ok(v),
                Err(e) => match e {
                    teloxide::RequestError::RetryAfter(d) if attempts < MAX_RETRIES => {
                        attempts += 1;
                        tracing::warn!("telegram asked to retry after {d:?}");
                        sleep(d).await;
                        continue;
                    }
                    other => return Err(Self::map_err(other)),
                },
            }
        }
    }

    /// Send a reply as plain text with its keyboard.
    pub async fn send_reply(&self, chat_id: ChatId, reply: &Reply) -> Result<()> {
        let markup = reply_markup(&reply.keyboard);
        self.with_retry(|| {
            let mut req = self
                .bot
                .send_message(Self::tg_chat(chat_id), reply.text.clone());
            if let Some(markup) = &markup {
                req = req.reply_markup(markup.clone());
            }
            req
        })
        .await?;
        Ok(())
    }
}

/// Render a core keyboard as Telegram reply markup.
pub fn reply_markup(keyboard: &ReplyKeyboard) -> Option<ReplyMarkup> {
    match keyboard {
        ReplyKeyboard::Keep => None,
        ReplyKeyboard::Buttons(labels) => {
            let row: Vec<KeyboardButton> = labels.iter().map(KeyboardButton::new).collect();
            Some(ReplyMarkup::Keyboard(KeyboardMarkup::new(vec![row])))
        }
        ReplyKeyboard::Remove => Some(ReplyMarkup::KeyboardRemove(KeyboardRemove::new())),
    }
}
