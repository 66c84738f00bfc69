//! Telegram update handlers.
//!
//! Text messages are mapped into `ptb-core` and answered; everything else is
//! ignored.

use std::sync::Arc;

use teloxide::{prelude::*, types::Message};

use ptb_core::domain::{Chat, IncomingText};

use crate::router::AppState;

pub async fn handle_message(msg: Message, state: Arc<AppState>) -> ResponseResult<()> {
    let Some(incoming) = incoming_text(&msg) else {
        return Ok(());
    };

    let reply = state.bot.handle_text(&incoming).await;
    if let Err(e) = state.messenger.send_reply(incoming.chat.id, &reply).await {
        tracing::warn!(chat_id = incoming.chat.id.0, "failed to send reply: {e}");
    }

    Ok(())
}

/// The chat's username (not the sender's) is what admin checks use.
fn incoming_text(msg: &Message) -> Option<IncomingText> {
    let text = msg.text()?;
    Some(IncomingText {
        chat: Chat::new(msg.chat.id.0, msg.chat.username()),
        text: text.to_string(),
    })
}
