/// Telegram chat id (numeric).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ChatId(pub i64);

/// The part of a chat the bot cares about: where to reply and who is talking.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Chat {
    pub id: ChatId,
    pub username: Option<String>,
}

impl Chat {
    pub fn new(id: i64, username: Option<&str>) -> Self {
        Self {
            id: ChatId(id),
            username: username.map(|s| s.to_string()),
        }
    }
}

/// A plain text message delivered to the bot.
#[derive(Clone, Debug)]
pub struct IncomingText {
    pub chat: Chat,
    pub text: String,
}
