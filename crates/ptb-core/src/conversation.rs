use std::{
    collections::HashMap,
    time::{Duration, Instant},
};

use crate::domain::ChatId;

/// Per-chat "what should I remember?" state.
///
/// A chat with no entry is idle. An entry means the chat's next plain message
/// from the admin is taken as a new phrase. Entries optionally expire.
#[derive(Clone, Debug, Default)]
pub struct ConversationController {
    timeout: Option<Duration>,
    awaiting: HashMap<ChatId, Instant>,
}

impl ConversationController {
    pub fn new(timeout: Option<Duration>) -> Self {
        Self {
            timeout,
            awaiting: HashMap::new(),
        }
    }

    pub fn begin(&mut self, chat: ChatId) {
        self.begin_at(chat, Instant::now());
    }

    pub fn begin_at(&mut self, chat: ChatId, now: Instant) {
        self.awaiting.insert(chat, now);
    }

    /// Consume the awaiting state for `chat`. Returns whether it was live.
    pub fn take_pending(&mut self, chat: ChatId) -> bool {
        self.take_pending_at(chat, Instant::now())
    }

    pub fn take_pending_at(&mut self, chat: ChatId, now: Instant) -> bool {
        let Some(since) = self.awaiting.remove(&chat) else {
            return false;
        };
        !self.expired(since, now)
    }

    pub fn cancel(&mut self, chat: ChatId) {
        self.awaiting.remove(&chat);
    }

    pub fn is_awaiting(&self, chat: ChatId) -> bool {
        self.is_awaiting_at(chat, Instant::now())
    }

    pub fn is_awaiting_at(&self, chat: ChatId, now: Instant) -> bool {
        self.awaiting
            .get(&chat)
            .map(|since| !self.expired(*since, now))
            .unwrap_or(false)
    }

    /// Drop expired entries.
    pub fn prune_at(&mut self, now: Instant) {
        let Some(timeout) = self.timeout else {
            return;
        };
        self.awaiting
            .retain(|_, since| now.saturating_duration_since(*since) < timeout);
    }

    fn expired(&self, since: Instant, now: Instant) -> bool {
        match self.timeout {
            Some(timeout) => now.saturating_duration_since(since) >= timeout,
            None => false,
        }
    }
}
