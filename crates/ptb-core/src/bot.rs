//! The phrase bot itself: incoming text in, reply out.
//!
//! Framework-agnostic; the Telegram adapter maps updates into
//! [`IncomingText`] and renders the returned [`Reply`].

use std::sync::Arc;

use tokio::sync::Mutex;

use crate::{
    config::Config,
    conversation::ConversationController,
    domain::{Chat, IncomingText},
    intent::{classify, Intent, Triggers},
    messaging::{
        replies,
        types::{Reply, ReplyKeyboard},
    },
    security::is_admin,
    store::PhraseStore,
    utils::{AuditEvent, AuditLogger},
    Result,
};

pub struct PhraseBot {
    cfg: Arc<Config>,
    store: Arc<PhraseStore>,
    triggers: Triggers,
    conversation: Mutex<ConversationController>,
    audit: Option<AuditLogger>,
}

impl PhraseBot {
    pub fn new(cfg: Arc<Config>, store: Arc<PhraseStore>) -> Result<Self> {
        let triggers = Triggers::from_config(&cfg)?;
        let conversation = Mutex::new(ConversationController::new(cfg.remember_timeout));
        let audit = cfg.audit_log_path.clone().map(AuditLogger::new);

        Ok(Self {
            cfg,
            store,
            triggers,
            conversation,
            audit,
        })
    }

    /// Restrict `/cmd@name` commands to this bot once its username is known.
    pub fn with_bot_username(mut self, username: Option<&str>) -> Self {
        self.triggers = self.triggers.with_bot_username(username);
        self
    }

    pub fn store(&self) -> &Arc<PhraseStore> {
        &self.store
    }

    pub fn is_admin(&self, chat: &Chat) -> bool {
        is_admin(chat.username.as_deref(), &self.cfg.admin_username)
    }

    pub async fn is_awaiting(&self, chat: &Chat) -> bool {
        self.conversation.lock().await.is_awaiting(chat.id)
    }

    pub async fn handle_text(&self, msg: &IncomingText) -> Reply {
        let chat = &msg.chat;
        let admin = self.is_admin(chat);

        match classify(&msg.text, &self.triggers) {
            Intent::Start => Reply::new(self.greeting(admin), self.keyboard(admin)),

            Intent::Speak => Reply::new(self.store.pick_random().await, ReplyKeyboard::Keep),

            Intent::RememberStart | Intent::RememberWithArg(_) if !admin => {
                tracing::info!(
                    chat_id = chat.id.0,
                    username = chat.username.as_deref().unwrap_or("<none>"),
                    "remember attempt from non-admin rejected"
                );
                self.audit(AuditEvent::remember_rejected(chat, &msg.text));
                Reply::new(replies::ADMIN_ONLY, self.keyboard(admin))
            }

            Intent::RememberStart => {
                {
                    let mut conversation = self.conversation.lock().await;
                    conversation.prune_at(std::time::Instant::now());
                    conversation.begin(chat.id);
                }
                Reply::new(replies::ASK_PHRASE, ReplyKeyboard::Remove)
            }

            Intent::RememberWithArg(phrase) => {
                self.conversation.lock().await.cancel(chat.id);
                self.remember(chat, phrase).await;
                Reply::new(replies::REMEMBERED, self.keyboard(admin))
            }

            Intent::Other => {
                let pending = admin && self.conversation.lock().await.take_pending(chat.id);
                if pending {
                    self.remember(chat, msg.text.clone()).await;
                    return Reply::new(replies::REMEMBERED, self.keyboard(admin));
                }
                Reply::new(replies::NOT_UNDERSTOOD, self.keyboard(admin))
            }
        }
    }

    async fn remember(&self, chat: &Chat, phrase: String) {
        self.audit(AuditEvent::phrase_added(chat, &phrase));
        match self.store.add(phrase).await {
            Ok(()) => tracing::info!(chat_id = chat.id.0, "new phrase remembered"),
            // Kept in memory; the next successful write persists it.
            Err(e) => tracing::error!(chat_id = chat.id.0, "phrase kept in memory only: {e}"),
        }
    }

    fn audit(&self, event: AuditEvent) {
        let Some(audit) = &self.audit else {
            return;
        };
        if let Err(e) = audit.write(event) {
            tracing::warn!("audit log write to {} failed: {e}", audit.path().display());
        }
    }

    fn greeting(&self, admin: bool) -> String {
        let cmd = self.cfg.speak_command.trim_start_matches('/');
        replies::greeting(
            &self.cfg.speak_phrase,
            &format!("/{cmd}"),
            &self.cfg.remember_phrase,
            admin,
        )
    }

    fn keyboard(&self, admin: bool) -> ReplyKeyboard {
        ReplyKeyboard::triggers(&self.cfg.speak_phrase, &self.cfg.remember_phrase, admin)
    }
}

#[cfg(test)]
mod tests {
    use std::{path::PathBuf, time::Duration};

    use super::*;

    const ADMIN: &str = "Boss";

    fn tmp_file(prefix: &str) -> PathBuf {
        let ts = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap_or(Duration::from_secs(0))
            .as_nanos();
        let pid = std::process::id();
        PathBuf::from(format!("/tmp/{prefix}-{pid}-{ts}.json"))
    }

    fn test_config(phrases_file: PathBuf) -> Arc<Config> {
        Arc::new(Config {
            bot_api_token: "token".to_string(),
            admin_username: ADMIN.to_string(),
            phrases_file,
            speak_command: "/speak".to_string(),
            speak_phrase: "Говори".to_string(),
            remember_phrase: "Запомни".to_string(),
            remember_timeout: None,
            audit_log_path: None,
        })
    }

    fn test_bot(prefix: &str, phrases: &[&str]) -> PhraseBot {
        let path = tmp_file(prefix);
        let store = PhraseStore::new(&path, phrases.iter().map(|s| s.to_string()).collect());
        PhraseBot::new(test_config(path), Arc::new(store)).unwrap()
    }

    fn admin_says(text: &str) -> IncomingText {
        IncomingText {
            chat: Chat::new(1, Some("boss")),
            text: text.to_string(),
        }
    }

    fn guest_says(text: &str) -> IncomingText {
        IncomingText {
            chat: Chat::new(2, Some("guest")),
            text: text.to_string(),
        }
    }

    fn admin_keyboard() -> ReplyKeyboard {
        ReplyKeyboard::Buttons(vec!["Говори".to_string(), "Запомни".to_string()])
    }

    fn guest_keyboard() -> ReplyKeyboard {
        ReplyKeyboard::Buttons(vec!["Говори".to_string()])
    }

    fn cleanup(bot: &PhraseBot) {
        let _ = std::fs::remove_file(bot.store().path());
    }

    #[tokio::test]
    async fn start_greets_admin_with_remember_hint() {
        let bot = test_bot("ptb-bot-start", &[]);

        let reply = bot.handle_text(&admin_says("/start")).await;
        assert!(reply.text.starts_with("Привет"));
        assert!(reply.text.contains("/speak"));
        assert!(reply.text.contains("`Запомни`"));
        assert_eq!(reply.keyboard, admin_keyboard());

        let reply = bot.handle_text(&guest_says("/start")).await;
        assert!(!reply.text.contains("Запомни"));
        assert_eq!(reply.keyboard, guest_keyboard());
    }

    #[tokio::test]
    async fn speak_returns_phrase_or_sentinel() {
        let bot = test_bot("ptb-bot-speak-empty", &[]);
        let reply = bot.handle_text(&guest_says("Говори")).await;
        assert_eq!(reply.text, replies::NO_PHRASES);
        assert_eq!(reply.keyboard, ReplyKeyboard::Keep);

        let bot = test_bot("ptb-bot-speak", &["единственная"]);
        assert_eq!(bot.handle_text(&guest_says("/speak")).await.text, "единственная");
        assert_eq!(bot.handle_text(&guest_says("говори")).await.text, "единственная");
    }

    #[tokio::test]
    async fn two_step_remember_flow() {
        let bot = test_bot("ptb-bot-two-step", &[]);

        let reply = bot.handle_text(&admin_says("Запомни")).await;
        assert_eq!(reply.text, replies::ASK_PHRASE);
        assert_eq!(reply.keyboard, ReplyKeyboard::Remove);
        assert!(bot.is_awaiting(&admin_says("").chat).await);

        let reply = bot.handle_text(&admin_says("Привет")).await;
        assert_eq!(reply.text, replies::REMEMBERED);
        assert_eq!(reply.keyboard, admin_keyboard());
        assert!(!bot.is_awaiting(&admin_says("").chat).await);
        assert_eq!(bot.store().snapshot().await, vec!["Привет"]);

        let reply = bot.handle_text(&admin_says("Говори")).await;
        assert_eq!(reply.text, "Привет");

        let persisted = std::fs::read_to_string(bot.store().path()).unwrap();
        assert_eq!(persisted, r#"["Привет"]"#);
        cleanup(&bot);
    }

    #[tokio::test]
    async fn one_step_remember_stores_immediately() {
        let bot = test_bot("ptb-bot-one-step", &["старая"]);

        let reply = bot.handle_text(&admin_says("Запомни тест")).await;
        assert_eq!(reply.text, replies::REMEMBERED);
        assert!(!bot.is_awaiting(&admin_says("").chat).await);
        assert_eq!(bot.store().snapshot().await, vec!["старая", "тест"]);
        cleanup(&bot);
    }

    #[tokio::test]
    async fn non_admin_cannot_teach() {
        let bot = test_bot("ptb-bot-guest", &[]);

        let reply = bot.handle_text(&guest_says("Запомни")).await;
        assert_eq!(reply.text, replies::ADMIN_ONLY);
        assert_eq!(reply.keyboard, guest_keyboard());
        assert!(!bot.is_awaiting(&guest_says("").chat).await);

        let reply = bot.handle_text(&guest_says("Запомни гадость")).await;
        assert_eq!(reply.text, replies::ADMIN_ONLY);
        assert!(bot.store().is_empty().await);

        let reply = bot.handle_text(&guest_says("Привет")).await;
        assert_eq!(reply.text, replies::NOT_UNDERSTOOD);
        assert!(bot.store().is_empty().await);
    }

    #[tokio::test]
    async fn pending_state_is_per_chat_and_admin_only() {
        let bot = test_bot("ptb-bot-shared-chat", &[]);
        let group_admin = IncomingText {
            chat: Chat::new(10, Some("BOSS")),
            text: "Запомни".to_string(),
        };
        bot.handle_text(&group_admin).await;

        let group_guest = IncomingText {
            chat: Chat::new(10, Some("guest")),
            text: "подменю".to_string(),
        };
        assert_eq!(bot.handle_text(&group_guest).await.text, replies::NOT_UNDERSTOOD);
        assert!(bot.is_awaiting(&group_admin.chat).await);

        let other_chat = IncomingText {
            chat: Chat::new(11, Some("boss")),
            text: "не сюда".to_string(),
        };
        assert_eq!(bot.handle_text(&other_chat).await.text, replies::NOT_UNDERSTOOD);
        assert!(bot.store().is_empty().await);

        let reply = bot
            .handle_text(&IncomingText {
                chat: Chat::new(10, Some("boss")),
                text: "  как есть  ".to_string(),
            })
            .await;
        assert_eq!(reply.text, replies::REMEMBERED);
        assert_eq!(bot.store().snapshot().await, vec!["  как есть  "]);
        cleanup(&bot);
    }

    #[tokio::test]
    async fn speak_while_awaiting_keeps_pending_state() {
        let bot = test_bot("ptb-bot-speak-pending", &["фраза"]);
        bot.handle_text(&admin_says("Запомни")).await;

        assert_eq!(bot.handle_text(&admin_says("Говори")).await.text, "фраза");
        assert!(bot.is_awaiting(&admin_says("").chat).await);

        bot.handle_text(&admin_says("новая")).await;
        assert_eq!(bot.store().snapshot().await, vec!["фраза", "новая"]);
        cleanup(&bot);
    }

    #[tokio::test]
    async fn unknown_text_gets_fallback() {
        let bot = test_bot("ptb-bot-fallback", &[]);
        let reply = bot.handle_text(&admin_says("что-то")).await;
        assert_eq!(reply.text, replies::NOT_UNDERSTOOD);
        assert_eq!(reply.keyboard, admin_keyboard());
        assert!(bot.store().is_empty().await);
    }

    #[tokio::test]
    async fn chat_without_username_is_never_admin() {
        let bot = test_bot("ptb-bot-anon", &[]);
        let anon = IncomingText {
            chat: Chat::new(3, None),
            text: "Запомни".to_string(),
        };
        assert_eq!(bot.handle_text(&anon).await.text, replies::ADMIN_ONLY);
    }

    #[tokio::test]
    async fn phrase_additions_are_audited() {
        let path = tmp_file("ptb-bot-audit-store");
        let audit_path = tmp_file("ptb-bot-audit-log");
        let mut cfg = (*test_config(path.clone())).clone();
        cfg.audit_log_path = Some(audit_path.clone());
        let store = Arc::new(PhraseStore::new(&path, Vec::new()));
        let bot = PhraseBot::new(Arc::new(cfg), store).unwrap();

        bot.handle_text(&admin_says("Запомни тест")).await;
        bot.handle_text(&guest_says("Запомни")).await;

        let log = std::fs::read_to_string(&audit_path).unwrap();
        let events: Vec<serde_json::Value> = log
            .lines()
            .map(|l| serde_json::from_str(l).unwrap())
            .collect();
        assert_eq!(events.len(), 2);
        assert_eq!(events[0]["event"], "phrase_added");
        assert_eq!(events[0]["content"], "тест");
        assert_eq!(events[1]["event"], "remember_rejected");

        let _ = std::fs::remove_file(&path);
        let _ = std::fs::remove_file(&audit_path);
    }
}
