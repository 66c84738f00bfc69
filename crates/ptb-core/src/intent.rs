//! Classification of incoming text into what the user wants.

use regex::Regex;

use crate::{config::Config, errors::Error, Result};

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Intent {
    /// `/start`: greeting and help.
    Start,
    /// Speak command or a message containing the speak phrase.
    Speak,
    /// The remember phrase alone: ask what to remember.
    RememberStart,
    /// The remember phrase followed by the phrase itself (trimmed).
    RememberWithArg(String),
    /// Anything else.
    Other,
}

/// Compiled trigger words and commands.
#[derive(Clone, Debug)]
pub struct Triggers {
    speak_command: String,
    speak: Regex,
    remember: Regex,
    bot_username: Option<String>,
}

impl Triggers {
    pub fn new(speak_command: &str, speak_phrase: &str, remember_phrase: &str) -> Result<Self> {
        let speak = Regex::new(&format!("(?i){}", regex::escape(speak_phrase)))
            .map_err(|e| Error::Config(format!("invalid SPEAK_PHRASE: {e}")))?;
        let remember = Regex::new(&format!(r"(?is)^{}\s*(.*)$", regex::escape(remember_phrase)))
            .map_err(|e| Error::Config(format!("invalid REMEMBER_PHRASE: {e}")))?;

        Ok(Self {
            speak_command: normalize_command(speak_command),
            speak,
            remember,
            bot_username: None,
        })
    }

    pub fn from_config(cfg: &Config) -> Result<Self> {
        Self::new(&cfg.speak_command, &cfg.speak_phrase, &cfg.remember_phrase)
    }

    /// Restrict `/cmd@name` commands to this bot's username.
    pub fn with_bot_username(mut self, username: Option<&str>) -> Self {
        self.bot_username = username.map(|u| u.to_lowercase());
        self
    }

    fn addressed_to_us(&self, target: Option<&str>) -> bool {
        match (target, &self.bot_username) {
            (Some(target), Some(me)) => target.to_lowercase() == *me,
            _ => true,
        }
    }
}

/// Decide what a text message asks for.
///
/// Order matters: `/start`, then speak, then remember. A message mentioning the
/// speak phrase anywhere is a speak request even if it starts with the remember
/// phrase.
pub fn classify(text: &str, triggers: &Triggers) -> Intent {
    if let Some((cmd, target)) = parse_command(text) {
        if triggers.addressed_to_us(target.as_deref()) {
            if cmd == "start" {
                return Intent::Start;
            }
            if !triggers.speak_command.is_empty() && cmd == triggers.speak_command {
                return Intent::Speak;
            }
        }
    }

    if triggers.speak.is_match(text) {
        return Intent::Speak;
    }

    if let Some(caps) = triggers.remember.captures(text.trim_start()) {
        let arg = caps.get(1).map(|m| m.as_str().trim()).unwrap_or("");
        if arg.is_empty() {
            return Intent::RememberStart;
        }
        return Intent::RememberWithArg(arg.to_string());
    }

    Intent::Other
}

/// Split `/cmd@botname args` into the lowercased command name and the
/// optional `@botname` target.
fn parse_command(text: &str) -> Option<(String, Option<String>)> {
    let first = text.trim().split(char::is_whitespace).next()?;
    let body = first.strip_prefix('/')?;

    let (cmd, target) = match body.split_once('@') {
        Some((cmd, target)) => (cmd, Some(target.to_string())),
        None => (body, None),
    };
    if cmd.is_empty() {
        return None;
    }
    Some((cmd.to_lowercase(), target))
}

fn normalize_command(cmd: &str) -> String {
    cmd.trim().trim_start_matches('/').to_lowercase()
}
