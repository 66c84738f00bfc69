use std::{
    env, fs,
    path::{Path, PathBuf},
    time::Duration,
};

use crate::{errors::Error, Result};

pub const DEFAULT_PHRASES_FILE: &str = "./phrases.json";
pub const DEFAULT_SPEAK_COMMAND: &str = "/speak";
pub const DEFAULT_SPEAK_PHRASE: &str = "Говори";
pub const DEFAULT_REMEMBER_PHRASE: &str = "Запомни";

/// Typed configuration, read from the process environment (and `.env`).
#[derive(Clone, Debug)]
pub struct Config {
    // Credentials
    pub bot_api_token: String,
    pub admin_username: String,

    // Storage
    pub phrases_file: PathBuf,

    // Triggers
    pub speak_command: String,
    pub speak_phrase: String,
    pub remember_phrase: String,

    /// How long a chat may stay in the "what should I remember?" state.
    /// `None` keeps it pending until the next message.
    pub remember_timeout: Option<Duration>,

    // Audit
    pub audit_log_path: Option<PathBuf>,
}

impl Config {
    pub fn load() -> Result<Self> {
        load_dotenv_if_present(Path::new(".env"));
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build the config from an arbitrary key lookup (the environment in
    /// production, a map in tests).
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let var = |key: &str| lookup(key).and_then(non_empty);

        let bot_api_token = var("BOT_API_TOKEN");
        let admin_username = var("ADMIN_USERNAME");
        let (Some(bot_api_token), Some(admin_username)) = (bot_api_token, admin_username) else {
            return Err(Error::Config(
                "No BOT_API_TOKEN or ADMIN_USERNAME in the environment or .env file".to_string(),
            ));
        };
        let admin_username = admin_username.trim().trim_start_matches('@').to_string();

        let phrases_file =
            PathBuf::from(var("PHRASES_FILE").unwrap_or(DEFAULT_PHRASES_FILE.to_string()));

        let speak_command = var("SPEAK_COMMAND").unwrap_or(DEFAULT_SPEAK_COMMAND.to_string());
        let speak_phrase = var("SPEAK_PHRASE").unwrap_or(DEFAULT_SPEAK_PHRASE.to_string());
        let remember_phrase =
            var("REMEMBER_PHRASE").unwrap_or(DEFAULT_REMEMBER_PHRASE.to_string());

        let remember_timeout = var("REMEMBER_TIMEOUT_SECS")
            .and_then(|s| s.trim().parse::<u64>().ok())
            .filter(|secs| *secs > 0)
            .map(Duration::from_secs);

        let audit_log_path = var("AUDIT_LOG_PATH").map(PathBuf::from);

        Ok(Self {
            bot_api_token: bot_api_token.trim().to_string(),
            admin_username,
            phrases_file,
            speak_command: speak_command.trim().to_string(),
            speak_phrase: speak_phrase.trim().to_string(),
            remember_phrase: remember_phrase.trim().to_string(),
            remember_timeout,
            audit_log_path,
        })
    }
}

fn load_dotenv_if_present(path: &Path) {
    let Ok(contents) = fs::read_to_string(path) else {
        return;
    };

    for (key, val) in parse_dotenv(&contents) {
        if env::var_os(&key).is_some() {
            continue; // do not override existing env
        }
        env::set_var(key, val);
    }
}

fn parse_dotenv(contents: &str) -> Vec<(String, String)> {
    let mut out = Vec::new();
    for raw in contents.lines() {
        let line = raw.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let Some((k, v)) = line.split_once('=') else {
            continue;
        };

        let key = k.trim();
        if key.is_empty() {
            continue;
        }

        let mut val = v.trim().to_string();
        // Strip optional surrounding quotes.
        if val.len() >= 2
            && ((val.starts_with('"') && val.ends_with('"'))
                || (val.starts_with('\'') && val.ends_with('\'')))
        {
            val = val[1..val.len() - 1].to_string();
        }

        out.push((key.to_string(), val));
    }
    out
}

fn non_empty(s: String) -> Option<String> {
    if s.trim().is_empty() {
        None
    } else {
        Some(s)
    }
}
