//! Messenger-agnostic reply model. The Telegram adapter renders it.

pub mod replies;
pub mod types;
