//! Core logic for the phrase bot.
//!
//! This crate is framework-agnostic. Telegram lives in `ptb-telegram`, which
//! maps updates into [`domain::IncomingText`] and renders [`messaging::types::Reply`].

pub mod bot;
pub mod config;
pub mod conversation;
pub mod domain;
pub mod errors;
pub mod intent;
pub mod logging;
pub mod messaging;
pub mod security;
pub mod store;
pub mod utils;

pub use errors::{Error, Result};
