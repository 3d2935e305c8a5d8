//! Telegram Bot API client module.
//!
//! Provides the HTTP client used to deliver greetings and the
//! [`MessageSender`] seam the orchestrator talks to.

mod client;

pub use client::{BotApiClient, MessageSender, TelegramError};
