//! Telegram Bot API client for sending chat messages.

use std::future::Future;

use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::config::TelegramConfig;

/// Errors that can occur while delivering a message.
#[derive(Debug, Error)]
pub enum TelegramError {
    #[error("Failed to build HTTP client: {0}")]
    Client(String),

    #[error("Request to Telegram timed out")]
    Timeout,

    #[error("Request to Telegram failed: {0}")]
    Request(String),

    #[error("Telegram API request failed with status {status}: {description}")]
    Api { status: u16, description: String },

    #[error("Telegram API rejected the message: {description}")]
    Rejected {
        error_code: Option<i64>,
        description: String,
    },
}

impl From<reqwest::Error> for TelegramError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            return Self::Timeout;
        }
        // The request URL embeds the bot token.
        Self::Request(error_chain(&err.without_url()))
    }
}

/// Joins an error with all of its sources, skipping causes already
/// repeated in the outer message.
fn error_chain(err: &dyn std::error::Error) -> String {
    let mut message = err.to_string();
    let mut source = err.source();

    while let Some(cause) = source {
        let text = cause.to_string();
        if !text.is_empty() && !message.ends_with(&text) {
            message.push_str(": ");
            message.push_str(&text);
        }
        source = cause.source();
    }

    message
}

/// Anything that can deliver a text message to a chat.
pub trait MessageSender {
    fn send_message(
        &self,
        chat_id: &str,
        text: &str,
    ) -> impl Future<Output = Result<(), TelegramError>> + Send;
}

#[derive(Debug, Serialize)]
struct SendMessageRequest<'a> {
    chat_id: &'a str,
    text: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    parse_mode: Option<&'a str>,
}

/// Bot API response envelope; `result` is ignored.
#[derive(Debug, Deserialize)]
struct ApiResponse {
    ok: bool,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    error_code: Option<i64>,
}

/// HTTP client for the Telegram Bot API.
pub struct BotApiClient {
    http: Client,
    api_url: String,
    bot_token: String,
    parse_mode: Option<String>,
}

impl BotApiClient {
    /// Creates a client from the given configuration.
    pub fn new(config: &TelegramConfig) -> Result<Self, TelegramError> {
        let http = Client::builder()
            .timeout(config.timeout())
            .build()
            .map_err(|e| TelegramError::Client(e.to_string()))?;

        debug!(
            "Bot API client ready (base: {}, timeout: {}s)",
            config.api_url, config.timeout_secs
        );

        Ok(Self {
            http,
            api_url: config.api_url.trim_end_matches('/').to_owned(),
            bot_token: config.bot_token.clone(),
            parse_mode: config.parse_mode.clone(),
        })
    }

    /// Strips the bot token from transport error text.
    fn redact(&self, err: TelegramError) -> TelegramError {
        match err {
            TelegramError::Request(message) if message.contains(&self.bot_token) => {
                TelegramError::Request(message.replace(&self.bot_token, "<redacted>"))
            }
            other => other,
        }
    }

    fn method_url(&self, method: &str) -> String {
        format!("{}/bot{}/{}", self.api_url, self.bot_token, method)
    }

    /// Sends a text message via `sendMessage`.
    pub async fn send_text(&self, chat_id: &str, text: &str) -> Result<(), TelegramError> {
        info!("Sending message to chat {}: \"{}\"", chat_id, truncate_for_log(text, 40));

        let request = SendMessageRequest {
            chat_id,
            text,
            parse_mode: self.parse_mode.as_deref(),
        };

        let response = self
            .http
            .post(self.method_url("sendMessage"))
            .json(&request)
            .send()
            .await
            .map_err(|e| self.redact(e.into()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| self.redact(e.into()))?;
        let envelope = serde_json::from_str::<ApiResponse>(&body).ok();

        if !status.is_success() {
            let description = envelope
                .and_then(|e| e.description)
                .unwrap_or_else(|| truncate_for_log(body.trim(), 200));
            warn!("Telegram returned {}: {}", status, description);
            return Err(TelegramError::Api {
                status: status.as_u16(),
                description,
            });
        }

        match envelope {
            Some(ApiResponse {
                ok: false,
                description,
                error_code,
            }) => Err(TelegramError::Rejected {
                error_code,
                description: description.unwrap_or_default(),
            }),
            _ => {
                debug!("Message delivered to chat {}", chat_id);
                Ok(())
            }
        }
    }
}

impl MessageSender for BotApiClient {
    fn send_message(
        &self,
        chat_id: &str,
        text: &str,
    ) -> impl Future<Output = Result<(), TelegramError>> + Send {
        self.send_text(chat_id, text)
    }
}

impl<T: MessageSender + Sync + ?Sized> MessageSender for &T {
    fn send_message(
        &self,
        chat_id: &str,
        text: &str,
    ) -> impl Future<Output = Result<(), TelegramError>> + Send {
        (**self).send_message(chat_id, text)
    }
}

impl std::fmt::Debug for BotApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BotApiClient")
            .field("api_url", &self.api_url)
            .field("parse_mode", &self.parse_mode)
            .finish_non_exhaustive()
    }
}

/// Truncates a string for logging purposes.
fn truncate_for_log(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_owned()
    } else {
        format!("{}...", s.chars().take(max_len).collect::<String>())
    }
}
