//! Digest delivery

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;
use tracing::{info, instrument, warn};

use casebot_core::{CaseBotError, CaseBotResult};

const TELEGRAM_API_URL: &str = "https://api.telegram.org";
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Sends one rendered digest per run
#[async_trait]
pub trait DigestSender: Send + Sync {
    async fn send(&self, text: &str) -> CaseBotResult<()>;
}

#[derive(Debug, Deserialize)]
struct TelegramReply {
    ok: bool,
    #[serde(default)]
    description: Option<String>,
}

/// Telegram Bot API `sendMessage` backend
pub struct TelegramSender {
    http: Client,
    bot_token: String,
    chat_id: String,
    base_url: String,
    timeout: Duration,
}

impl TelegramSender {
    pub fn new(http: Client, bot_token: String, chat_id: String) -> Self {
        Self {
            http,
            bot_token,
            chat_id,
            base_url: TELEGRAM_API_URL.to_string(),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    pub fn with_base_url(mut self, url: &str) -> Self {
        self.base_url = url.trim_end_matches('/').to_string();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

#[async_trait]
impl DigestSender for TelegramSender {
    #[instrument(skip(self, text), fields(chat_id = %self.chat_id, len = text.len()))]
    async fn send(&self, text: &str) -> CaseBotResult<()> {
        let url = format!("{}/bot{}/sendMessage", self.base_url, self.bot_token);
        let payload = json!({
            "chat_id": self.chat_id,
            "text": text,
            "parse_mode": "HTML",
            "disable_web_page_preview": true,
        });

        let resp = self
            .http
            .post(&url)
            .timeout(self.timeout)
            .json(&payload)
            .send()
            .await
            .map_err(|e| CaseBotError::network(without_token(&e.to_string(), &self.bot_token)))?;

        let status = resp.status();
        let reply: TelegramReply = resp
            .json()
            .await
            .map_err(|e| CaseBotError::parse(format!("Telegram reply (status {status}): {e}")))?;

        if !reply.ok {
            let description = reply.description.unwrap_or_default();
            warn!(status = %status, description = %description, "Telegram rejected message");
            return Err(CaseBotError::api(format!(
                "Telegram returned {status}: {description}"
            )));
        }

        info!("Digest delivered to Telegram");
        Ok(())
    }
}

/// reqwest errors carry the request URL, which embeds the bot token
fn without_token(message: &str, token: &str) -> String {
    if token.is_empty() {
        return message.to_string();
    }
    message.replace(token, "<redacted>")
}
