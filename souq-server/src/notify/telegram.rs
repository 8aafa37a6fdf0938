//! Telegram transport
//!
//! Thin client over the Bot API. An empty token disables outbound sends
//! (local development without a bot); the reachability probe then reports
//! success so purchases are not blocked by the disabled transport.

use async_trait::async_trait;
use serde_json::{Value, json};

use super::{InlineKeyboard, NotificationChannel};

const API_BASE: &str = "https://api.telegram.org";

pub struct TelegramChannel {
    client: reqwest::Client,
    token: String,
}

impl TelegramChannel {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            token: token.into(),
        }
    }

    pub fn enabled(&self) -> bool {
        !self.token.is_empty()
    }

    fn url(&self, method: &str) -> String {
        format!("{API_BASE}/bot{}/{method}", self.token)
    }

    /// Invoke a Bot API method; returns the `result` payload on success.
    async fn call(&self, method: &str, payload: Value) -> Option<Value> {
        if !self.enabled() {
            tracing::debug!(method, "telegram transport disabled, dropping call");
            return None;
        }
        let response = self
            .client
            .post(self.url(method))
            .json(&payload)
            .send()
            .await;
        match response {
            Ok(resp) => match resp.json::<Value>().await {
                Ok(body) if body["ok"].as_bool() == Some(true) => Some(body["result"].clone()),
                Ok(body) => {
                    tracing::warn!(
                        method,
                        description = body["description"].as_str().unwrap_or("unknown"),
                        "telegram api rejected call"
                    );
                    None
                }
                Err(e) => {
                    tracing::warn!(method, error = %e, "telegram api returned malformed body");
                    None
                }
            },
            Err(e) => {
                tracing::warn!(method, error = %e, "telegram api call failed");
                None
            }
        }
    }

    /// Send a message; returns the message id on success.
    pub async fn send_message(
        &self,
        chat_id: i64,
        text: &str,
        keyboard: Option<&InlineKeyboard>,
    ) -> Option<i64> {
        let mut payload = json!({ "chat_id": chat_id, "text": text });
        if let Some(kb) = keyboard {
            payload["reply_markup"] = serde_json::to_value(kb).ok()?;
        }
        self.call("sendMessage", payload)
            .await
            .and_then(|result| result["message_id"].as_i64())
    }

    pub async fn delete_message(&self, chat_id: i64, message_id: i64) -> bool {
        self.call(
            "deleteMessage",
            json!({ "chat_id": chat_id, "message_id": message_id }),
        )
        .await
        .is_some()
    }

    /// Register the webhook at `site_url/webhook`. Best effort; failure is
    /// logged and the server still starts (updates can be delivered later
    /// once the webhook is registered manually).
    pub async fn set_webhook(&self, site_url: &str) {
        if !self.enabled() {
            return;
        }
        let url = format!("{}/webhook", site_url.trim_end_matches('/'));
        if self.call("setWebhook", json!({ "url": url })).await.is_some() {
            tracing::info!(url, "telegram webhook registered");
        } else {
            tracing::warn!(url, "telegram webhook registration failed");
        }
    }
}

#[async_trait]
impl NotificationChannel for TelegramChannel {
    async fn send(&self, user_id: i64, text: &str) -> bool {
        self.send_message(user_id, text, None).await.is_some()
    }

    async fn send_with_keyboard(&self, user_id: i64, text: &str, keyboard: InlineKeyboard) -> bool {
        self.send_message(user_id, text, Some(&keyboard))
            .await
            .is_some()
    }

    async fn probe_reachable(&self, user_id: i64) -> bool {
        if !self.enabled() {
            // Disabled transport must not block purchases in development.
            return true;
        }
        match self.send_message(user_id, "…", None).await {
            Some(message_id) => {
                self.delete_message(user_id, message_id).await;
                true
            }
            None => false,
        }
    }

    async fn answer_callback(&self, callback_id: &str, text: &str) {
        self.call(
            "answerCallbackQuery",
            json!({ "callback_query_id": callback_id, "text": text }),
        )
        .await;
    }
}
