//! Notification Channel
//!
//! Outbound messaging to buyers, sellers, and admins. The order lifecycle
//! depends only on the [`NotificationChannel`] trait; the Telegram transport
//! lives in [`telegram`], tests use the recording channel in [`mock`].

pub mod mock;
pub mod telegram;

pub use mock::RecordingChannel;
pub use telegram::TelegramChannel;

use async_trait::async_trait;
use serde::Serialize;
use std::sync::Arc;

/// Inline keyboard markup attached to a message.
#[derive(Debug, Clone, Default, Serialize)]
pub struct InlineKeyboard {
    pub inline_keyboard: Vec<Vec<InlineButton>>,
}

impl InlineKeyboard {
    pub fn row(mut self, buttons: Vec<InlineButton>) -> Self {
        self.inline_keyboard.push(buttons);
        self
    }
}

/// Single inline button: either a callback or a URL.
#[derive(Debug, Clone, Serialize)]
pub struct InlineButton {
    pub text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub callback_data: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

impl InlineButton {
    pub fn callback(text: impl Into<String>, data: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            callback_data: Some(data.into()),
            url: None,
        }
    }

    pub fn link(text: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            callback_data: None,
            url: Some(url.into()),
        }
    }
}

/// Outbound messaging interface consumed by the order lifecycle and the bot
/// dispatcher.
#[async_trait]
pub trait NotificationChannel: Send + Sync {
    /// Deliver a message; returns whether the transport accepted it.
    async fn send(&self, user_id: i64, text: &str) -> bool;

    /// Deliver a message with an inline keyboard.
    async fn send_with_keyboard(&self, user_id: i64, text: &str, keyboard: InlineKeyboard) -> bool;

    /// Lightweight send-and-delete probe verifying the user can receive
    /// messages. Must be called before committing a purchase.
    async fn probe_reachable(&self, user_id: i64) -> bool;

    /// Acknowledge a callback query (button press), optionally with a toast.
    async fn answer_callback(&self, callback_id: &str, text: &str);
}

/// Broadcast a message to every admin; delivery failures are logged, never
/// fatal.
pub async fn broadcast(channel: &Arc<dyn NotificationChannel>, admin_ids: &[i64], text: &str) {
    for &admin_id in admin_ids {
        if !channel.send(admin_id, text).await {
            tracing::warn!(admin_id, "admin broadcast delivery failed");
        }
    }
}
