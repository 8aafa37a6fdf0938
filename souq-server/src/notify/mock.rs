//! Recording channel for tests
//!
//! Captures every outbound message and lets tests mark users unreachable.
//! First-class (not `#[cfg(test)]`) so integration tests can use it too.

use async_trait::async_trait;
use dashmap::DashMap;
use std::sync::Mutex;

use super::{InlineKeyboard, NotificationChannel};

/// A delivered message as seen by the recording channel.
#[derive(Debug, Clone)]
pub struct SentMessage {
    pub user_id: i64,
    pub text: String,
    pub keyboard: Option<InlineKeyboard>,
}

#[derive(Debug, Default)]
pub struct RecordingChannel {
    sent: Mutex<Vec<SentMessage>>,
    unreachable: DashMap<i64, ()>,
    answered: Mutex<Vec<(String, String)>>,
}

impl RecordingChannel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark a user as unreachable; probes and sends to them fail.
    pub fn set_unreachable(&self, user_id: i64) {
        self.unreachable.insert(user_id, ());
    }

    pub fn sent_to(&self, user_id: i64) -> Vec<SentMessage> {
        self.sent
            .lock()
            .expect("sent lock")
            .iter()
            .filter(|m| m.user_id == user_id)
            .cloned()
            .collect()
    }

    pub fn all_sent(&self) -> Vec<SentMessage> {
        self.sent.lock().expect("sent lock").clone()
    }

    pub fn answered_callbacks(&self) -> Vec<(String, String)> {
        self.answered.lock().expect("answered lock").clone()
    }

    fn record(&self, user_id: i64, text: &str, keyboard: Option<InlineKeyboard>) -> bool {
        if self.unreachable.contains_key(&user_id) {
            return false;
        }
        self.sent.lock().expect("sent lock").push(SentMessage {
            user_id,
            text: text.to_string(),
            keyboard,
        });
        true
    }
}

#[async_trait]
impl NotificationChannel for RecordingChannel {
    async fn send(&self, user_id: i64, text: &str) -> bool {
        self.record(user_id, text, None)
    }

    async fn send_with_keyboard(&self, user_id: i64, text: &str, keyboard: InlineKeyboard) -> bool {
        self.record(user_id, text, Some(keyboard))
    }

    async fn probe_reachable(&self, user_id: i64) -> bool {
        !self.unreachable.contains_key(&user_id)
    }

    async fn answer_callback(&self, callback_id: &str, text: &str) {
        self.answered
            .lock()
            .expect("answered lock")
            .push((callback_id.to_string(), text.to_string()));
    }
}
