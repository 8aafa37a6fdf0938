//! Webhook update payloads
//!
//! The subset of the Bot API update object this service consumes: text
//! messages (commands and wizard input) and callback queries (inline button
//! presses). Unknown fields are ignored by serde.

use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct Update {
    pub update_id: i64,
    pub message: Option<Message>,
    pub callback_query: Option<CallbackQuery>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Message {
    pub message_id: i64,
    pub from: Option<TgUser>,
    pub chat: Chat,
    pub text: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Chat {
    pub id: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TgUser {
    pub id: i64,
    #[serde(default)]
    pub first_name: String,
    pub username: Option<String>,
}

impl TgUser {
    /// Display name: username when set, first name otherwise.
    pub fn display_name(&self) -> String {
        self.username
            .clone()
            .unwrap_or_else(|| self.first_name.clone())
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct CallbackQuery {
    pub id: String,
    pub from: TgUser,
    pub data: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_a_command_message() {
        let update: Update = serde_json::from_str(
            r#"{
                "update_id": 7,
                "message": {
                    "message_id": 1,
                    "from": {"id": 42, "first_name": "Sara", "username": "sara_k"},
                    "chat": {"id": 42},
                    "text": "/start"
                }
            }"#,
        )
        .unwrap();
        let message = update.message.unwrap();
        assert_eq!(message.text.as_deref(), Some("/start"));
        assert_eq!(message.from.unwrap().display_name(), "sara_k");
    }

    #[test]
    fn parses_a_callback_query() {
        let update: Update = serde_json::from_str(
            r#"{
                "update_id": 8,
                "callback_query": {
                    "id": "cb1",
                    "from": {"id": 900, "first_name": "Admin"},
                    "data": "claim_abc123"
                }
            }"#,
        )
        .unwrap();
        let query = update.callback_query.unwrap();
        assert_eq!(query.data.as_deref(), Some("claim_abc123"));
        assert_eq!(query.from.display_name(), "Admin");
    }
}
