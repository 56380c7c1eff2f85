pub mod telegram;

use anyhow::Result;
use async_trait::async_trait;

/// A message received from the messaging platform
#[derive(Debug, Clone)]
pub struct IncomingMessage {
    /// Platform-specific chat ID
    pub chat_id: i64,
    /// Display name of the sender, for logs only
    pub user_name: Option<String>,
    /// The message text; `None` for stickers, photos and other non-text payloads
    pub text: Option<String>,
}

impl IncomingMessage {
    pub fn text(chat_id: i64, text: impl Into<String>) -> Self {
        Self {
            chat_id,
            user_name: None,
            text: Some(text.into()),
        }
    }

    pub fn non_text(chat_id: i64) -> Self {
        Self {
            chat_id,
            user_name: None,
            text: None,
        }
    }
}

/// Outbound side of the platform: delivers one reply to a chat.
#[async_trait]
pub trait Replier: Send + Sync {
    async fn send_text(&self, chat_id: i64, text: &str) -> Result<()>;
}
