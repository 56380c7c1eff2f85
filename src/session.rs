use std::collections::HashMap;

use tokio::sync::Mutex;

/// What the bot last did in one chat.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Session {
    /// Text of the most recent reply.
    pub last_action: Option<String>,
    /// Name of the most recent command (raw text for unknown ones).
    pub last_command: Option<String>,
}

/// Chat-scoped session slots, keyed by chat id.
#[derive(Default)]
pub struct SessionStore {
    sessions: Mutex<HashMap<i64, Session>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Overwrite both slots for `chat_id` and return the previous session.
    pub async fn record(&self, chat_id: i64, command: &str, action: &str) -> Session {
        let mut sessions = self.sessions.lock().await;
        let session = sessions.entry(chat_id).or_default();
        std::mem::replace(
            session,
            Session {
                last_action: Some(action.to_string()),
                last_command: Some(command.to_string()),
            },
        )
    }

    pub async fn get(&self, chat_id: i64) -> Session {
        let sessions = self.sessions.lock().await;
        sessions.get(&chat_id).cloned().unwrap_or_default()
    }
}
