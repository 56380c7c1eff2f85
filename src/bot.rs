use std::sync::Arc;

use anyhow::{Context, Result};
use futures::future::join_all;
use tracing::{debug, info};

use crate::commands::{
    Command, EMPTY_INN_LINE, HELLO_TEXT, HELP_TEXT, INN_USAGE_TEXT, NON_TEXT_PROMPT,
    NO_LAST_ACTION_TEXT, START_TEXT, UNKNOWN_COMMAND_TEXT,
};
use crate::dadata::CompanyLookup;
use crate::platform::{IncomingMessage, Replier};
use crate::session::SessionStore;

/// Turns incoming messages into replies.
/// Platform-agnostic: receives IncomingMessage, sends through a Replier.
pub struct InnBot {
    lookup: Arc<dyn CompanyLookup>,
    sessions: SessionStore,
}

impl InnBot {
    pub fn new(lookup: Arc<dyn CompanyLookup>) -> Self {
        Self {
            lookup,
            sessions: SessionStore::new(),
        }
    }

    /// Handle one message end to end: compute the reply and send it once.
    pub async fn handle(&self, incoming: &IncomingMessage, replier: &dyn Replier) -> Result<()> {
        let reply = self.respond(incoming).await;
        replier
            .send_text(incoming.chat_id, &reply)
            .await
            .with_context(|| format!("Failed to send reply to chat {}", incoming.chat_id))
    }

    /// Compute the reply text, updating the chat's session on the way.
    pub async fn respond(&self, incoming: &IncomingMessage) -> String {
        let chat_id = incoming.chat_id;
        let text = match incoming.text.as_deref() {
            Some(t) => t,
            None => return NON_TEXT_PROMPT.to_string(),
        };

        let command = Command::parse(text);
        let recorded = command.name().unwrap_or(text);
        let reply = match &command {
            Command::Start => START_TEXT.to_string(),
            Command::Help => HELP_TEXT.to_string(),
            Command::Hello => HELLO_TEXT.to_string(),
            Command::Inn(args) => self.lookup_all(args).await,
            Command::Last => {
                return self
                    .sessions
                    .get(chat_id)
                    .await
                    .last_action
                    .unwrap_or_else(|| NO_LAST_ACTION_TEXT.to_string())
            }
            Command::Unknown => UNKNOWN_COMMAND_TEXT.to_string(),
        };

        self.remember(chat_id, recorded, reply).await
    }

    async fn remember(&self, chat_id: i64, command: &str, reply: String) -> String {
        let previous = self.sessions.record(chat_id, command, &reply).await;
        debug!(
            "Chat {}: {} (previous command: {:?})",
            chat_id, command, previous.last_command
        );
        reply
    }

    /// One line per argument, in argument order.
    async fn lookup_all(&self, args: &[String]) -> String {
        if args.iter().all(|arg| arg.trim().is_empty()) {
            return INN_USAGE_TEXT.to_string();
        }

        info!("Looking up {} INN argument(s)", args.len());

        let lines = join_all(args.iter().map(|arg| async move {
            let inn = arg.trim();
            if inn.is_empty() {
                EMPTY_INN_LINE.to_string()
            } else {
                self.lookup.lookup(inn).await.to_string()
            }
        }))
        .await;

        lines.concat()
    }
}
