use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use teloxide::prelude::*;
use teloxide::RequestError;
use tracing::{error, info, warn};

use crate::bot::InnBot;
use crate::platform::{IncomingMessage, Replier};

/// Telegram rejects messages above 4096 characters.
const MAX_MESSAGE_LEN: usize = 4000;

/// Split long messages for Telegram's 4096 char limit
fn split_message(text: &str, max_len: usize) -> Vec<String> {
    if text.len() <= max_len {
        return vec![text.to_string()];
    }

    let mut chunks = Vec::new();
    let mut start = 0;

    while start < text.len() {
        let mut end = (start + max_len).min(text.len());
        // Walk back to a valid UTF-8 char boundary so slicing doesn't panic
        while end > start && !text.is_char_boundary(end) {
            end -= 1;
        }
        let actual_end = if end < text.len() {
            text[start..end]
                .rfind('\n')
                .or_else(|| text[start..end].rfind(' '))
                .map(|pos| start + pos + 1)
                .unwrap_or(end)
        } else {
            end
        };

        chunks.push(text[start..actual_end].to_string());
        start = actual_end;
    }

    chunks
}

#[async_trait]
impl Replier for Bot {
    async fn send_text(&self, chat_id: i64, text: &str) -> Result<()> {
        for chunk in split_message(text, MAX_MESSAGE_LEN) {
            self.send_message(ChatId(chat_id), chunk).await?;
        }
        Ok(())
    }
}

/// Log line for a failed update, with the Telegram error kind when there is one.
fn describe_error(err: &anyhow::Error) -> String {
    match err.downcast_ref::<RequestError>() {
        Some(RequestError::Api(api_error)) => {
            format!("Telegram API error {:?}: {:#}", api_error, err)
        }
        _ => format!("{:#}", err),
    }
}

/// Run the Telegram bot platform until Ctrl-C
pub async fn run(core: Arc<InnBot>, bot: Bot) -> Result<()> {
    info!("Starting Telegram platform...");

    let handler = Update::filter_message().endpoint(handle_message);

    Dispatcher::builder(bot, handler)
        .dependencies(dptree::deps![core])
        .default_handler(|upd| async move {
            warn!("Unhandled update: {:?}", upd.id);
        })
        .error_handler(LoggingErrorHandler::with_custom_text("telegram"))
        .enable_ctrlc_handler()
        .build()
        .dispatch()
        .await;

    info!("Telegram platform stopped");
    Ok(())
}

async fn handle_message(bot: Bot, msg: Message, core: Arc<InnBot>) -> ResponseResult<()> {
    let mut incoming = match msg.text() {
        Some(text) => IncomingMessage::text(msg.chat.id.0, text),
        None => IncomingMessage::non_text(msg.chat.id.0),
    };
    incoming.user_name = msg.from.as_ref().map(|user| user.first_name.clone());

    match &incoming.text {
        Some(text) => info!(
            "Telegram message in chat {} from {}: {}",
            incoming.chat_id,
            incoming.user_name.as_deref().unwrap_or("<unknown>"),
            text
        ),
        None => info!("Non-text message in chat {}", incoming.chat_id),
    }

    if let Err(e) = core.handle(&incoming, &bot).await {
        error!("Error handling message: {}", describe_error(&e));
    }

    Ok(())
}
