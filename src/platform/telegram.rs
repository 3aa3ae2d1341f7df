use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;
use teloxide::prelude::*;
use teloxide::types::{ChatAction, LinkPreviewOptions, MessageEntityKind, MessageId, ReplyParameters};
use teloxide::update_listeners::Polling;
use tracing::{info, warn};

use crate::bot::Relay;
use crate::command::utf16_len_to_byte_len;
use crate::platform::{ChatSender, IncomingMessage, OutgoingMessage, QuotedMessage};

/// Sends replies through the Telegram Bot API
pub struct TelegramSender {
    bot: Bot,
}

impl TelegramSender {
    pub fn new(bot: Bot) -> Self {
        Self { bot }
    }
}

#[async_trait]
impl ChatSender for TelegramSender {
    async fn send(&self, message: OutgoingMessage) -> Result<()> {
        let mut request = self.bot.send_message(ChatId(message.chat_id), message.text);
        if let Some(reply_to) = message.reply_to {
            request = request.reply_parameters(ReplyParameters::new(MessageId(reply_to)));
        }
        if message.disable_link_preview {
            request = request.link_preview_options(LinkPreviewOptions {
                is_disabled: true,
                url: None,
                prefer_small_media: false,
                prefer_large_media: false,
                show_above_text: false,
            });
        }
        request.await?;
        Ok(())
    }

    async fn send_typing(&self, chat_id: i64) -> Result<()> {
        self.bot
            .send_chat_action(ChatId(chat_id), ChatAction::Typing)
            .await?;
        Ok(())
    }
}

/// Run the long-polling loop until Ctrl-C
pub async fn run(bot: Bot, relay: Arc<Relay>, poll_timeout: Duration) -> Result<()> {
    info!("Starting Telegram platform...");

    let handler = Update::filter_message().endpoint(handle_message);

    let listener = Polling::builder(bot.clone())
        .timeout(poll_timeout)
        .delete_webhook()
        .await
        .build();

    Dispatcher::builder(bot, handler)
        .dependencies(dptree::deps![relay])
        // One key for every update: messages are handled strictly in order
        .distribution_function(|_| Some(()))
        .default_handler(|upd| async move {
            warn!("Unhandled update: {:?}", upd.id);
        })
        .error_handler(LoggingErrorHandler::with_custom_text("telegram"))
        .enable_ctrlc_handler()
        .build()
        .dispatch_with_listener(
            listener,
            LoggingErrorHandler::with_custom_text("telegram update listener"),
        )
        .await;

    Ok(())
}

async fn handle_message(msg: Message, relay: Arc<Relay>) -> ResponseResult<()> {
    if let Some(incoming) = to_incoming(&msg) {
        relay.handle(&incoming).await;
    }
    Ok(())
}

fn to_incoming(msg: &Message) -> Option<IncomingMessage> {
    let text = msg.text()?;

    let command_len = msg
        .entities()
        .and_then(|entities| {
            entities
                .iter()
                .find(|e| e.offset == 0 && matches!(e.kind, MessageEntityKind::BotCommand))
        })
        .and_then(|e| utf16_len_to_byte_len(text, e.length));

    let reply_to = msg.reply_to_message().map(|quoted| QuotedMessage {
        message_id: quoted.id.0,
        text: quoted.text().or_else(|| quoted.caption()).map(str::to_string),
    });

    Some(IncomingMessage {
        chat_id: msg.chat.id.0,
        chat_title: msg.chat.title().map(str::to_string),
        message_id: msg.id.0,
        sender_id: msg.from.as_ref().map(|user| user.id.0),
        sender_username: msg.from.as_ref().and_then(|user| user.username.clone()),
        text: text.to_string(),
        command_len,
        reply_to,
    })
}
