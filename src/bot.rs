use std::sync::Arc;

use tracing::{debug, error, info, warn};

use crate::command::{parse_command, parse_lang_code, Command};
use crate::platform::{ChatSender, IncomingMessage, OutgoingMessage};
use crate::translate::{target_language, Translator};

pub const START_REPLY: &str = "¡Soy la tranductora! 👩‍🏫";
pub const PING_REPLY: &str = "Estoy corriendo. 🏃‍♀";

/// Inline text must be longer than this many bytes to be translated
const MIN_INLINE_TEXT_LEN: usize = 2;

/// Chunk size for replies, under Telegram's 4096 char limit
const MAX_REPLY_LEN: usize = 4000;

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

/// Gatekeeps the authorized chat and relays translate commands
pub struct Relay {
    authorized_chat_id: i64,
    bot_username: String,
    translator: Arc<dyn Translator>,
    sender: Arc<dyn ChatSender>,
}

impl Relay {
    pub fn new(
        authorized_chat_id: i64,
        bot_username: String,
        translator: Arc<dyn Translator>,
        sender: Arc<dyn ChatSender>,
    ) -> Self {
        Self {
            authorized_chat_id,
            bot_username,
            translator,
            sender,
        }
    }

    /// Handle one incoming message. Failures are logged and the message dropped.
    pub async fn handle(&self, msg: &IncomingMessage) {
        let Some(command_len) = msg.command_len else {
            return;
        };

        if msg.chat_id != self.authorized_chat_id {
            warn!(
                "Skipping message from user: {} [{}] in chat: {} [{}]",
                msg.sender_username.as_deref().unwrap_or(""),
                msg.sender_id.unwrap_or_default(),
                msg.chat_title.as_deref().unwrap_or(""),
                msg.chat_id,
            );
            return;
        }

        let Some(parsed) = parse_command(&msg.text, command_len) else {
            return;
        };

        match parsed.command() {
            Command::Translate => match &msg.reply_to {
                Some(quoted) => {
                    let Some(text) = quoted.text.as_deref() else {
                        debug!("Quoted message {} has no text", quoted.message_id);
                        return;
                    };
                    self.translate_and_reply(msg.chat_id, quoted.message_id, parsed.arguments, text)
                        .await;
                }
                None => {
                    let (code, text) = parse_lang_code(parsed.arguments);
                    if text.len() > MIN_INLINE_TEXT_LEN {
                        self.translate_and_reply(msg.chat_id, msg.message_id, code, text)
                            .await;
                    }
                }
            },
            Command::Start if parsed.is_addressed_to(&self.bot_username) => {
                self.send(OutgoingMessage::new(msg.chat_id, START_REPLY)).await;
            }
            Command::Ping if parsed.is_addressed_to(&self.bot_username) => {
                self.send(OutgoingMessage::new(msg.chat_id, PING_REPLY)).await;
            }
            Command::Start | Command::Ping => {
                debug!("Ignoring /{} not addressed to this bot", parsed.keyword);
            }
            Command::Unknown(keyword) => {
                info!("Ignoring unknown command: /{}", keyword);
            }
        }
    }

    async fn translate_and_reply(&self, chat_id: i64, reply_to: i32, code: &str, text: &str) {
        let target = match target_language(code) {
            Ok(target) => target,
            Err(e) => {
                error!("Error translating: {:#}", e);
                return;
            }
        };

        self.sender.send_typing(chat_id).await.ok();

        match self.translator.translate(text, &target).await {
            Ok(translation) => {
                debug!(
                    "Translated {} bytes from {} to {}",
                    text.len(),
                    translation
                        .detected_source_language
                        .as_deref()
                        .unwrap_or("unknown"),
                    target
                );
                for chunk in split_message(&translation.text, MAX_REPLY_LEN) {
                    self.send(OutgoingMessage::reply(chat_id, reply_to, chunk))
                        .await;
                }
            }
            Err(e) => {
                error!("Error translating: {:#}", e);
            }
        }
    }

    async fn send(&self, message: OutgoingMessage) {
        if let Err(e) = self.sender.send(message).await {
            error!("Failed to send message: {:#}", e);
        }
    }
}
