pub mod telegram;

use anyhow::Result;
use async_trait::async_trait;

/// A message received from the chat platform
#[derive(Debug, Clone, Default)]
pub struct IncomingMessage {
    pub chat_id: i64,
    pub chat_title: Option<String>,
    pub message_id: i32,
    pub sender_id: Option<u64>,
    pub sender_username: Option<String>,
    /// The message text
    pub text: String,
    /// Byte length of the bot command that opens the text, if any
    pub command_len: Option<usize>,
    /// The message this one replies to, if any
    pub reply_to: Option<QuotedMessage>,
}

#[derive(Debug, Clone, Default)]
pub struct QuotedMessage {
    pub message_id: i32,
    /// Text or caption of the quoted message
    pub text: Option<String>,
}

/// A message to send back to the chat
#[derive(Debug, Clone, PartialEq)]
pub struct OutgoingMessage {
    pub chat_id: i64,
    pub text: String,
    pub reply_to: Option<i32>,
    pub disable_link_preview: bool,
}

impl OutgoingMessage {
    pub fn new(chat_id: i64, text: impl Into<String>) -> Self {
        Self {
            chat_id,
            text: text.into(),
            reply_to: None,
            disable_link_preview: false,
        }
    }

    /// A threaded reply with link previews disabled
    pub fn reply(chat_id: i64, message_id: i32, text: impl Into<String>) -> Self {
        Self {
            chat_id,
            text: text.into(),
            reply_to: Some(message_id),
            disable_link_preview: true,
        }
    }
}

#[async_trait]
pub trait ChatSender: Send + Sync {
    async fn send(&self, message: OutgoingMessage) -> Result<()>;

    async fn send_typing(&self, chat_id: i64) -> Result<()>;
}
