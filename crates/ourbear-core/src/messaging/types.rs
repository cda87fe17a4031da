use chrono::{DateTime, Utc};

use crate::domain::{ChatId, MessageId, MessageRef, UpdateId};

/// One unit of new activity returned by the update-retrieval endpoint.
///
/// `message` is `None` for update kinds we do not handle (edits, callbacks, ...);
/// those still count for offset bookkeeping.
#[derive(Clone, Debug)]
pub struct Update {
    pub update_id: UpdateId,
    pub message: Option<IncomingMessage>,
}

#[derive(Clone, Debug)]
pub struct IncomingMessage {
    pub chat_id: ChatId,
    pub message_id: MessageId,
    /// Empty for non-text messages.
    pub text: String,
    pub sent_at: Option<DateTime<Utc>>,
    pub sender: Option<Sender>,
}

impl IncomingMessage {
    pub fn message_ref(&self) -> MessageRef {
        MessageRef {
            chat_id: self.chat_id,
            message_id: self.message_id,
        }
    }
}

/// Author of an incoming message. Only used for log context.
#[derive(Clone, Debug)]
pub struct Sender {
    pub id: i64,
    pub username: Option<String>,
    pub is_bot: bool,
}

impl Sender {
    /// `@username`, or `id:<n>` when the user has none; bots get a ` (bot)` suffix.
    pub fn label(&self) -> String {
        let base = match &self.username {
            Some(name) => format!("@{name}"),
            None => format!("id:{}", self.id),
        };
        if self.is_bot {
            format!("{base} (bot)")
        } else {
            base
        }
    }
}

/// An animation posted as a reply to a specific message.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MediaReply {
    pub chat_id: ChatId,
    pub reply_to: MessageId,
    pub media_url: String,
}

impl MediaReply {
    pub fn to(msg: MessageRef, media_url: impl Into<String>) -> Self {
        Self {
            chat_id: msg.chat_id,
            reply_to: msg.message_id,
            media_url: media_url.into(),
        }
    }
}
