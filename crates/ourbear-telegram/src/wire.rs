//! Bot API JSON shapes (only the fields we read).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::warn;

use ourbear_core::{
    domain::{ChatId, MessageId, UpdateId},
    messaging::types as model,
};

/// Response envelope shared by every Bot API method.
#[derive(Debug, Deserialize)]
pub struct Envelope<T> {
    pub ok: bool,
    pub result: Option<T>,
    pub description: Option<String>,
    pub error_code: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub struct Update {
    pub update_id: i64,
    pub message: Option<Message>,
}

#[derive(Debug, Deserialize)]
pub struct Message {
    pub message_id: i64,
    pub from: Option<User>,
    pub chat: Chat,
    #[serde(default)]
    pub date: i64,
    pub text: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct User {
    pub id: i64,
    #[serde(default)]
    pub is_bot: bool,
    pub username: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct Chat {
    pub id: i64,
}

/// Only the id, for entries whose full shape does not decode.
#[derive(Debug, Deserialize)]
struct UpdateIdOnly {
    update_id: i64,
}

/// `reply_parameters` argument of send methods.
#[derive(Debug, Serialize)]
pub struct ReplyParameters {
    pub message_id: i64,
}

/// Convert the raw `result` array of `getUpdates`, one entry at a time.
///
/// An entry whose message does not decode is kept as a message-less update so
/// the offset still moves past it; without that, every later poll would fetch
/// the same broken entry again. Entries without a readable `update_id` are
/// dropped.
pub fn decode_updates(raw: Vec<Value>) -> Vec<model::Update> {
    raw.into_iter()
        .filter_map(|value| match Update::deserialize(&value) {
            Ok(update) => Some(update.into()),
            Err(e) => match UpdateIdOnly::deserialize(&value) {
                Ok(UpdateIdOnly { update_id }) => {
                    warn!(update_id, error = %e, "skipping undecodable update");
                    Some(model::Update {
                        update_id: UpdateId(update_id),
                        message: None,
                    })
                }
                Err(_) => {
                    warn!(error = %e, "dropping update without update_id");
                    None
                }
            },
        })
        .collect()
}

impl From<Update> for model::Update {
    fn from(u: Update) -> Self {
        Self {
            update_id: UpdateId(u.update_id),
            message: u.message.map(Into::into),
        }
    }
}

impl From<Message> for model::IncomingMessage {
    fn from(m: Message) -> Self {
        Self {
            chat_id: ChatId(m.chat.id),
            message_id: MessageId(m.message_id),
            text: m.text.unwrap_or_default(),
            sent_at: if m.date > 0 {
                DateTime::<Utc>::from_timestamp(m.date, 0)
            } else {
                None
            },
            sender: m.from.map(|u| model::Sender {
                id: u.id,
                username: u.username,
                is_bot: u.is_bot,
            }),
        }
    }
}
