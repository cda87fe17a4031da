//! Scripted in-memory [`BotApi`] for driving the poller without a network.
//!
//! Fetches pop pre-queued responses (an empty batch once the script runs out);
//! every fetch offset and every send is recorded for assertions.

use std::{
    collections::{HashSet, VecDeque},
    sync::Mutex,
};

use async_trait::async_trait;
use tokio::sync::Notify;

use ourbear_core::{
    domain::{ChatId, MessageId, Offset, UpdateId},
    messaging::{
        port::BotApi,
        types::{IncomingMessage, MediaReply, Sender, Update},
    },
    Error, Result,
};

#[derive(Default)]
pub struct FakeApi {
    script: Mutex<VecDeque<Result<Vec<Update>>>>,
    failing_chats: Mutex<HashSet<i64>>,
    fetch_offsets: Mutex<Vec<i64>>,
    sends: Mutex<Vec<MediaReply>>,
    /// Notified after every fetch.
    pub fetched: Notify,
}

#[allow(dead_code)] // not every test binary uses every helper
impl FakeApi {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_batch(&self, updates: Vec<Update>) {
        self.script.lock().unwrap().push_back(Ok(updates));
    }

    pub fn push_error(&self, err: Error) {
        self.script.lock().unwrap().push_back(Err(err));
    }

    pub fn fail_sends_to(&self, chat_id: i64) {
        self.failing_chats.lock().unwrap().insert(chat_id);
    }

    /// `offset` query values seen so far (last processed id + 1).
    pub fn fetch_offsets(&self) -> Vec<i64> {
        self.fetch_offsets.lock().unwrap().clone()
    }

    pub fn sends(&self) -> Vec<MediaReply> {
        self.sends.lock().unwrap().clone()
    }
}

#[async_trait]
impl BotApi for FakeApi {
    async fn fetch_updates(&self, offset: Offset) -> Result<Vec<Update>> {
        self.fetch_offsets
            .lock()
            .unwrap()
            .push(offset.next_request());
        let next = self.script.lock().unwrap().pop_front();
        self.fetched.notify_waiters();
        next.unwrap_or_else(|| Ok(Vec::new()))
    }

    async fn send_media_reply(&self, reply: &MediaReply) -> Result<()> {
        self.sends.lock().unwrap().push(reply.clone());
        if self.failing_chats.lock().unwrap().contains(&reply.chat_id.0) {
            return Err(Error::Transport("503 Service Unavailable".to_string()));
        }
        Ok(())
    }
}

#[allow(dead_code)]
pub fn text_update(update_id: i64, chat_id: i64, message_id: i64, text: &str) -> Update {
    Update {
        update_id: UpdateId(update_id),
        message: Some(IncomingMessage {
            chat_id: ChatId(chat_id),
            message_id: MessageId(message_id),
            text: text.to_string(),
            sent_at: None,
            sender: Some(Sender {
                id: 1000 + chat_id,
                username: Some("tester".to_string()),
                is_bot: false,
            }),
        }),
    }
}

#[allow(dead_code)]
pub fn empty_update(update_id: i64) -> Update {
    Update {
        update_id: UpdateId(update_id),
        message: None,
    }
}

/// Which call of [`HangingApi`] never returns.
#[allow(dead_code)]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Hang {
    Fetch,
    Send,
}

/// API whose fetch (or send) blocks for an hour once reached.
///
/// With [`Hang::Send`] the first fetch returns one matching message so the
/// poller gets as far as dispatching.
pub struct HangingApi {
    hang: Hang,
    fetches: Mutex<usize>,
    /// Gets a permit when the hanging call is entered.
    pub stalled: Notify,
}

#[allow(dead_code)]
impl HangingApi {
    pub fn new(hang: Hang) -> Self {
        Self {
            hang,
            fetches: Mutex::new(0),
            stalled: Notify::new(),
        }
    }

    pub fn fetches(&self) -> usize {
        *self.fetches.lock().unwrap()
    }

    async fn stall(&self) {
        self.stalled.notify_one();
        tokio::time::sleep(std::time::Duration::from_secs(3600)).await;
    }
}

#[async_trait]
impl BotApi for HangingApi {
    async fn fetch_updates(&self, _offset: Offset) -> Result<Vec<Update>> {
        let n = {
            let mut fetches = self.fetches.lock().unwrap();
            *fetches += 1;
            *fetches
        };
        if self.hang == Hang::Fetch {
            self.stall().await;
        }
        if n == 1 {
            return Ok(vec![text_update(1, 42, 9, "гойда")]);
        }
        Ok(Vec::new())
    }

    async fn send_media_reply(&self, _reply: &MediaReply) -> Result<()> {
        if self.hang == Hang::Send {
            self.stall().await;
        }
        Ok(())
    }
}
