/// Telegram chat id (numeric).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ChatId(pub i64);

/// Telegram message id (numeric, unique within a chat).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct MessageId(pub i64);

/// Telegram update id. Monotonically increasing, not necessarily contiguous.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct UpdateId(pub i64);

/// A stable reference to a Telegram message.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct MessageRef {
    pub chat_id: ChatId,
    pub message_id: MessageId,
}

/// Watermark of the last processed update.
///
/// The next fetch asks only for updates with an id strictly greater than this.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Offset(i64);

impl Offset {
    pub fn new(last_update_id: i64) -> Self {
        Self(last_update_id)
    }

    pub fn last_update_id(self) -> i64 {
        self.0
    }

    /// Value of the `offset` query parameter for the next fetch.
    pub fn next_request(self) -> i64 {
        self.0.saturating_add(1)
    }

    /// Advance to the highest id in `ids`. Never moves backwards; an empty
    /// batch leaves the offset untouched.
    pub fn advance<I>(&mut self, ids: I)
    where
        I: IntoIterator<Item = UpdateId>,
    {
        if let Some(max) = ids.into_iter().map(|id| id.0).max() {
            self.0 = self.0.max(max);
        }
    }
}
