use async_trait::async_trait;

use crate::{
    domain::Offset,
    messaging::types::{MediaReply, Update},
    Result,
};

/// Outbound operations against the bot platform.
///
/// Implementations apply their own per-request timeout. Callers cancel an
/// in-flight call by dropping its future.
#[async_trait]
pub trait BotApi: Send + Sync {
    /// Fetch updates with an id strictly greater than `offset`.
    async fn fetch_updates(&self, offset: Offset) -> Result<Vec<Update>>;

    /// Post `reply.media_url` as an animation replying to `reply.reply_to`.
    /// Not idempotent: calling twice posts twice.
    async fn send_media_reply(&self, reply: &MediaReply) -> Result<()>;
}
