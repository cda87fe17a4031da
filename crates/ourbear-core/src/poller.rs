//! The poll-classify-dispatch loop.

use std::{sync::Arc, time::Duration};

use tokio::{task::JoinSet, time::sleep};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::{
    domain::Offset,
    media::MediaSelector,
    messaging::{port::BotApi, types::MediaReply},
    trigger::TriggerClassifier,
    Error, Result,
};

/// Long-polling orchestrator. Owns the offset; one instance per run.
pub struct Poller {
    api: Arc<dyn BotApi>,
    classifier: TriggerClassifier,
    selector: MediaSelector,
    delay: Duration,
    offset: Offset,
}

impl Poller {
    pub fn new(
        api: Arc<dyn BotApi>,
        classifier: TriggerClassifier,
        selector: MediaSelector,
        delay: Duration,
    ) -> Self {
        Self {
            api,
            classifier,
            selector,
            delay,
            offset: Offset::default(),
        }
    }

    pub fn offset(&self) -> Offset {
        self.offset
    }

    pub fn selector(&self) -> &MediaSelector {
        &self.selector
    }

    /// Poll until `cancel` fires.
    ///
    /// Per-iteration failures are logged and retried on the next iteration with
    /// the same offset. The returned value is always [`Error::Cancelled`].
    pub async fn run(mut self, cancel: CancellationToken) -> Error {
        info!(delay_ms = self.delay.as_millis() as u64, "poller started");

        loop {
            if cancel.is_cancelled() {
                break;
            }

            let offset = self.offset;
            tokio::select! {
                biased;
                _ = cancel.cancelled() => break,
                res = self.poll_once() => {
                    if let Err(e) = res {
                        error!(
                            error = %e,
                            offset = offset.last_update_id(),
                            "failed to run iteration"
                        );
                    }
                }
            }

            tokio::select! {
                biased;
                _ = cancel.cancelled() => break,
                _ = sleep(self.delay) => {}
            }
        }

        info!(offset = self.offset.last_update_id(), "poller stopped");
        Error::Cancelled
    }

    /// Run one fetch-classify-dispatch pass and return the number of replies
    /// dispatched.
    ///
    /// The offset advances to the highest update id of the batch as soon as
    /// the batch is fetched, whatever happens to the individual sends. Sends
    /// for one batch run concurrently and are all awaited before returning.
    pub async fn poll_once(&mut self) -> Result<usize> {
        let updates = self.api.fetch_updates(self.offset).await?;
        if updates.is_empty() {
            return Ok(0);
        }

        debug!(
            count = updates.len(),
            offset = self.offset.last_update_id(),
            "received updates"
        );
        self.offset.advance(updates.iter().map(|u| u.update_id));

        let mut sends = JoinSet::new();
        for update in updates {
            let update_id = update.update_id.0;
            let Some(msg) = update.message else {
                continue;
            };
            if !self.classifier.is_match(&msg.text) {
                continue;
            }

            let media_url = self.selector.next_media(msg.chat_id).await;
            let reply = MediaReply::to(msg.message_ref(), media_url);
            let sender = msg
                .sender
                .as_ref()
                .map(|s| s.label())
                .unwrap_or_else(|| "unknown".to_string());
            let sent_at = msg.sent_at.map(|t| t.to_rfc3339());
            let api = self.api.clone();

            sends.spawn(async move {
                match api.send_media_reply(&reply).await {
                    Ok(()) => debug!(
                        update_id,
                        chat_id = reply.chat_id.0,
                        message_id = reply.reply_to.0,
                        sender = %sender,
                        sent_at = sent_at.as_deref().unwrap_or("-"),
                        media = %reply.media_url,
                        "reply sent"
                    ),
                    Err(e) => error!(
                        error = %e,
                        update_id,
                        chat_id = reply.chat_id.0,
                        message_id = reply.reply_to.0,
                        "failed to send reply"
                    ),
                }
            });
        }

        let dispatched = sends.len();
        while let Some(joined) = sends.join_next().await {
            if let Err(e) = joined {
                warn!(error = %e, "reply task did not complete");
            }
        }

        Ok(dispatched)
    }
}
