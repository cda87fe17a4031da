//! Telegram adapter (plain HTTP GET over reqwest).
//!
//! This crate implements the `ourbear-core` BotApi port against the Bot API's
//! `getUpdates` and `sendAnimation` methods.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Url;
use tracing::trace;

pub mod wire;

use ourbear_core::{
    config::Config,
    domain::Offset,
    errors::Error,
    messaging::{
        port::BotApi,
        types::{MediaReply, Update},
    },
    Result,
};

const ERROR_BODY_EXCERPT: usize = 200;

#[derive(Clone)]
pub struct TelegramClient {
    http: reqwest::Client,
    base_url: String,
    token: String,
}

impl TelegramClient {
    pub fn new(
        base_url: impl Into<String>,
        token: impl Into<String>,
        request_timeout: Duration,
    ) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(request_timeout)
            .build()
            .map_err(|e| Error::Config(format!("http client build failed: {e}")))?;
        Ok(Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            token: token.into(),
        })
    }

    pub fn from_config(cfg: &Config) -> Result<Self> {
        Self::new(
            cfg.api_base_url.clone(),
            cfg.telegram_bot_token.clone(),
            cfg.request_timeout,
        )
    }

    fn method_url(&self, method: &str) -> Result<Url> {
        Url::parse(&format!("{}/bot{}/{method}", self.base_url, self.token))
            .map_err(|e| Error::Config(format!("invalid api url for {method}: {e}")))
    }

    /// `getUpdates?offset=<last processed id + 1>`
    pub fn get_updates_url(&self, offset: Offset) -> Result<Url> {
        let mut url = self.method_url("getUpdates")?;
        url.query_pairs_mut()
            .append_pair("offset", &offset.next_request().to_string());
        Ok(url)
    }

    /// `sendAnimation?chat_id=..&animation=..&reply_parameters={"message_id":..}`
    pub fn send_animation_url(&self, reply: &MediaReply) -> Result<Url> {
        let reply_parameters = serde_json::to_string(&wire::ReplyParameters {
            message_id: reply.reply_to.0,
        })?;

        let mut url = self.method_url("sendAnimation")?;
        url.query_pairs_mut()
            .append_pair("chat_id", &reply.chat_id.0.to_string())
            .append_pair("animation", &reply.media_url)
            .append_pair("reply_parameters", &reply_parameters);
        Ok(url)
    }

    /// GET `url` and return the body of a 2xx response.
    async fn get(&self, method: &str, url: Url) -> Result<String> {
        trace!(method, "bot api request");

        let resp = self
            .http
            .get(url)
            .send()
            .await
            .map_err(|e| Self::map_err(method, e))?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(Error::Transport(format!(
                "{method} failed: {status} {}",
                body.chars().take(ERROR_BODY_EXCERPT).collect::<String>()
            )));
        }

        resp.text().await.map_err(|e| Self::map_err(method, e))
    }

    /// The request URL embeds the token, so it is stripped before formatting.
    fn map_err(method: &str, e: reqwest::Error) -> Error {
        let timed_out = e.is_timeout();
        let e = e.without_url();
        if timed_out {
            Error::Transport(format!("{method} timed out: {e}"))
        } else {
            Error::Transport(format!("{method} request error: {e}"))
        }
    }
}

impl std::fmt::Debug for TelegramClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TelegramClient")
            .field("base_url", &self.base_url)
            .field("token", &"<redacted>")
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl BotApi for TelegramClient {
    async fn fetch_updates(&self, offset: Offset) -> Result<Vec<Update>> {
        let url = self.get_updates_url(offset)?;
        let body = self.get("getUpdates", url).await?;

        let envelope: wire::Envelope<Vec<serde_json::Value>> = serde_json::from_str(&body)
            .map_err(|e| Error::Decode(format!("error decoding updates response: {e}")))?;

        if !envelope.ok {
            let code = envelope
                .error_code
                .map(|c| format!(" (error_code {c})"))
                .unwrap_or_default();
            return Err(Error::Decode(format!(
                "didn't get ok in response body: {}{code}",
                envelope.description.as_deref().unwrap_or("no description")
            )));
        }

        let raw = envelope
            .result
            .ok_or_else(|| Error::Decode("ok response without result".to_string()))?;

        Ok(wire::decode_updates(raw))
    }

    async fn send_media_reply(&self, reply: &MediaReply) -> Result<()> {
        let url = self.send_animation_url(reply)?;
        self.get("sendAnimation", url).await?;
        Ok(())
    }
}
