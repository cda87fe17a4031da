use std::{env, fs, path::Path, time::Duration};

use crate::{
    errors::Error,
    media::MediaCatalog,
    trigger::DEFAULT_KEYWORDS,
    Result,
};

pub const DEFAULT_API_BASE_URL: &str = "https://api.telegram.org";

/// Typed runtime configuration.
#[derive(Clone)]
pub struct Config {
    pub telegram_bot_token: String,
    pub api_base_url: String,

    /// Pause between two polling iterations.
    pub poll_delay: Duration,
    /// Timeout applied to every outbound HTTP request.
    pub request_timeout: Duration,

    pub trigger_keywords: Vec<String>,
    pub media_catalog: MediaCatalog,
}

impl Config {
    /// Load from the process environment, reading `.env` first if present.
    /// Must run before the async runtime starts (see `load_dotenv_if_present`).
    pub fn load() -> Result<Self> {
        load_dotenv_if_present(Path::new(".env"));
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build from an arbitrary key lookup (the environment, a map in tests).
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let telegram_bot_token = lookup("TELEGRAM_BOT_TOKEN")
            .and_then(non_empty)
            .ok_or_else(|| {
                Error::Config("TELEGRAM_BOT_TOKEN environment variable is required".to_string())
            })?;

        let api_base_url = lookup("TELEGRAM_API_BASE_URL")
            .and_then(non_empty)
            .map(|s| s.trim().trim_end_matches('/').to_string())
            .unwrap_or_else(|| DEFAULT_API_BASE_URL.to_string());

        let poll_delay = Duration::from_millis(parse_u64(&lookup, "POLL_DELAY_MS")?.unwrap_or(100));
        let request_timeout =
            Duration::from_millis(parse_u64(&lookup, "HTTP_TIMEOUT_MS")?.unwrap_or(10_000));
        if request_timeout.is_zero() {
            return Err(Error::Config("HTTP_TIMEOUT_MS must be positive".to_string()));
        }

        let trigger_keywords = match lookup("TRIGGER_KEYWORDS") {
            Some(v) => parse_csv_lower(&v),
            None => DEFAULT_KEYWORDS.iter().map(|s| s.to_string()).collect(),
        };

        let media_catalog = match lookup("MEDIA_URLS") {
            Some(v) => MediaCatalog::new(parse_csv(&v))?,
            None => MediaCatalog::builtin(),
        };

        Ok(Self {
            telegram_bot_token,
            api_base_url,
            poll_delay,
            request_timeout,
            trigger_keywords,
            media_catalog,
        })
    }
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("telegram_bot_token", &"<redacted>")
            .field("api_base_url", &self.api_base_url)
            .field("poll_delay", &self.poll_delay)
            .field("request_timeout", &self.request_timeout)
            .field("trigger_keywords", &self.trigger_keywords)
            .field("media_catalog_len", &self.media_catalog.len())
            .finish()
    }
}

/// Copy `KEY=value` pairs from a dotenv file into the process environment.
/// Existing variables win. Missing file is not an error.
///
/// Mutates process env, so call it before any threads start (before the
/// tokio runtime is built).
fn load_dotenv_if_present(path: &Path) {
    let Ok(contents) = fs::read_to_string(path) else {
        return;
    };

    for (key, val) in parse_dotenv(&contents) {
        if env::var_os(&key).is_none() {
            env::set_var(key, val);
        }
    }
}

/// Parse dotenv lines: blank lines and `#` comments are skipped, values may be
/// wrapped in matching single or double quotes.
fn parse_dotenv(contents: &str) -> Vec<(String, String)> {
    contents
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .filter_map(|line| line.split_once('='))
        .map(|(k, v)| (k.trim(), unquote(v.trim())))
        .filter(|(k, _)| !k.is_empty())
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

fn unquote(v: &str) -> &str {
    for q in ['"', '\''] {
        if v.len() >= 2 && v.starts_with(q) && v.ends_with(q) {
            return &v[1..v.len() - 1];
        }
    }
    v
}

fn parse_u64<F>(lookup: &F, key: &str) -> Result<Option<u64>>
where
    F: Fn(&str) -> Option<String>,
{
    let Some(raw) = lookup(key) else {
        return Ok(None);
    };
    raw.trim()
        .parse::<u64>()
        .map(Some)
        .map_err(|e| Error::Config(format!("{key}: expected milliseconds, got {raw:?}: {e}")))
}

fn parse_csv(v: &str) -> Vec<String> {
    v.split(',')
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .map(|s| s.to_string())
        .collect()
}

fn parse_csv_lower(v: &str) -> Vec<String> {
    parse_csv(v).into_iter().map(|s| s.to_lowercase()).collect()
}

fn non_empty(s: String) -> Option<String> {
    if s.trim().is_empty() {
        None
    } else {
        Some(s)
    }
}
