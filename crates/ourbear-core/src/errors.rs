/// Core error type.
///
/// Adapter crates map their specific errors into this type so the poll loop
/// can treat every per-iteration failure the same way.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("config error: {0}")]
    Config(String),

    /// Network failure, timeout or non-success HTTP status.
    #[error("transport error: {0}")]
    Transport(String),

    /// Malformed or semantically invalid response body.
    #[error("decode error: {0}")]
    Decode(String),

    #[error("cancelled")]
    Cancelled,

    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
