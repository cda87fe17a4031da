//! Messenger-facing abstractions: the incoming update model and the API port.

pub mod port;
pub mod types;
