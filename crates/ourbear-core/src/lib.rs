//! Core logic for the OurBear reply bot.
//!
//! Framework-agnostic: the bot platform lives behind the [`messaging::port::BotApi`]
//! port, implemented in `ourbear-telegram`.

pub mod config;
pub mod domain;
pub mod errors;
pub mod logging;
pub mod media;
pub mod messaging;
pub mod poller;
pub mod trigger;

pub use errors::{Error, Result};
