//! Core domain + application logic for the kinogate bot.
//!
//! This crate is intentionally framework-agnostic. Telegram and SQLite live
//! behind ports (traits) implemented in adapter crates.

pub mod codes;
pub mod config;
pub mod console;
pub mod domain;
pub mod errors;
pub mod formatting;
pub mod gate;
pub mod logging;
pub mod messaging;
pub mod ports;
pub mod router;
pub mod security;

#[cfg(test)]
pub(crate) mod testing;

pub use errors::{Error, Result};
