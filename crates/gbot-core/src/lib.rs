//! Core domain + application logic for the online group bot.
//!
//! This crate is framework-agnostic. Telegram and the HTTP status page live in
//! adapter crates; they talk to the core through `messaging::port::MessagingPort`
//! and the shared stores.

pub mod accounts;
pub mod bot;
pub mod commands;
pub mod config;
pub mod domain;
pub mod errors;
pub mod formatting;
pub mod logging;
pub mod messaging;
pub mod session;
pub mod status;
pub mod work;

#[cfg(test)]
pub(crate) mod testing;

pub use errors::{Error, Result};
