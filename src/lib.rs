//! Telegram webhook bot that answers `/start` with the current time in India.
//!
//! The [`handler::UpdateHandler`] does all the work; `server` and the
//! `invoke` binary only adapt its result to their hosting convention.

pub mod clock;
pub mod config;
pub mod handler;
pub mod server;
pub mod telegram;
