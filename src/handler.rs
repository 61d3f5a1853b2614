use std::sync::Arc;

use anyhow::Result;
use axum::http::StatusCode;
use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use thiserror::Error;
use tracing::{debug, error, info, warn};

use crate::clock::{format_in_zone, resolve_ist};
use crate::telegram::{Messenger, TelegramMessenger, Update};

pub const START_GREETING: &str = "Hello! Welcome to the bot.\nThe current time in India is: ";
pub const TIMEZONE_ERROR_REPLY: &str = "Error loading IST timezone";
pub const UNKNOWN_COMMAND_REPLY: &str =
    "Unknown command. Please use /start to see the current time in India.";

/// How a successfully handled update was acknowledged.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Ack {
    /// Not a command message; nothing was sent.
    Ignored,
    /// A reply was delivered to the chat.
    Replied,
}

impl Ack {
    pub fn status(&self) -> StatusCode {
        StatusCode::OK
    }
}

#[derive(Error, Debug)]
pub enum HandlerError {
    /// The messaging client could not be built (missing or bad token).
    #[error("bot client is not configured: {0}")]
    Configuration(String),
    /// The request body is not a valid update.
    #[error("failed to decode update: {0}")]
    Decode(#[source] serde_json::Error),
    /// The outbound send failed.
    #[error("failed to send reply: {0:#}")]
    Delivery(#[source] anyhow::Error),
}

impl HandlerError {
    pub fn status(&self) -> StatusCode {
        match self {
            HandlerError::Decode(_) => StatusCode::BAD_REQUEST,
            HandlerError::Configuration(_) | HandlerError::Delivery(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

/// Stateless webhook handler: decode one update, answer `/start`, acknowledge.
pub struct UpdateHandler {
    messenger: Result<Arc<dyn Messenger>, String>,
    now: fn() -> DateTime<Utc>,
}

impl UpdateHandler {
    pub fn new(messenger: Arc<dyn Messenger>) -> Self {
        Self {
            messenger: Ok(messenger),
            now: Utc::now,
        }
    }

    /// Build the Telegram client once. A bad token doesn't stop the process;
    /// every request then fails with a configuration error instead.
    pub fn from_token(token: &str) -> Self {
        match TelegramMessenger::new(token) {
            Ok(messenger) => Self::new(Arc::new(messenger)),
            Err(e) => {
                error!("Failed to initialize bot: {:#}", e);
                Self::unconfigured(format!("{:#}", e))
            }
        }
    }

    pub fn unconfigured(reason: impl Into<String>) -> Self {
        Self {
            messenger: Err(reason.into()),
            now: Utc::now,
        }
    }

    /// Replace the wall clock, mainly for tests.
    pub fn with_clock(mut self, now: fn() -> DateTime<Utc>) -> Self {
        self.now = now;
        self
    }

    pub async fn handle(&self, body: &[u8]) -> Result<Ack, HandlerError> {
        let messenger = match &self.messenger {
            Ok(messenger) => messenger,
            Err(reason) => {
                error!("Rejecting update, bot is not configured: {}", reason);
                return Err(HandlerError::Configuration(reason.clone()));
            }
        };

        let update: Update = serde_json::from_slice(body).map_err(|e| {
            warn!("Error decoding update: {}", e);
            HandlerError::Decode(e)
        })?;

        let message = match update.message {
            Some(message) if message.is_command() => message,
            _ => {
                debug!("Ignoring non-command update {}", update.update_id);
                return Ok(Ack::Ignored);
            }
        };

        let command = message.command().unwrap_or_default();
        info!(
            "Update {}: command '{}' in chat {} (message {})",
            update.update_id, command, message.chat.id, message.message_id
        );

        let text = reply_for(command, (self.now)());
        messenger
            .send_message(message.chat_id(), &text)
            .await
            .map_err(|e| {
                error!("Error sending message: {:#}", e);
                HandlerError::Delivery(e)
            })?;

        Ok(Ack::Replied)
    }
}

pub fn reply_for(command: &str, now: DateTime<Utc>) -> String {
    match command {
        "start" => start_reply(resolve_ist(), now),
        _ => UNKNOWN_COMMAND_REPLY.to_string(),
    }
}

pub fn start_reply(zone: Result<Tz>, now: DateTime<Utc>) -> String {
    match zone {
        Ok(zone) => format!("{}{}", START_GREETING, format_in_zone(now, zone)),
        Err(e) => {
            warn!("{:#}", e);
            TIMEZONE_ERROR_REPLY.to_string()
        }
    }
}
