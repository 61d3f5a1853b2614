use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use serde::Deserialize;
use teloxide::requests::Requester;
use teloxide::types::ChatId;
use teloxide::Bot;

/// The subset of a Telegram webhook update the bot reads.
/// Other update kinds (edited messages, callback queries, ...) deserialize
/// fine and simply carry no `message`.
#[derive(Debug, Deserialize)]
pub struct Update {
    pub update_id: i64,
    #[serde(default)]
    pub message: Option<IncomingMessage>,
}

#[derive(Debug, Deserialize)]
pub struct IncomingMessage {
    pub message_id: i64,
    pub chat: Chat,
    #[serde(default)]
    pub text: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct Chat {
    pub id: i64,
}

impl IncomingMessage {
    pub fn chat_id(&self) -> ChatId {
        ChatId(self.chat.id)
    }

    pub fn is_command(&self) -> bool {
        self.text.as_deref().is_some_and(|t| t.starts_with('/'))
    }

    /// Command name without the leading slash or a trailing `@botname`,
    /// e.g. `/start@time_bot now` -> `start`. `None` for non-commands.
    pub fn command(&self) -> Option<&str> {
        let rest = self.text.as_deref()?.strip_prefix('/')?;
        let word = rest.split(char::is_whitespace).next().unwrap_or_default();
        Some(word.split('@').next().unwrap_or_default())
    }
}

/// Outbound side of the bot. Kept minimal so tests can swap in a fake.
#[async_trait]
pub trait Messenger: Send + Sync {
    async fn send_message(&self, chat_id: ChatId, text: &str) -> Result<()>;
}

/// Messenger backed by the Telegram Bot API.
pub struct TelegramMessenger {
    bot: Bot,
}

impl TelegramMessenger {
    pub fn new(token: &str) -> Result<Self> {
        validate_token(token)?;
        Ok(Self {
            bot: Bot::new(token),
        })
    }
}

#[async_trait]
impl Messenger for TelegramMessenger {
    async fn send_message(&self, chat_id: ChatId, text: &str) -> Result<()> {
        self.bot
            .send_message(chat_id, text.to_string())
            .await
            .with_context(|| format!("Failed to send message to chat {}", chat_id.0))?;
        Ok(())
    }
}

/// Bot tokens look like `<bot id>:<secret>`.
fn validate_token(token: &str) -> Result<()> {
    if token.trim().is_empty() {
        bail!("Bot token is not set");
    }
    match token.split_once(':') {
        Some((id, secret))
            if !id.is_empty() && id.chars().all(|c| c.is_ascii_digit()) && !secret.is_empty() =>
        {
            Ok(())
        }
        _ => bail!("Bot token is malformed"),
    }
}
