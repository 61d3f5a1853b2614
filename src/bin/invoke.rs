//! Single-shot entry point for hosts that own the listener.
//!
//! The host pipes one webhook request body to stdin and reads a CGI-style
//! response (`Status:` header, blank line, body) from stdout. Handler
//! failures are also returned from `main`, so the host sees a non-zero exit
//! alongside the error status. Logs go to stderr.
//!
//! Only the bot token is read from the environment; the host owns the
//! listener, so `PORT` and the webhook path are ignored here.

use std::io::{Read, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use axum::http::StatusCode;
use tracing::error;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use timebot::config::Config;
use timebot::handler::{Ack, HandlerError, UpdateHandler};

/// A config file that can't be read leaves the handler unconfigured, so the
/// host still gets a 500 status line instead of no response at all.
fn build_handler<F>(config_path: &Path, lookup: F) -> UpdateHandler
where
    F: Fn(&str) -> Option<String>,
{
    match Config::read_file(config_path) {
        Ok(mut config) => {
            config.apply_token_override(lookup);
            UpdateHandler::from_token(&config.telegram.bot_token)
        }
        Err(e) => {
            error!(
                "Failed to load config from {}: {:#}",
                config_path.display(),
                e
            );
            UpdateHandler::unconfigured(format!("{:#}", e))
        }
    }
}

/// Render a handler result as a CGI response. Errors carry the reason
/// phrase as a plain-text body; acknowledgements have no body.
fn cgi_response(result: &Result<Ack, HandlerError>) -> String {
    let status = match result {
        Ok(ack) => ack.status(),
        Err(e) => e.status(),
    };
    let reason = status.canonical_reason().unwrap_or_default();
    let body = if status == StatusCode::OK { "" } else { reason };

    format!(
        "Status: {} {}\r\nContent-Type: text/plain; charset=utf-8\r\nContent-Length: {}\r\n\r\n{}",
        status.as_u16(),
        reason,
        body.len(),
        body
    )
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,timebot=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let config_path = std::env::var("TIMEBOT_CONFIG")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("config.toml"));
    let handler = build_handler(&config_path, |key| std::env::var(key).ok());

    let mut body = Vec::new();
    std::io::stdin()
        .read_to_end(&mut body)
        .context("Failed to read request body from stdin")?;

    let result = handler.handle(&body).await;

    let mut stdout = std::io::stdout().lock();
    stdout
        .write_all(cgi_response(&result).as_bytes())
        .context("Failed to write response")?;
    stdout.flush()?;

    result?;
    Ok(())
}
