use std::sync::Arc;

use anyhow::{Context, Result};
use axum::{
    body::Bytes,
    extract::State,
    response::{IntoResponse, Response},
    routing::post,
    Router,
};
use tracing::info;

use crate::config::ServerConfig;
use crate::handler::{Ack, HandlerError, UpdateHandler};

impl IntoResponse for Ack {
    fn into_response(self) -> Response {
        self.status().into_response()
    }
}

impl IntoResponse for HandlerError {
    fn into_response(self) -> Response {
        let status = self.status();
        let reason = status.canonical_reason().unwrap_or_default();
        (status, reason).into_response()
    }
}

pub fn router(handler: Arc<UpdateHandler>, webhook_path: &str) -> Router {
    Router::new()
        .route(webhook_path, post(receive_update))
        .with_state(handler)
}

async fn receive_update(
    State(handler): State<Arc<UpdateHandler>>,
    body: Bytes,
) -> Result<Ack, HandlerError> {
    handler.handle(&body).await
}

/// Serve the webhook until Ctrl-C.
pub async fn serve(handler: Arc<UpdateHandler>, config: &ServerConfig) -> Result<()> {
    let app = router(handler, &config.webhook_path);

    let addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind to {addr}"))?;

    info!(
        "Webhook listening on {} at {}",
        listener.local_addr()?,
        config.webhook_path
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            info!("Shutting down");
        })
        .await
        .context("Server error")?;

    Ok(())
}
