//! HTTP status page (axum).
//!
//! Read-only: `/` renders the HTML status page, `/health` returns the same
//! snapshot as JSON. Nothing here mutates bot state.

use std::{net::SocketAddr, sync::Arc};

use axum::{extract::State, response::Html, routing::get, Json, Router};
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;

use gbot_core::status::{StatusReporter, StatusSnapshot};

pub fn router(status: Arc<StatusReporter>) -> Router {
    Router::new()
        .route("/", get(status_page))
        .route("/health", get(health))
        .with_state(status)
}

async fn status_page(State(status): State<Arc<StatusReporter>>) -> Html<String> {
    Html(status.page_html().await)
}

async fn health(State(status): State<Arc<StatusReporter>>) -> Json<StatusSnapshot> {
    Json(status.snapshot().await)
}

/// Bind `addr` and serve until `shutdown` fires.
///
/// If the server cannot start or dies, `shutdown` is cancelled so the rest of
/// the process stops with it.
pub async fn serve(
    addr: SocketAddr,
    status: Arc<StatusReporter>,
    shutdown: CancellationToken,
) -> anyhow::Result<()> {
    let res = bind_and_serve(addr, status, shutdown.clone()).await;
    if let Err(e) = &res {
        tracing::error!("❌ Web server failed: {e:#}");
        shutdown.cancel();
    }
    res
}

async fn bind_and_serve(
    addr: SocketAddr,
    status: Arc<StatusReporter>,
    shutdown: CancellationToken,
) -> anyhow::Result<()> {
    let listener = TcpListener::bind(addr)
        .await
        .map_err(|e| anyhow::anyhow!("failed to bind {addr}: {e}"))?;
    serve_on(listener, status, shutdown).await
}

pub async fn serve_on(
    listener: TcpListener,
    status: Arc<StatusReporter>,
    shutdown: CancellationToken,
) -> anyhow::Result<()> {
    let local = listener.local_addr()?;
    tracing::info!("🌐 Web server running on port {}", local.port());

    axum::serve(listener, router(status))
        .with_graceful_shutdown(async move { shutdown.cancelled().await })
        .await?;

    tracing::info!("web server stopped");
    Ok(())
}
