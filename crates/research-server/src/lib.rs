//! HTTP surface for the research pipeline.
//!
//! `POST /research?q=` runs the full aggregation pipeline, `POST /chat` is a
//! direct conversational completion, and `GET /health` reports liveness and
//! the registered source count.

pub mod routes;
pub mod types;

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use research_core::Pipeline;
use tracing::info;

pub struct AppState {
    pub pipeline: Pipeline,
}

/// Binds and serves until the process is stopped.
pub async fn serve(pipeline: Pipeline, addr: SocketAddr) -> Result<()> {
    let state = Arc::new(AppState { pipeline });
    let router = routes::router(state);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    info!(%addr, "research server listening");

    axum::serve(listener, router)
        .await
        .context("Server terminated unexpectedly")
}
