//! Reverse-proxy listener
//!
//! Only answers health probes so the host's proxy can route to this service.
//! The run loop never touches it.

use crate::common::{Result, ServiceVariant};
use axum::{extract::State, http::StatusCode, response::IntoResponse, Router};
use serde_json::json;
use std::future::Future;
use std::net::SocketAddr;
use tower_http::trace::TraceLayer;

#[derive(Debug, Clone)]
pub struct ListenerState {
    pub variant: ServiceVariant,
}

pub fn create_router(state: ListenerState) -> Router {
    Router::new()
        .route("/health", axum::routing::get(health))
        .route("/health/live", axum::routing::get(health_live))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Serve until `shutdown` resolves
pub async fn serve<F>(addr: SocketAddr, state: ListenerState, shutdown: F) -> Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(addr = %listener.local_addr()?, "reverse-proxy listener bound");
    axum::serve(listener, create_router(state))
        .with_graceful_shutdown(shutdown)
        .await?;
    Ok(())
}

async fn health(State(state): State<ListenerState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        axum::Json(json!({
            "status": "ok",
            "variant": state.variant.role(),
            "version": crate::VERSION,
        })),
    )
}

async fn health_live() -> impl IntoResponse {
    (StatusCode::OK, axum::Json(json!({ "alive": true })))
}
