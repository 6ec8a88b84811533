use crate::RoomRegistry;
use crate::http::handlers;
use anyhow::{Context, Result};
use axum::Router;
use axum::routing::{get, post};
use std::future::Future;
use tokio::net::TcpListener;
use tracing::info;

pub fn router(registry: RoomRegistry) -> Router {
    Router::new()
        .route("/health", get(handlers::health))
        .route("/rooms", post(handlers::create_room))
        .route("/rooms/{room}/offers", post(handlers::submit_offer))
        .route("/rooms/{room}/peers", get(handlers::list_peers))
        .route("/rooms/{room}/answers", post(handlers::submit_answer))
        .route("/rooms/{room}/answer", get(handlers::fetch_answer))
        .with_state(registry)
}

/// Serve the rendezvous API on `listener` until `shutdown` resolves.
pub async fn serve<F>(listener: TcpListener, registry: RoomRegistry, shutdown: F) -> Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let addr = listener
        .local_addr()
        .context("Listener has no local address")?;
    info!("Rendezvous service listening on http://{}", addr);

    axum::serve(listener, router(registry))
        .with_graceful_shutdown(shutdown)
        .await
        .context("Rendezvous server failed")?;

    info!("Rendezvous service stopped");
    Ok(())
}
