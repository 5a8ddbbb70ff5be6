//! Standalone HTTP server binding.

use std::net::SocketAddr;

use axum::{
    Router,
    body::Bytes,
    extract::State,
    http::{StatusCode, header},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use tokio::net::TcpListener;
use tracing::{info, instrument};

use crate::{
    base::types::Void,
    interaction::relay::{Relay, WebhookReply},
};

impl IntoResponse for WebhookReply {
    fn into_response(self) -> Response {
        if self.body.is_empty() {
            return self.status.into_response();
        }

        (self.status, [(header::CONTENT_TYPE, "text/plain")], self.body).into_response()
    }
}

/// Build the router: `/test` liveness probe and `/events` webhook.
pub fn router(relay: Relay) -> Router {
    Router::new()
        .route("/test", get(handle_test).post(handle_test))
        .route("/events", post(handle_events))
        .with_state(relay)
}

/// Serve the router on `addr` until Ctrl-C.
pub async fn serve(addr: SocketAddr, relay: Relay) -> Void {
    let listener = TcpListener::bind(addr).await?;
    info!("Server listening on {}", listener.local_addr()?);

    axum::serve(listener, router(relay)).with_graceful_shutdown(shutdown_signal()).await?;

    Ok(())
}

async fn shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
    info!("Shutting down ...");
}

async fn handle_test() -> StatusCode {
    info!("Test route hit");
    StatusCode::OK
}

#[instrument(skip_all)]
async fn handle_events(State(relay): State<Relay>, body: Bytes) -> WebhookReply {
    relay.handle_webhook(&body).await
}
