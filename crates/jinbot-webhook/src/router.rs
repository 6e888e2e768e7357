//! Router configuration and server setup.

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::cors::{Any, CorsLayer};
use tracing::info;

use crate::handlers;
use crate::state::AppState;

/// Creates the webhook router.
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(handlers::health))
        .route("/webhook", post(handlers::receive_webhook))
        .layer(cors)
        .with_state(state)
}

/// Starts the webhook receiver.
pub async fn serve(port: u16, state: AppState) -> Result<(), std::io::Error> {
    let addr = format!("0.0.0.0:{}", port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("webhook receiver listening on {}", addr);
    axum::serve(listener, create_router(state)).await
}
