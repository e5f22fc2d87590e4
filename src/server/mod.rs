pub mod error;
pub mod handlers;
pub mod models;

use axum::{
    routing::{get, post},
    Router,
};
use std::net::SocketAddr;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::inference::LayoutLmv3;

pub fn create_app() -> Router {
    Router::new()
        .route("/health", get(handlers::health))
        .route("/api/v1/invoice", post(handlers::extract_invoice))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}

pub async fn initialize_models() -> Result<(), Box<dyn std::error::Error>> {
    tracing::info!("Preloading models...");

    tracing::info!("  Loading LayoutLMv3 (token classification)...");
    LayoutLmv3::get_or_init()?;

    tracing::info!("  Loading label colors and caption font...");
    handlers::extraction_options()?;

    tracing::info!("All models preloaded successfully.");

    Ok(())
}

pub async fn start_server(addr: SocketAddr) -> Result<(), Box<dyn std::error::Error>> {
    tracing::info!("Starting server on {}", addr);

    let app = create_app();
    let listener = tokio::net::TcpListener::bind(addr).await?;

    tracing::info!("Server listening on http://{}", addr);
    tracing::info!("API endpoint: http://{}/api/v1/invoice", addr);
    tracing::info!("Health check: http://{}/health", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
