//! API — Axum web server for card building and candidate scanning.
//!
//! CORS enabled for local tooling. A panic inside a handler becomes a
//! 400 `{error}` response instead of a dropped connection.

pub mod routes;

use anyhow::{Context, Result};
use axum::{
    http::{header, HeaderValue, Method},
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use std::any::Any;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::CorsLayer;
use tracing::{error, info};

pub use routes::AppState;

/// Build the Axum router with all routes and middleware.
pub fn build_router(state: AppState) -> Router {
    let router = Router::new()
        .route("/api/pcard", post(routes::post_pcard))
        .route("/api/scan", post(routes::post_scan))
        .route("/api/bands", get(routes::get_bands))
        .route("/health", get(routes::health));

    with_middleware(router).with_state(state)
}

fn with_middleware(router: Router<AppState>) -> Router<AppState> {
    let cors = CorsLayer::new()
        .allow_origin(HeaderValue::from_static("*"))
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([header::CONTENT_TYPE]);

    router
        .layer(CatchPanicLayer::custom(panic_response))
        .layer(cors)
}

fn panic_response(panic: Box<dyn Any + Send + 'static>) -> Response {
    let detail = panic
        .downcast_ref::<&str>()
        .map(|s| s.to_string())
        .or_else(|| panic.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "unknown panic".to_string());
    error!(panic = %detail, "Request handler panicked");
    routes::ApiError::internal().into_response()
}

/// Serve the API on `port` until `shutdown` resolves.
pub async fn serve(
    state: AppState,
    port: u16,
    shutdown: impl std::future::Future<Output = ()> + Send + 'static,
) -> Result<()> {
    let app = build_router(state);
    let addr = std::net::SocketAddr::from(([0, 0, 0, 0], port));

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind API port {port}"))?;
    info!(port, "API server listening on http://localhost:{port}");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await
        .context("API server error")?;

    info!("API server stopped");
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
