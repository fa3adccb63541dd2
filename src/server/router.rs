use std::sync::Arc;
use std::time::Instant;

use axum::extract::{DefaultBodyLimit, Request};
use axum::http::StatusCode;
use axum::middleware::{self, Next};
use axum::response::{IntoResponse, Response};
use axum::{
    Json, Router,
    routing::{get, post},
};

use super::response::ApiResponse;
use super::{flyers, stores};
use crate::config::ServerConfig;
use crate::repository::Repository;

/// Headroom for the multipart framing and the JSON part next to the image.
const MULTIPART_OVERHEAD_BYTES: usize = 1024 * 1024;

pub struct AppState {
    pub repository: Arc<dyn Repository>,
    pub config: ServerConfig,
}

impl AppState {
    #[must_use]
    pub fn new(repository: Arc<dyn Repository>, config: ServerConfig) -> Self {
        Self { repository, config }
    }
}

async fn health() -> &'static str {
    "OK"
}

async fn fallback() -> impl IntoResponse {
    (StatusCode::NOT_FOUND, Json(ApiResponse::<()>::error("Not found")))
}

async fn log_request(request: Request, next: Next) -> Response {
    let method = request.method().clone();
    let uri = request.uri().clone();
    let start = Instant::now();

    let response = next.run(request).await;

    let latency = start.elapsed();
    let status = response.status();

    tracing::info!(
        "{} {} {} {}ms",
        method,
        uri.path(),
        status.as_u16(),
        latency.as_millis()
    );

    response
}

fn api_router() -> Router<Arc<AppState>> {
    Router::new()
        // Flyers
        .route("/flyer/upload", post(flyers::upload_flyer))
        .route("/flyer/{store_id}", get(flyers::get_flyer))
        // Stores
        .route("/stores", get(stores::list_stores).post(stores::create_store))
        .route("/stores/{id}", get(stores::get_store))
}

pub fn create_router(state: Arc<AppState>) -> Router {
    let body_limit = state
        .config
        .max_upload_bytes
        .saturating_add(MULTIPART_OVERHEAD_BYTES);

    Router::new()
        .route("/health", get(health))
        .nest("/api/v1", api_router())
        .fallback(fallback)
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(middleware::from_fn(log_request))
        .with_state(state)
}
