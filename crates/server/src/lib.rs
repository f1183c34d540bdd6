pub mod config;
pub mod error;
pub mod routes;
pub mod telemetry;

use std::sync::Arc;

use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use axum::Router;
use recibos_ocr::{ImagePipeline, OcrBackend};
use recibos_pdf::ReceiptOptions;
use tower_http::cors::CorsLayer;
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::trace::TraceLayer;

use crate::config::ServerConfig;

/// Shared, read-only request context. Nothing is persisted between requests.
#[derive(Clone)]
pub struct AppState {
    pub pipeline: Arc<ImagePipeline<Box<dyn OcrBackend>>>,
    pub receipt: Arc<ReceiptOptions>,
    pub max_upload_bytes: usize,
}

impl AppState {
    pub fn new<R: OcrBackend + 'static>(recognizer: R, config: &ServerConfig) -> Self {
        let backend: Box<dyn OcrBackend> = Box::new(recognizer);
        Self {
            pipeline: Arc::new(ImagePipeline::new(backend).with_max_side(config.ocr.max_side)),
            receipt: Arc::new(config.receipt.clone()),
            max_upload_bytes: config.max_upload_bytes,
        }
    }
}

pub fn router(state: AppState) -> Router {
    let limit = state.max_upload_bytes;
    Router::new()
        .route("/api/health", get(routes::health))
        .route("/api/upload", post(routes::upload))
        .route("/api/generate", post(routes::generate))
        .layer(DefaultBodyLimit::disable())
        .layer(RequestBodyLimitLayer::new(limit))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

// ── Tests ─────────────────────────────────────────────────────────────────────
