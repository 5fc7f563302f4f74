//! oco-ix library - annotation metadata service
//!
//! Serves alignment segments, pitch contours and viewer parameters for
//! media items in a flat-file corpus, and stores client-authored spans.

use std::sync::Arc;

use axum::extract::DefaultBodyLimit;
use axum::Router;
use oco_common::config::DEFAULT_MAX_SPAN_BYTES;
use oco_common::spans::SpanStore;
use oco_common::Annotations;
use tower_http::trace::TraceLayer;

pub mod api;

/// Application state shared across HTTP handlers
#[derive(Clone)]
pub struct AppState {
    pub annotations: Arc<Annotations>,
    pub spans: Arc<SpanStore>,
    /// Span uploads above this size are rejected with 413
    pub max_span_bytes: usize,
}

impl AppState {
    pub fn new(annotations: Annotations, spans: SpanStore) -> Self {
        Self {
            annotations: Arc::new(annotations),
            spans: Arc::new(spans),
            max_span_bytes: DEFAULT_MAX_SPAN_BYTES,
        }
    }

    pub fn with_max_span_bytes(mut self, max_span_bytes: usize) -> Self {
        self.max_span_bytes = max_span_bytes;
        self
    }
}

/// Build application router
pub fn build_router(state: AppState) -> Router {
    use axum::routing::get;

    let body_limit = state.max_span_bytes;
    Router::new()
        .route(
            "/wav/*path",
            get(api::get_wav_resource).post(api::put_spans),
        )
        .route("/spans/*path", get(api::get_spans))
        .route("/api/buildinfo", get(api::get_build_info))
        .merge(api::health_routes())
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
