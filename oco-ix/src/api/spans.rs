//! Span storage endpoints
//!
//! Bodies are stored verbatim; reads of never-written spans return `[]`.

use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::{Path, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
};
use oco_common::MediaKey;

use crate::api::ApiError;
use crate::AppState;

/// POST /wav/*path
///
/// Replaces the stored spans for the media key with the request body.
pub async fn put_spans(
    State(state): State<AppState>,
    Path(path): Path<String>,
    body: Bytes,
) -> Result<StatusCode, ApiError> {
    let key = MediaKey::parse(&path)?;
    let spans = Arc::clone(&state.spans);
    tokio::task::spawn_blocking(move || spans.put(&key, &body)).await??;
    Ok(StatusCode::OK)
}

/// GET /spans/*path
pub async fn get_spans(
    State(state): State<AppState>,
    Path(path): Path<String>,
) -> Result<Response, ApiError> {
    let key = MediaKey::parse(&path)?;
    let spans = Arc::clone(&state.spans);
    let bytes = tokio::task::spawn_blocking(move || spans.get(&key)).await??;
    Ok(([(header::CONTENT_TYPE, "application/json")], bytes).into_response())
}
