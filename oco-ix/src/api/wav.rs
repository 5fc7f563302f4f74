//! Derived metadata endpoints under `/wav/<key>/...`
//!
//! The media key may itself contain slashes, so the route captures the
//! whole remainder and the resource is picked by suffix.

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    response::{IntoResponse, Response},
    Json,
};
use oco_common::MediaKey;

use crate::api::ApiError;
use crate::AppState;

/// Resource requested below a media key
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WavResource {
    Params,
    Alignment,
    Pitch,
    Text,
}

const RESOURCES: [(&str, WavResource); 4] = [
    ("/params.json", WavResource::Params),
    ("/alignment.seg.json", WavResource::Alignment),
    ("/pitch.json", WavResource::Pitch),
    ("/text.json", WavResource::Text),
];

/// Split `<key>/<resource>` into the media key part and the resource
pub fn split_resource(path: &str) -> Option<(&str, WavResource)> {
    RESOURCES.iter().find_map(|(suffix, resource)| {
        path.strip_suffix(suffix)
            .filter(|media| !media.is_empty())
            .map(|media| (media, *resource))
    })
}

/// GET /wav/*path
///
/// - `<key>/params.json`: viewer parameters, 404 if the media file is missing
/// - `<key>/alignment.seg.json`: fixed-width alignment segments
/// - `<key>/pitch.json`: pitch contour with hop and optional periodicity
/// - `<key>/text.json`: transcript label with evenly spaced words
pub async fn get_wav_resource(
    State(state): State<AppState>,
    Path(path): Path<String>,
) -> Result<Response, ApiError> {
    let (media, resource) = split_resource(&path)
        .ok_or_else(|| ApiError::NotFound(format!("No such resource: {}", path)))?;
    let key = MediaKey::parse(media)?;
    tracing::debug!(%key, ?resource, "Metadata request");

    let annotations = Arc::clone(&state.annotations);
    let response = tokio::task::spawn_blocking(move || -> Result<Response, ApiError> {
        match resource {
            WavResource::Params => annotations
                .params(&key)?
                .map(|params| Json(params).into_response())
                .ok_or_else(|| ApiError::NotFound("File not found".to_string())),
            WavResource::Alignment => annotations
                .alignment_segments(&key)?
                .map(|segments| Json(segments).into_response())
                .ok_or_else(|| ApiError::NotFound("Alignment not found".to_string())),
            WavResource::Pitch => annotations
                .pitch_payload(&key)?
                .map(|contour| Json(contour).into_response())
                .ok_or_else(|| ApiError::NotFound("Pitch not found".to_string())),
            WavResource::Text => annotations
                .text_payload(&key)
                .map(|text| Json(text).into_response())
                .ok_or_else(|| ApiError::NotFound("Text not found".to_string())),
        }
    })
    .await??;

    Ok(response)
}
