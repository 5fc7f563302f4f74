//! Integration tests for oco-ix API endpoints
//!
//! Each test builds a small corpus in a temp directory and drives the
//! router directly with `oneshot`.

use std::fs;

use axum::{
    body::Body,
    http::{Request, StatusCode},
};
use oco_common::config::OcoConfig;
use oco_common::spans::SpanStore;
use oco_common::Annotations;
use oco_ix::{build_router, AppState};
use serde_json::Value;
use tempfile::TempDir;
use tower::util::ServiceExt; // for `oneshot` method

/// Test helper: corpus with one media file and default metadata files
fn setup_corpus() -> TempDir {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path();
    fs::create_dir_all(root.join("data/spk1")).unwrap();

    fs::write(root.join("data/spk1/a.wav"), b"RIFF").unwrap();
    fs::write(
        root.join("data/alignments"),
        "spk1/a.wav sil a b\nspk1/empty.wav\n",
    )
    .unwrap();
    fs::write(root.join("data/pitch"), "spk1/a.wav 100 ? 120\n").unwrap();
    fs::write(root.join("data/text.stress"), "spk1/a.wav\thello there\n").unwrap();
    dir
}

/// Test helper: router over the corpus at `dir`
fn setup_app(dir: &TempDir) -> axum::Router {
    let config = OcoConfig::with_root(dir.path());
    let state = AppState::new(
        Annotations::from_config(&config),
        SpanStore::new(dir.path()),
    );
    build_router(state)
}

fn test_request(method: &str, uri: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

async fn body_bytes(body: Body) -> Vec<u8> {
    axum::body::to_bytes(body, usize::MAX)
        .await
        .expect("Should read body")
        .to_vec()
}

async fn extract_json(body: Body) -> Value {
    serde_json::from_slice(&body_bytes(body).await).expect("Should parse JSON")
}

// =============================================================================
// Service endpoints
// =============================================================================

#[tokio::test]
async fn test_health_endpoint() {
    let dir = setup_corpus();
    let app = setup_app(&dir);

    let response = app.oneshot(test_request("GET", "/health")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = extract_json(response.into_body()).await;
    assert_eq!(body["status"], "ok");
    assert_eq!(body["module"], "oco-ix");
    assert!(body["version"].is_string());
    assert_eq!(body["cached_indexes"], 0);
}

#[tokio::test]
async fn test_buildinfo_endpoint() {
    let dir = setup_corpus();
    let app = setup_app(&dir);

    let response = app
        .oneshot(test_request("GET", "/api/buildinfo"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = extract_json(response.into_body()).await;
    assert!(body["git_hash"].is_string());
    assert!(body["build_profile"].is_string());
}

// =============================================================================
// Viewer parameters
// =============================================================================

#[tokio::test]
async fn test_params_for_existing_media() {
    let dir = setup_corpus();
    let app = setup_app(&dir);

    let response = app
        .oneshot(test_request("GET", "/wav/data/spk1/a.wav/params.json"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = extract_json(response.into_body()).await;
    assert_eq!(body["filelist"][0], "/file/data/spk1/a.wav");
    assert_eq!(body["tracksAndWords"][0]["speaker"], "spk1");
    assert_eq!(
        body["tracksAndWords"][0]["words"],
        "/wav/data/spk1/a.wav/alignment.seg.json"
    );
    assert_eq!(body["pitch"]["url"], "/wav/data/spk1/a.wav/pitch.json");
}

#[tokio::test]
async fn test_params_missing_media_is_404() {
    let dir = setup_corpus();
    let app = setup_app(&dir);

    let response = app
        .oneshot(test_request("GET", "/wav/data/spk1/nope.wav/params.json"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let body = extract_json(response.into_body()).await;
    assert_eq!(body["error"], "File not found");
}

// =============================================================================
// Alignment and pitch
// =============================================================================

#[tokio::test]
async fn test_alignment_segments() {
    let dir = setup_corpus();
    let app = setup_app(&dir);

    let response = app
        .oneshot(test_request("GET", "/wav/data/spk1/a.wav/alignment.seg.json"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = extract_json(response.into_body()).await;
    let segments = body.as_array().unwrap();
    assert_eq!(segments.len(), 3);
    assert_eq!(segments[0]["name"], "sil");
    assert_eq!(segments[2]["name"], "b");
    let end = segments[2]["interval"][1].as_f64().unwrap();
    assert!((end - 0.03).abs() < 1e-9);
}

#[tokio::test]
async fn test_alignment_empty_vs_absent() {
    let dir = setup_corpus();

    let response = setup_app(&dir)
        .oneshot(test_request("GET", "/wav/data/spk1/empty.wav/alignment.seg.json"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(extract_json(response.into_body()).await, serde_json::json!([]));

    let response = setup_app(&dir)
        .oneshot(test_request("GET", "/wav/data/spk1/zzz.wav/alignment.seg.json"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body = extract_json(response.into_body()).await;
    assert_eq!(body["error"], "Alignment not found");
}

#[tokio::test]
async fn test_pitch_contour_with_default_hop() {
    let dir = setup_corpus();
    let app = setup_app(&dir);

    // Not a decodable WAV, so no duration is known
    let response = app
        .oneshot(test_request("GET", "/wav/data/spk1/a.wav/pitch.json"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = extract_json(response.into_body()).await;
    assert_eq!(body["hop"], 0.01);
    assert_eq!(body["values"], serde_json::json!([100.0, 0.0, 120.0]));
    assert!(body.get("periodicity").is_none());
}

#[tokio::test]
async fn test_pitch_absent_is_404() {
    let dir = setup_corpus();
    let app = setup_app(&dir);

    let response = app
        .oneshot(test_request("GET", "/wav/data/spk1/empty.wav/pitch.json"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_pitch_key_only_line_is_empty_contour() {
    let dir = setup_corpus();
    fs::write(dir.path().join("data/pitch"), "spk1/a.wav\n").unwrap();
    let app = setup_app(&dir);

    let response = app
        .oneshot(test_request("GET", "/wav/data/spk1/a.wav/pitch.json"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = extract_json(response.into_body()).await;
    assert_eq!(body, serde_json::json!({"hop": 0.01, "values": []}));
}

#[tokio::test]
async fn test_pitch_non_finite_fields_become_zero() {
    let dir = setup_corpus();
    fs::write(dir.path().join("data/pitch"), "spk1/a.wav 100 nan inf 120\n").unwrap();
    let app = setup_app(&dir);

    let response = app
        .oneshot(test_request("GET", "/wav/data/spk1/a.wav/pitch.json"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = extract_json(response.into_body()).await;
    assert_eq!(body["values"], serde_json::json!([100.0, 0.0, 0.0, 120.0]));
}

#[tokio::test]
async fn test_pitch_periodicity_from_directory_override() {
    let dir = setup_corpus();
    fs::write(
        dir.path().join("data/spk1/pitch_periodicity.txt"),
        "a.wav 0.5 0.6 0.7\n",
    )
    .unwrap();
    let app = setup_app(&dir);

    let response = app
        .oneshot(test_request("GET", "/wav/data/spk1/a.wav/pitch.json"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = extract_json(response.into_body()).await;
    assert_eq!(body["periodicity"], serde_json::json!([0.5, 0.6, 0.7]));
}

#[tokio::test]
async fn test_text_payload() {
    let dir = setup_corpus();

    let response = setup_app(&dir)
        .oneshot(test_request("GET", "/wav/data/spk1/a.wav/text.json"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = extract_json(response.into_body()).await;
    assert_eq!(body["text"], "hello there");
    assert_eq!(body["words"].as_array().unwrap().len(), 2);
    assert_eq!(body["words"][1]["name"], "there");

    let response = setup_app(&dir)
        .oneshot(test_request("GET", "/wav/data/spk1/zzz.wav/text.json"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

// =============================================================================
// Request validation
// =============================================================================

#[tokio::test]
async fn test_unknown_resource_is_404() {
    let dir = setup_corpus();
    let app = setup_app(&dir);

    let response = app
        .oneshot(test_request("GET", "/wav/data/spk1/a.wav/other.json"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_traversal_key_is_400() {
    let dir = setup_corpus();
    let app = setup_app(&dir);

    let response = app
        .oneshot(test_request("GET", "/wav/data/../secret.wav/params.json"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body = extract_json(response.into_body()).await;
    assert!(body["error"].as_str().unwrap().contains("invalid media key"));
}

// =============================================================================
// Spans
// =============================================================================

#[tokio::test]
async fn test_spans_default_to_empty_list() {
    let dir = setup_corpus();
    let app = setup_app(&dir);

    let response = app
        .oneshot(test_request("GET", "/spans/data/spk1/a.wav"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers().get("content-type").unwrap(),
        "application/json"
    );
    assert_eq!(body_bytes(response.into_body()).await, b"[]".to_vec());
}

#[tokio::test]
async fn test_spans_put_then_get() {
    let dir = setup_corpus();
    let blob = r#"[{"start":0.1,"end":0.4,"label":"x"}]"#;

    let request = Request::builder()
        .method("POST")
        .uri("/wav/data/spk1/a.wav")
        .body(Body::from(blob))
        .unwrap();
    let response = setup_app(&dir).oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert!(dir.path().join("data/spk1/a.spans").is_file());

    let response = setup_app(&dir)
        .oneshot(test_request("GET", "/spans/data/spk1/a.wav"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_bytes(response.into_body()).await, blob.as_bytes().to_vec());
}

#[tokio::test]
async fn test_spans_over_configured_limit_rejected() {
    let dir = setup_corpus();
    let config = OcoConfig::with_root(dir.path());
    let state = AppState::new(
        Annotations::from_config(&config),
        SpanStore::new(dir.path()),
    )
    .with_max_span_bytes(16);

    let request = Request::builder()
        .method("POST")
        .uri("/wav/data/spk1/a.wav")
        .body(Body::from(vec![b'x'; 64]))
        .unwrap();
    let response = build_router(state.clone()).oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
    assert!(!dir.path().join("data/spk1/a.spans").exists());

    let request = Request::builder()
        .method("POST")
        .uri("/wav/data/spk1/a.wav")
        .body(Body::from("[1,2]"))
        .unwrap();
    let response = build_router(state).oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_spans_put_creates_directories() {
    let dir = setup_corpus();

    let request = Request::builder()
        .method("POST")
        .uri("/wav/data/new_speaker/b.wav")
        .body(Body::from("[]"))
        .unwrap();
    let response = setup_app(&dir).oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert!(dir.path().join("data/new_speaker/b.spans").is_file());
}
