use std::path::PathBuf;

use axum::body::{to_bytes, Body};
use axum::http::{header, Request, StatusCode};
use axum::Router;
use blobstore::{BlobStore, LocalBlobStore};
use serde_json::Value;
use tempfile::TempDir;
use tower::ServiceExt;

use crate::config::ServerConfig;
use crate::state::AppState;

const BOUNDARY: &str = "eras-test-boundary";

fn web_root() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("web")
}

/// No storage configured: listings fall back to the sample albums.
pub fn sample_state() -> AppState {
    AppState::new(ServerConfig::default(), None, web_root())
}

/// Local storage rooted in a fresh temporary directory.
pub fn local_state() -> (AppState, TempDir) {
    let dir = tempfile::tempdir().unwrap();
    let store = LocalBlobStore::new(dir.path().to_path_buf(), "http://localhost:3000").unwrap();
    let state = AppState::new(
        ServerConfig::default(),
        Some(BlobStore::Local(store)),
        web_root(),
    );
    (state, dir)
}

pub async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let json = serde_json::from_slice(&body).unwrap_or(Value::Null);
    (status, json)
}

pub fn json_request(uri: &str, body: Value) -> Request<Body> {
    Request::post(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

pub fn multipart_request(
    uri: &str,
    field: &str,
    filename: Option<&str>,
    data: &[u8],
) -> Request<Body> {
    let disposition = match filename {
        Some(filename) => format!(
            "form-data; name=\"{}\"; filename=\"{}\"",
            field, filename
        ),
        None => format!("form-data; name=\"{}\"", field),
    };
    let mut body = Vec::new();
    body.extend_from_slice(format!("--{}\r\n", BOUNDARY).as_bytes());
    body.extend_from_slice(format!("Content-Disposition: {}\r\n", disposition).as_bytes());
    body.extend_from_slice(b"Content-Type: audio/mpeg\r\n\r\n");
    body.extend_from_slice(data);
    body.extend_from_slice(format!("\r\n--{}--\r\n", BOUNDARY).as_bytes());

    Request::post(uri)
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={}", BOUNDARY),
        )
        .body(Body::from(body))
        .unwrap()
}
