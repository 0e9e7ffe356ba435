use std::io::SeekFrom;

use axum::{
    body::Body,
    extract::{Path as AxumPath, State},
    http::{header, HeaderMap, HeaderValue, StatusCode},
    response::Response,
};
use tokio::io::{AsyncReadExt, AsyncSeekExt};
use tokio_util::io::ReaderStream;
use tracing::warn;

use crate::range::{parse_range_header, RangeError};
use crate::state::AppState;
use crate::utils::json_error_response;

/// Streams an object from the local backend, honouring a single `Range`.
pub async fn get_blob(
    State(state): State<AppState>,
    AxumPath(name): AxumPath<String>,
    headers: HeaderMap,
) -> Response {
    let Some(store) = state.store.as_ref().and_then(|store| store.as_local()) else {
        return json_error_response(StatusCode::NOT_FOUND, "blob not found");
    };
    let path = match store.resolve(&name) {
        Ok(path) => path,
        Err(_) => return json_error_response(StatusCode::NOT_FOUND, "blob not found"),
    };
    let mut file = match tokio::fs::File::open(&path).await {
        Ok(file) => file,
        Err(_) => return json_error_response(StatusCode::NOT_FOUND, "blob not found"),
    };
    let size = match file.metadata().await {
        Ok(meta) if meta.is_file() => meta.len(),
        Ok(_) => return json_error_response(StatusCode::NOT_FOUND, "blob not found"),
        Err(err) => {
            warn!("Failed to stat {}: {}", path.display(), err);
            return json_error_response(StatusCode::INTERNAL_SERVER_ERROR, "failed to read blob");
        }
    };
    let mime = mime_guess::from_path(&path).first_or_octet_stream().to_string();

    let requested = headers
        .get(header::RANGE)
        .and_then(|value| value.to_str().ok())
        .map(|value| parse_range_header(value, size));

    let (status, body, length, content_range) = match requested {
        Some(Err(RangeError::Unsatisfiable)) => {
            let mut response = Response::new(Body::empty());
            *response.status_mut() = StatusCode::RANGE_NOT_SATISFIABLE;
            insert_header(&mut response, header::CONTENT_RANGE, &format!("bytes */{}", size));
            return response;
        }
        Some(Ok(range)) => {
            if let Err(err) = file.seek(SeekFrom::Start(range.start)).await {
                warn!("Failed to seek {}: {}", path.display(), err);
                return json_error_response(StatusCode::INTERNAL_SERVER_ERROR, "failed to read blob");
            }
            let body = Body::from_stream(ReaderStream::new(file.take(range.len())));
            (
                StatusCode::PARTIAL_CONTENT,
                body,
                range.len(),
                Some(range.content_range(size)),
            )
        }
        Some(Err(RangeError::Invalid)) | None => {
            (StatusCode::OK, Body::from_stream(ReaderStream::new(file)), size, None)
        }
    };

    let mut response = Response::new(body);
    *response.status_mut() = status;
    insert_header(&mut response, header::CONTENT_TYPE, &mime);
    insert_header(&mut response, header::CONTENT_LENGTH, &length.to_string());
    response
        .headers_mut()
        .insert(header::ACCEPT_RANGES, HeaderValue::from_static("bytes"));
    if let Some(content_range) = content_range {
        insert_header(&mut response, header::CONTENT_RANGE, &content_range);
    }
    response
}

fn insert_header(response: &mut Response, name: header::HeaderName, value: &str) {
    if let Ok(value) = HeaderValue::from_str(value) {
        response.headers_mut().insert(name, value);
    }
}

#[cfg(test)]
mod tests {
    use axum::body::{to_bytes, Body};
    use axum::http::{header, Request, StatusCode};
    use tower::ServiceExt;

    use crate::test_support::{local_state, sample_state};

    #[tokio::test]
    async fn serves_whole_object() {
        let (state, dir) = local_state();
        std::fs::write(dir.path().join("A-B-1999-Song.mp3"), b"0123456789").unwrap();

        let response = crate::app_router(state)
            .oneshot(Request::get("/blobs/A-B-1999-Song.mp3").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()[header::CONTENT_TYPE], "audio/mpeg");
        assert_eq!(response.headers()[header::ACCEPT_RANGES], "bytes");
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert_eq!(&body[..], b"0123456789");
    }

    #[tokio::test]
    async fn serves_requested_range() {
        let (state, dir) = local_state();
        std::fs::create_dir_all(dir.path().join("nested")).unwrap();
        std::fs::write(dir.path().join("nested").join("My Song.mp3"), b"0123456789").unwrap();

        let request = Request::get("/blobs/nested/My%20Song.mp3")
            .header(header::RANGE, "bytes=2-5")
            .body(Body::empty())
            .unwrap();
        let response = crate::app_router(state).oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::PARTIAL_CONTENT);
        assert_eq!(response.headers()[header::CONTENT_RANGE], "bytes 2-5/10");
        assert_eq!(response.headers()[header::CONTENT_LENGTH], "4");
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert_eq!(&body[..], b"2345");
    }

    #[tokio::test]
    async fn rejects_unsatisfiable_range() {
        let (state, dir) = local_state();
        std::fs::write(dir.path().join("short.mp3"), b"abc").unwrap();

        let request = Request::get("/blobs/short.mp3")
            .header(header::RANGE, "bytes=10-")
            .body(Body::empty())
            .unwrap();
        let response = crate::app_router(state).oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::RANGE_NOT_SATISFIABLE);
        assert_eq!(response.headers()[header::CONTENT_RANGE], "bytes */3");
    }

    #[tokio::test]
    async fn missing_or_unconfigured_is_not_found() {
        let (state, _dir) = local_state();
        let response = crate::app_router(state)
            .oneshot(Request::get("/blobs/absent.mp3").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let response = crate::app_router(sample_state())
            .oneshot(Request::get("/blobs/absent.mp3").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
