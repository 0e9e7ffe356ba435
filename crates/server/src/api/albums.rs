use axum::{
    extract::{multipart::MultipartRejection, Multipart, State},
    http::StatusCode,
    Json,
};
use blobstore::BlobError;
use bytes::Bytes;
use common::Album;
use tracing::{error, info};

use crate::catalog::refresh_albums;
use crate::state::{AppState, ErrorResponse, JsonResult, UploadResponse};
use crate::utils::json_error;

const FILE_FIELD: &str = "file";

/// Always answers with albums; storage trouble falls back to the sample set.
pub async fn list_albums(State(state): State<AppState>) -> Json<Vec<Album>> {
    Json(refresh_albums(&state).await)
}

pub async fn upload_album_file(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> JsonResult<UploadResponse> {
    let Some(store) = state.store.as_ref() else {
        return Err(json_error(
            StatusCode::INTERNAL_SERVER_ERROR,
            "Blob storage not configured",
        ));
    };
    let mut multipart = multipart.map_err(|err| {
        json_error(StatusCode::BAD_REQUEST, format!("invalid upload: {}", err.body_text()))
    })?;

    let Some((name, data)) = read_file_field(&mut multipart).await? else {
        return Err(json_error(StatusCode::BAD_REQUEST, "No file provided"));
    };

    match store.put(&name, data).await {
        Ok(url) => {
            info!("Uploaded {} to {} blob storage", name, store.kind());
            Ok(Json(UploadResponse { url }))
        }
        Err(BlobError::InvalidName(name)) => Err(json_error(
            StatusCode::BAD_REQUEST,
            format!("invalid file name: {}", name),
        )),
        Err(err) => {
            error!("Error uploading {}: {}", name, err);
            Err(json_error(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to upload file",
            ))
        }
    }
}

/// First `file` part that carries a filename.
async fn read_file_field(
    multipart: &mut Multipart,
) -> Result<Option<(String, Bytes)>, (StatusCode, Json<ErrorResponse>)> {
    loop {
        let field = multipart.next_field().await.map_err(|err| {
            json_error(err.status(), format!("invalid upload: {}", err.body_text()))
        })?;
        let Some(field) = field else {
            return Ok(None);
        };
        if field.name() != Some(FILE_FIELD) {
            continue;
        }
        let name = field
            .file_name()
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .map(str::to_string);
        let Some(name) = name else {
            continue;
        };
        let data = field.bytes().await.map_err(|err| {
            json_error(err.status(), format!("invalid upload: {}", err.body_text()))
        })?;
        return Ok(Some((name, data)));
    }
}
