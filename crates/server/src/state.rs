use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use axum::http::StatusCode;
use axum::Json;
use blobstore::{BlobError, BlobStore, LocalBlobStore, RemoteBlobStore};
use common::Album;
use parking_lot::RwLock;
use player::PlayerState;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::config::{ServerConfig, StorageBackend};

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<ServerConfig>,
    /// `None` when no storage backend is configured.
    pub store: Option<BlobStore>,
    /// Albums from the most recent listing; player and album pages resolve ids
    /// against it.
    pub catalog: Arc<RwLock<Vec<Album>>>,
    pub player: Arc<RwLock<PlayerState>>,
    pub web_root: PathBuf,
}

impl AppState {
    pub fn new(config: ServerConfig, store: Option<BlobStore>, web_root: PathBuf) -> Self {
        Self {
            config: Arc::new(config),
            store,
            catalog: Arc::new(RwLock::new(Vec::new())),
            player: Arc::new(RwLock::new(PlayerState::new())),
            web_root,
        }
    }
}

pub fn open_blob_store(
    backend: &StorageBackend,
    config: &ServerConfig,
    client: Client,
) -> Result<Option<BlobStore>, BlobError> {
    let store = match backend {
        StorageBackend::Unconfigured => None,
        StorageBackend::Local(root) => Some(BlobStore::Local(LocalBlobStore::new(
            root.clone(),
            &config.public_url(),
        )?)),
        StorageBackend::Remote { api_url, token } => Some(BlobStore::Remote(RemoteBlobStore::new(
            client,
            api_url,
            token.clone(),
            Duration::from_secs(config.blob_timeout_secs.max(1)),
        )?)),
    };
    Ok(store)
}

#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
}

#[derive(Serialize)]
pub struct UploadResponse {
    pub url: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SelectSongRequest {
    pub album_id: String,
    pub song_id: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CurrentSongRequest {
    pub song_id: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaylistRequest {
    pub album_id: Option<String>,
    pub song_ids: Option<Vec<String>>,
}

#[derive(Debug, Deserialize)]
pub struct VolumeRequest {
    pub volume: f64,
}

pub type JsonResult<T> = Result<Json<T>, (StatusCode, Json<ErrorResponse>)>;
