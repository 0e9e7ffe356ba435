use std::path::{Path, PathBuf};

use bytes::Bytes;
use common::StoredObject;
use reqwest::Url;
use tracing::info;
use walkdir::WalkDir;

use crate::{segments, validate_name, BlobError};

/// Objects kept as files under a directory and served back over HTTP at
/// `{base_url}/blobs/{name}`.
#[derive(Clone, Debug)]
pub struct LocalBlobStore {
    root: PathBuf,
    base_url: Url,
}

impl LocalBlobStore {
    pub fn new(root: PathBuf, base_url: &str) -> Result<Self, BlobError> {
        let base_url = Url::parse(base_url.trim())
            .map_err(|err| BlobError::Url(format!("{}: {}", base_url, err)))?;
        if base_url.cannot_be_a_base() {
            return Err(BlobError::Url(format!("cannot be a base: {}", base_url)));
        }
        Ok(Self { root, base_url })
    }

    pub async fn list(&self) -> Result<Vec<StoredObject>, BlobError> {
        let root = self.root.clone();
        let names = tokio::task::spawn_blocking(move || walk_names(&root))
            .await
            .map_err(|err| BlobError::Io(std::io::Error::other(err)))??;

        names
            .into_iter()
            .map(|name| {
                let url = self.url_for(&name)?;
                Ok(StoredObject::new(name, url))
            })
            .collect()
    }

    pub async fn put(&self, name: &str, data: Bytes) -> Result<String, BlobError> {
        let path = self.resolve(name)?;
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(&path, &data).await?;
        info!("Stored {} ({} bytes)", name, data.len());
        self.url_for(name)
    }

    /// Filesystem path for an object name, rejecting names that would leave
    /// the root.
    pub fn resolve(&self, name: &str) -> Result<PathBuf, BlobError> {
        validate_name(name)?;
        let mut path = self.root.clone();
        for segment in segments(name) {
            path.push(segment);
        }
        Ok(path)
    }

    pub fn url_for(&self, name: &str) -> Result<String, BlobError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| BlobError::Url(format!("cannot be a base: {}", self.base_url)))?
            .pop_if_empty()
            .push("blobs")
            .extend(segments(name));
        Ok(url.to_string())
    }
}

fn walk_names(root: &Path) -> Result<Vec<String>, BlobError> {
    if !root.is_dir() {
        return Err(BlobError::Io(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            format!("blob root not found: {}", root.display()),
        )));
    }

    let mut names = Vec::new();
    let walker = WalkDir::new(root)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|entry| entry.depth() == 0 || !is_hidden(entry.file_name()));
    for entry in walker {
        let entry = entry?;
        if !entry.file_type().is_file() {
            continue;
        }
        let Ok(rel) = entry.path().strip_prefix(root) else {
            continue;
        };
        let parts: Vec<String> = rel
            .components()
            .map(|c| c.as_os_str().to_string_lossy().to_string())
            .collect();
        names.push(parts.join("/"));
    }
    Ok(names)
}

fn is_hidden(name: &std::ffi::OsStr) -> bool {
    name.to_string_lossy().starts_with('.')
}
