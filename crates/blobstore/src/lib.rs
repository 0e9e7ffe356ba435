mod local;
mod remote;

use bytes::Bytes;
use common::StoredObject;

pub use local::LocalBlobStore;
pub use remote::{RemoteBlobStore, DEFAULT_API_URL};

/// Storage backend holding the music objects.
#[derive(Clone, Debug)]
pub enum BlobStore {
    Local(LocalBlobStore),
    Remote(RemoteBlobStore),
}

impl BlobStore {
    pub async fn list(&self) -> Result<Vec<StoredObject>, BlobError> {
        match self {
            BlobStore::Local(store) => store.list().await,
            BlobStore::Remote(store) => store.list().await,
        }
    }

    /// Writes `data` under `name` as given and returns the public URL.
    pub async fn put(&self, name: &str, data: Bytes) -> Result<String, BlobError> {
        validate_name(name)?;
        match self {
            BlobStore::Local(store) => store.put(name, data).await,
            BlobStore::Remote(store) => store.put(name, data).await,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            BlobStore::Local(_) => "local",
            BlobStore::Remote(_) => "remote",
        }
    }

    pub fn as_local(&self) -> Option<&LocalBlobStore> {
        match self {
            BlobStore::Local(store) => Some(store),
            BlobStore::Remote(_) => None,
        }
    }
}

#[derive(Debug)]
pub enum BlobError {
    Io(std::io::Error),
    Http(reqwest::Error),
    Status(u16),
    InvalidName(String),
    Url(String),
}

impl std::fmt::Display for BlobError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BlobError::Io(err) => write!(f, "io error: {}", err),
            BlobError::Http(err) => write!(f, "http error: {}", err),
            BlobError::Status(status) => write!(f, "blob api returned http {}", status),
            BlobError::InvalidName(name) => write!(f, "invalid object name: {:?}", name),
            BlobError::Url(message) => write!(f, "url error: {}", message),
        }
    }
}

impl std::error::Error for BlobError {}

impl From<std::io::Error> for BlobError {
    fn from(err: std::io::Error) -> Self {
        BlobError::Io(err)
    }
}

impl From<reqwest::Error> for BlobError {
    fn from(err: reqwest::Error) -> Self {
        BlobError::Http(err)
    }
}

impl From<walkdir::Error> for BlobError {
    fn from(err: walkdir::Error) -> Self {
        BlobError::Io(err.into())
    }
}

/// Object names are relative slash-separated paths without empty, `.` or
/// `..` segments.
pub fn validate_name(name: &str) -> Result<(), BlobError> {
    let invalid = name.is_empty()
        || name.contains('\\')
        || name.contains('\0')
        || name
            .split('/')
            .any(|segment| segment.is_empty() || segment == "." || segment == "..");
    if invalid {
        Err(BlobError::InvalidName(name.to_string()))
    } else {
        Ok(())
    }
}

fn segments(name: &str) -> impl Iterator<Item = &str> {
    name.split('/').filter(|segment| !segment.is_empty())
}

#[cfg(test)]
mod tests {
    use super::{validate_name, BlobError};

    #[test]
    fn accepts_plain_and_nested_names() {
        assert!(validate_name("A-B-1999-Song.mp3").is_ok());
        assert!(validate_name("music/A-B-1999-Song.mp3").is_ok());
        assert!(validate_name("with space-x-2000-y.mp3").is_ok());
    }

    #[test]
    fn rejects_escaping_names() {
        for name in ["", "/abs.mp3", "../up.mp3", "a/../b.mp3", "a//b", "dir/", "a\\b", "./x"] {
            match validate_name(name) {
                Err(BlobError::InvalidName(value)) => assert_eq!(value, name),
                other => panic!("expected invalid name for {:?}, got {:?}", name, other),
            }
        }
    }
}
