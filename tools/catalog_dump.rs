use std::env;
use std::path::PathBuf;
use std::time::Duration;

use blobstore::{BlobStore, LocalBlobStore, RemoteBlobStore, DEFAULT_API_URL};
use library::group_objects_now;
use reqwest::Client;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Lists a blob store and prints the album grouping as JSON, including the
/// objects that were skipped. Takes a directory argument, falling back to
/// `ERAS_BLOB_ROOT`, then to the remote store when `BLOB_READ_WRITE_TOKEN`
/// is set.
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into());
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let root = env::args()
        .nth(1)
        .or_else(|| env::var("ERAS_BLOB_ROOT").ok())
        .filter(|value| !value.trim().is_empty());
    let token = env::var("BLOB_READ_WRITE_TOKEN")
        .ok()
        .filter(|value| !value.trim().is_empty());

    let store = match (root, token) {
        (Some(root), _) => {
            BlobStore::Local(LocalBlobStore::new(PathBuf::from(root), "http://localhost:3000")?)
        }
        (None, Some(token)) => BlobStore::Remote(RemoteBlobStore::new(
            Client::new(),
            DEFAULT_API_URL,
            token,
            Duration::from_secs(15),
        )?),
        (None, None) => return Err("ERAS_BLOB_ROOT not set and no path argument".into()),
    };

    let objects = store.list().await?;
    let catalog = group_objects_now(&objects);
    info!(
        "Grouped {} object(s) from {} storage: {} albums, {} songs, {} skipped",
        objects.len(),
        store.kind(),
        catalog.albums.len(),
        catalog.song_count(),
        catalog.skipped.len()
    );
    println!("{}", serde_json::to_string_pretty(&catalog)?);
    Ok(())
}
