use common::Album;
use library::{carry_ids, group_objects_now, sample_albums};
use tracing::{info, warn};

use crate::state::AppState;

/// Lists storage and regroups it into albums, replacing the catalog snapshot.
/// Any storage problem, or a listing with no usable objects, yields the sample
/// albums instead.
///
/// Albums and songs still present keep the ids they had in the previous
/// snapshot.
pub async fn refresh_albums(state: &AppState) -> Vec<Album> {
    let mut albums = match &state.store {
        None => {
            info!("Blob storage not configured, using sample albums");
            sample_albums()
        }
        Some(store) => match store.list().await {
            Ok(objects) => {
                let catalog = group_objects_now(&objects);
                if !catalog.skipped.is_empty() {
                    warn!(
                        "{} of {} object(s) skipped: not named artist-album-year-title",
                        catalog.skipped.len(),
                        objects.len()
                    );
                }
                if catalog.albums.is_empty() {
                    info!("No albums in {} blob storage, using sample albums", store.kind());
                    sample_albums()
                } else {
                    catalog.albums
                }
            }
            Err(err) => {
                warn!("Failed to list {} blob storage: {}", store.kind(), err);
                sample_albums()
            }
        },
    };

    {
        let mut catalog = state.catalog.write();
        carry_ids(&catalog, &mut albums);
        *catalog = albums.clone();
    }
    albums
}

/// The last listing, listing storage first if nothing has been listed yet.
pub async fn current_albums(state: &AppState) -> Vec<Album> {
    let albums = state.catalog.read().clone();
    if albums.is_empty() {
        refresh_albums(state).await
    } else {
        albums
    }
}
