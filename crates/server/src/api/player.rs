use axum::{extract::State, http::StatusCode, Json};
use player::PlayerSnapshot;

use crate::state::{
    AppState, CurrentSongRequest, JsonResult, PlaylistRequest, SelectSongRequest, VolumeRequest,
};
use crate::utils::json_error;

use super::{album_or_json_error, song_or_json_error};

fn snapshot(state: &AppState) -> Json<PlayerSnapshot> {
    Json(state.player.read().snapshot())
}

pub async fn get_player(State(state): State<AppState>) -> Json<PlayerSnapshot> {
    snapshot(&state)
}

pub async fn select_song(
    State(state): State<AppState>,
    Json(payload): Json<SelectSongRequest>,
) -> JsonResult<PlayerSnapshot> {
    let album = album_or_json_error(&state, &payload.album_id).await?;
    let song = album
        .find_song(&payload.song_id)
        .cloned()
        .ok_or_else(|| json_error(StatusCode::NOT_FOUND, "song not found"))?;
    state.player.write().select_from_album(song, album.songs);
    Ok(snapshot(&state))
}

pub async fn set_current_song(
    State(state): State<AppState>,
    Json(payload): Json<CurrentSongRequest>,
) -> JsonResult<PlayerSnapshot> {
    let song = song_or_json_error(&state, &payload.song_id).await?;
    state.player.write().set_current_song(song);
    Ok(snapshot(&state))
}

pub async fn set_playlist(
    State(state): State<AppState>,
    Json(payload): Json<PlaylistRequest>,
) -> JsonResult<PlayerSnapshot> {
    let songs = match (payload.album_id, payload.song_ids) {
        (Some(album_id), None) => album_or_json_error(&state, &album_id).await?.songs,
        (None, Some(song_ids)) => {
            let mut songs = Vec::with_capacity(song_ids.len());
            for song_id in song_ids {
                songs.push(song_or_json_error(&state, &song_id).await?);
            }
            songs
        }
        _ => {
            return Err(json_error(
                StatusCode::BAD_REQUEST,
                "expected exactly one of albumId or songIds",
            ))
        }
    };
    state.player.write().set_playlist(songs);
    Ok(snapshot(&state))
}

pub async fn play(State(state): State<AppState>) -> Json<PlayerSnapshot> {
    state.player.write().play();
    snapshot(&state)
}

pub async fn pause(State(state): State<AppState>) -> Json<PlayerSnapshot> {
    state.player.write().pause();
    snapshot(&state)
}

pub async fn next_song(State(state): State<AppState>) -> Json<PlayerSnapshot> {
    state.player.write().next_song();
    snapshot(&state)
}

pub async fn previous_song(State(state): State<AppState>) -> Json<PlayerSnapshot> {
    state.player.write().previous_song();
    snapshot(&state)
}

pub async fn set_volume(
    State(state): State<AppState>,
    Json(payload): Json<VolumeRequest>,
) -> Json<PlayerSnapshot> {
    state.player.write().set_volume(payload.volume);
    snapshot(&state)
}

#[cfg(test)]
mod tests {
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use serde_json::{json, Value};

    use crate::test_support::{json_request, local_state, sample_state, send};

    async fn albums(app: &axum::Router) -> Value {
        let (_, json) = send(app, Request::get("/api/albums").body(Body::empty()).unwrap()).await;
        json
    }

    #[tokio::test]
    async fn starts_empty() {
        let app = crate::app_router(sample_state());
        let (status, json) = send(&app, Request::get("/api/player").body(Body::empty()).unwrap()).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["currentIndex"], -1);
        assert_eq!(json["isPlaying"], false);
        assert_eq!(json["volume"], 1.0);
        assert!(json["currentSong"].is_null());
    }

    #[tokio::test]
    async fn select_queues_album_and_walks_it() {
        let app = crate::app_router(sample_state());
        let catalog = albums(&app).await;
        let album = &catalog[0];
        let first = album["songs"][0]["id"].as_str().unwrap();
        let second = album["songs"][1]["id"].as_str().unwrap();

        let body = json!({ "albumId": album["id"], "songId": first });
        let (status, json) = send(&app, json_request("/api/player/select", body.clone())).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["currentIndex"], 0);
        assert_eq!(json["isPlaying"], true);
        assert_eq!(json["playlist"].as_array().map(|p| p.len()), Some(2));

        let (_, json) = send(&app, json_request("/api/player/next", json!({}))).await;
        assert_eq!(json["currentSong"]["id"], second);
        assert_eq!(json["currentIndex"], 1);

        let (_, json) = send(&app, json_request("/api/player/next", json!({}))).await;
        assert_eq!(json["currentIndex"], 1);

        let (_, json) = send(&app, json_request("/api/player/previous", json!({}))).await;
        assert_eq!(json["currentSong"]["id"], first);

        let (_, json) = send(&app, json_request("/api/player/select", body)).await;
        assert_eq!(json["isPlaying"], false);
    }

    #[tokio::test]
    async fn reselect_after_relisting_pauses() {
        let (state, dir) = local_state();
        std::fs::write(dir.path().join("A-B-1999-One.mp3"), b"1").unwrap();
        std::fs::write(dir.path().join("A-B-1999-Two.mp3"), b"2").unwrap();
        let app = crate::app_router(state);

        let catalog = albums(&app).await;
        let body = json!({ "albumId": catalog[0]["id"], "songId": catalog[0]["songs"][0]["id"] });
        let (_, json) = send(&app, json_request("/api/player/select", body.clone())).await;
        assert_eq!(json["isPlaying"], true);

        std::fs::write(dir.path().join("C-D-2001-New.mp3"), b"3").unwrap();
        let relisted = albums(&app).await;
        assert_eq!(relisted.as_array().map(|a| a.len()), Some(2));
        assert_eq!(relisted[0]["id"], catalog[0]["id"]);
        assert_eq!(relisted[0]["songs"][0]["id"], catalog[0]["songs"][0]["id"]);

        let (status, json) = send(&app, json_request("/api/player/select", body)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["isPlaying"], false);
        assert_eq!(json["currentIndex"], 0);
    }

    #[tokio::test]
    async fn current_song_outside_playlist() {
        let app = crate::app_router(sample_state());
        let catalog = albums(&app).await;
        let (_, json) = send(
            &app,
            json_request("/api/player/playlist", json!({ "albumId": catalog[0]["id"] })),
        )
        .await;
        assert_eq!(json["currentIndex"], 0);
        assert!(json["currentSong"].is_null());

        let retro = catalog[1]["songs"][0]["id"].clone();
        let (status, json) =
            send(&app, json_request("/api/player/current", json!({ "songId": retro }))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["currentIndex"], -1);
        assert_eq!(json["currentSong"]["id"], retro);

        let (_, json) = send(&app, json_request("/api/player/next", json!({}))).await;
        assert_eq!(json["currentIndex"], 0);
        assert_eq!(json["currentSong"]["id"], catalog[0]["songs"][0]["id"]);
        assert_eq!(json["isPlaying"], true);
    }

    #[tokio::test]
    async fn transport_and_volume() {
        let app = crate::app_router(sample_state());
        let (_, json) = send(&app, json_request("/api/player/play", json!({}))).await;
        assert_eq!(json["isPlaying"], true);
        let (_, json) = send(&app, json_request("/api/player/pause", json!({}))).await;
        assert_eq!(json["isPlaying"], false);
        let (_, json) = send(&app, json_request("/api/player/volume", json!({ "volume": 0.5 }))).await;
        assert_eq!(json["volume"], 0.5);
    }

    #[tokio::test]
    async fn unknown_ids_are_not_found() {
        let app = crate::app_router(sample_state());
        let (status, json) = send(
            &app,
            json_request("/api/player/select", json!({ "albumId": "nope", "songId": "nope" })),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(json["error"], "album not found");

        let (status, _) =
            send(&app, json_request("/api/player/current", json!({ "songId": "nope" }))).await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, _) = send(&app, json_request("/api/player/playlist", json!({}))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }
}
