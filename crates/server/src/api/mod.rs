pub mod albums;
pub mod player;

use axum::{
    extract::DefaultBodyLimit,
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use common::{Album, Song};

use crate::catalog::current_albums;
use crate::state::{AppState, ErrorResponse, HealthResponse};
use crate::utils::json_error;

pub fn api_router(state: AppState) -> Router {
    let albums = Router::new()
        .route(
            "/albums",
            get(albums::list_albums).post(albums::upload_album_file),
        )
        .layer(DefaultBodyLimit::max(state.config.max_upload_bytes));

    let player = Router::new()
        .route("/player", get(player::get_player))
        .route("/player/select", post(player::select_song))
        .route("/player/current", post(player::set_current_song))
        .route("/player/playlist", post(player::set_playlist))
        .route("/player/play", post(player::play))
        .route("/player/pause", post(player::pause))
        .route("/player/next", post(player::next_song))
        .route("/player/previous", post(player::previous_song))
        .route("/player/volume", post(player::set_volume));

    Router::new()
        .route("/health", get(health))
        .merge(albums)
        .merge(player)
        .with_state(state)
}

async fn health() -> impl IntoResponse {
    Json(HealthResponse { status: "ok" })
}

pub(crate) async fn album_or_json_error(
    state: &AppState,
    album_id: &str,
) -> Result<Album, (StatusCode, Json<ErrorResponse>)> {
    let albums = current_albums(state).await;
    library::find_album(&albums, album_id)
        .cloned()
        .ok_or_else(|| json_error(StatusCode::NOT_FOUND, "album not found"))
}

pub(crate) async fn song_or_json_error(
    state: &AppState,
    song_id: &str,
) -> Result<Song, (StatusCode, Json<ErrorResponse>)> {
    let albums = current_albums(state).await;
    library::find_song(&albums, song_id)
        .cloned()
        .ok_or_else(|| json_error(StatusCode::NOT_FOUND, "song not found"))
}
