use axum::{
    extract::{Path as AxumPath, State},
    http::StatusCode,
    response::Response,
    routing::get,
    Router,
};
use common::Album;
use library::{albums_by_era, find_album};
use player::PlayerSnapshot;

use crate::catalog::{current_albums, refresh_albums};
use crate::state::AppState;
use crate::utils::{
    apply_template, escape_html, format_duration, html_response, load_template, url_escape,
};

pub fn pages_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(library_page))
        .route("/albums/:album_id", get(album_page))
        .with_state(state)
}

/// Album grid, one section per era that has albums.
pub async fn library_page(State(state): State<AppState>) -> Response {
    let albums = refresh_albums(&state).await;
    let content = if albums.is_empty() {
        load_template(&state, "templates/empty.html").unwrap_or_default()
    } else {
        render_eras(&state, &albums)
    };
    html_response(StatusCode::OK, render_page(&state, "Library", &content))
}

pub async fn album_page(
    State(state): State<AppState>,
    AxumPath(album_id): AxumPath<String>,
) -> Response {
    let albums = current_albums(&state).await;
    let Some(album) = find_album(&albums, &album_id) else {
        let content = format!(
            "<section class=\"missing\"><h2>Album not found</h2><p>{}</p><a href=\"/\">Back to albums</a></section>",
            escape_html(&album_id)
        );
        return html_response(StatusCode::NOT_FOUND, render_page(&state, "Not found", &content));
    };
    let content = render_album(&state, album, &state.player.read().snapshot());
    html_response(StatusCode::OK, render_page(&state, &album.title, &content))
}

fn render_eras(state: &AppState, albums: &[Album]) -> String {
    let section_template =
        load_template(state, "templates/partials/era_section.html").unwrap_or_default();
    let tile_template =
        load_template(state, "templates/partials/album_tile.html").unwrap_or_default();

    let mut sections = String::new();
    for (era, bucket) in albums_by_era(albums) {
        let mut tiles = String::new();
        for album in bucket {
            tiles.push_str(&apply_template(
                tile_template.clone(),
                &[
                    ("href", format!("/albums/{}", url_escape(&album.id))),
                    ("cover", cover_html(album.cover_url.as_deref(), &album.title)),
                    ("title", escape_html(&album.title)),
                    ("artist", escape_html(&album.artist)),
                    ("year", album.year.to_string()),
                ],
            ));
        }
        sections.push_str(&apply_template(
            section_template.clone(),
            &[("era", era.label().to_string()), ("albums", tiles)],
        ));
    }
    sections
}

fn render_album(state: &AppState, album: &Album, player: &PlayerSnapshot) -> String {
    let template = load_template(state, "templates/album.html").unwrap_or_default();
    let row_template = load_template(state, "templates/partials/song_row.html").unwrap_or_default();
    let current_id = player.current_song.as_ref().map(|song| song.id.as_str());

    let mut rows = String::new();
    for song in &album.songs {
        let is_current = current_id == Some(song.id.as_str());
        let status = match (is_current, player.is_playing) {
            (true, true) => "playing",
            (true, false) => "paused",
            _ => "",
        };
        rows.push_str(&apply_template(
            row_template.clone(),
            &[
                ("album_id", escape_html(&album.id)),
                ("song_id", escape_html(&song.id)),
                ("row_class", if is_current { "current" } else { "" }.to_string()),
                ("title", escape_html(&song.title)),
                ("duration", format_duration(song.duration)),
                ("status", status.to_string()),
            ],
        ));
    }

    apply_template(
        template,
        &[
            ("cover", cover_html(album.cover_url.as_deref(), &album.title)),
            ("title", escape_html(&album.title)),
            ("artist", escape_html(&album.artist)),
            ("year", album.year.to_string()),
            ("era", album.era.label().to_string()),
            ("songs", rows),
        ],
    )
}

fn render_player_bar(state: &AppState, player: &PlayerSnapshot) -> String {
    let template = load_template(state, "templates/partials/player_bar.html").unwrap_or_default();
    let (title, artist, src) = match &player.current_song {
        Some(song) => (song.title.as_str(), song.artist.as_str(), song.url.as_str()),
        None => ("", "", ""),
    };
    apply_template(
        template,
        &[
            ("hidden", if player.current_song.is_some() { "" } else { "hidden" }.to_string()),
            ("title", escape_html(title)),
            ("artist", escape_html(artist)),
            ("src", escape_html(src)),
            ("toggle_label", if player.is_playing { "Pause" } else { "Play" }.to_string()),
            ("volume", player.volume.to_string()),
        ],
    )
}

fn render_page(state: &AppState, title: &str, content: &str) -> String {
    let player_bar = render_player_bar(state, &state.player.read().snapshot());
    match load_template(state, "templates/layout.html") {
        Ok(template) => apply_template(
            template,
            &[
                ("title", escape_html(title)),
                ("content", content.to_string()),
                ("player_bar", player_bar),
            ],
        ),
        Err(err) => format!(
            "<!DOCTYPE html><html><head><meta charset=\"utf-8\" /><title>{}</title></head><body><h1>Personal Music Player</h1><main>{}</main>{}<pre>{}</pre></body></html>",
            escape_html(title),
            content,
            player_bar,
            escape_html(&err)
        ),
    }
}

fn cover_html(cover_url: Option<&str>, alt: &str) -> String {
    match cover_url {
        Some(url) => format!(
            "<img class=\"cover\" src=\"{}\" alt=\"{}\" />",
            escape_html(url),
            escape_html(alt)
        ),
        None => "<div class=\"cover placeholder\"></div>".to_string(),
    }
}
