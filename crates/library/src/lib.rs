mod sample;

use std::collections::HashMap;

use common::{new_id, Album, Era, Song, StoredObject};
use serde::Serialize;
use tracing::warn;

pub use sample::sample_albums;

const NAME_SEP: char = '-';
const AUDIO_SUFFIX: &str = ".mp3";

/// Pieces recovered from an `artist-album-year-title.mp3` object name.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ParsedName {
    pub artist: String,
    pub album: String,
    pub year: i32,
    pub title: String,
}

impl ParsedName {
    pub fn era(&self) -> Era {
        Era::from_year(self.year)
    }

    fn group_key(&self) -> String {
        format!("{}{}{}{}{}", self.artist, NAME_SEP, self.album, NAME_SEP, self.year)
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum NameError {
    EmptyFilename,
    MissingParts { found: usize },
}

impl std::fmt::Display for NameError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            NameError::EmptyFilename => write!(f, "empty filename"),
            NameError::MissingParts { found } => write!(
                f,
                "expected artist-album-year-title, found {} part(s)",
                found
            ),
        }
    }
}

impl std::error::Error for NameError {}

/// Parses the last path segment of `pathname`. A year that does not parse
/// (or parses to zero) becomes `current_year`.
pub fn parse_object_name(pathname: &str, current_year: i32) -> Result<ParsedName, NameError> {
    let filename = common::last_segment(pathname);
    if filename.is_empty() {
        return Err(NameError::EmptyFilename);
    }

    let parts: Vec<&str> = filename.split(NAME_SEP).collect();
    if parts.len() < 4 {
        return Err(NameError::MissingParts { found: parts.len() });
    }

    let joined = parts[3..].join("-");
    let title = joined.strip_suffix(AUDIO_SUFFIX).unwrap_or(&joined).to_string();
    let year = parse_year(parts[2]).unwrap_or(current_year);

    Ok(ParsedName {
        artist: parts[0].to_string(),
        album: parts[1].to_string(),
        year,
        title,
    })
}

/// Leading-digit year parse; `None` for missing digits, zero, or a value
/// that does not fit an `i32`. Never sees a sign: the year segment comes from
/// splitting on `-`.
pub fn parse_year(value: &str) -> Option<i32> {
    let value = value.trim_start();
    let digits = value.strip_prefix('+').unwrap_or(value);
    let end = digits
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(digits.len());
    let year: i32 = digits[..end].parse().ok()?;
    if year == 0 {
        None
    } else {
        Some(year)
    }
}

#[derive(Clone, Debug, Serialize)]
pub struct SkippedObject {
    pub pathname: String,
    pub reason: String,
}

#[derive(Clone, Debug, Default, Serialize)]
pub struct Catalog {
    pub albums: Vec<Album>,
    pub skipped: Vec<SkippedObject>,
}

impl Catalog {
    pub fn song_count(&self) -> usize {
        self.albums.iter().map(|album| album.songs.len()).sum()
    }
}

/// Rebuilds albums from a flat object listing. Albums keep first-seen order
/// of their `artist-album-year` key and songs keep input order. Every album
/// and song gets a fresh id.
pub fn group_objects(objects: &[StoredObject], current_year: i32) -> Catalog {
    let mut catalog = Catalog::default();
    let mut index_by_key: HashMap<String, usize> = HashMap::new();

    for object in objects {
        let parsed = match parse_object_name(&object.pathname, current_year) {
            Ok(parsed) => parsed,
            Err(err) => {
                warn!("Skipping {}: {}", object.pathname, err);
                catalog.skipped.push(SkippedObject {
                    pathname: object.pathname.clone(),
                    reason: err.to_string(),
                });
                continue;
            }
        };

        let era = parsed.era();
        let slot = *index_by_key.entry(parsed.group_key()).or_insert_with(|| {
            catalog.albums.push(Album {
                id: new_id(),
                title: parsed.album.clone(),
                artist: parsed.artist.clone(),
                year: parsed.year,
                era,
                cover_url: None,
                songs: Vec::new(),
            });
            catalog.albums.len() - 1
        });

        catalog.albums[slot].songs.push(Song {
            id: new_id(),
            title: parsed.title,
            artist: parsed.artist,
            album: parsed.album,
            duration: 0,
            url: object.url.clone(),
            cover_url: None,
            year: Some(parsed.year),
            genre: None,
            era: Some(era),
        });
    }

    catalog
}

/// `group_objects` against today's calendar year.
pub fn group_objects_now(objects: &[StoredObject]) -> Catalog {
    group_objects(objects, current_year())
}

pub fn current_year() -> i32 {
    time::OffsetDateTime::now_utc().year()
}

/// Albums bucketed by era in browsing order. Eras without albums are left out.
pub fn albums_by_era(albums: &[Album]) -> Vec<(Era, Vec<&Album>)> {
    Era::ALL
        .into_iter()
        .filter_map(|era| {
            let bucket: Vec<&Album> = albums.iter().filter(|album| album.era == era).collect();
            if bucket.is_empty() {
                None
            } else {
                Some((era, bucket))
            }
        })
        .collect()
}

/// Reuses ids from `previous` for albums and songs that are still listed.
/// Albums match on artist, title and year; songs within a matched album match
/// on URL and title.
pub fn carry_ids(previous: &[Album], next: &mut [Album]) {
    for album in next.iter_mut() {
        let Some(old) = previous.iter().find(|old| {
            old.artist == album.artist && old.title == album.title && old.year == album.year
        }) else {
            continue;
        };
        album.id = old.id.clone();

        let mut taken = vec![false; old.songs.len()];
        for song in album.songs.iter_mut() {
            let matched = (0..old.songs.len()).find(|&i| {
                !taken[i] && old.songs[i].url == song.url && old.songs[i].title == song.title
            });
            if let Some(i) = matched {
                taken[i] = true;
                song.id = old.songs[i].id.clone();
            }
        }
    }
}

pub fn find_album<'a>(albums: &'a [Album], album_id: &str) -> Option<&'a Album> {
    albums.iter().find(|album| album.id == album_id)
}

pub fn find_song<'a>(albums: &'a [Album], song_id: &str) -> Option<&'a Song> {
    albums.iter().find_map(|album| album.find_song(song_id))
}
