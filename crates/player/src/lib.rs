use common::Song;
use serde::Serialize;

pub const DEFAULT_VOLUME: f64 = 1.0;

/// Playback queue and transport state for one listening session.
///
/// The transition methods are the only way to change the state. Whoever
/// renders audio watches `current_song`, `is_playing` and `volume` and calls
/// [`PlayerState::next_song`] when a track finishes.
#[derive(Clone, Debug, PartialEq)]
pub struct PlayerState {
    current_song: Option<Song>,
    is_playing: bool,
    volume: f64,
    playlist: Vec<Song>,
    current_index: Option<usize>,
}

impl Default for PlayerState {
    fn default() -> Self {
        Self {
            current_song: None,
            is_playing: false,
            volume: DEFAULT_VOLUME,
            playlist: Vec::new(),
            current_index: None,
        }
    }
}

impl PlayerState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current_song(&self) -> Option<&Song> {
        self.current_song.as_ref()
    }

    pub fn is_playing(&self) -> bool {
        self.is_playing
    }

    pub fn volume(&self) -> f64 {
        self.volume
    }

    pub fn playlist(&self) -> &[Song] {
        &self.playlist
    }

    pub fn current_index(&self) -> Option<usize> {
        self.current_index
    }

    /// Makes `song` current and starts playing. The index points at the first
    /// playlist entry with the same id, or is cleared when the song is not in
    /// the playlist; the song stays current either way.
    pub fn set_current_song(&mut self, song: Song) {
        self.current_index = self.playlist.iter().position(|s| s.id == song.id);
        self.current_song = Some(song);
        self.is_playing = true;
    }

    pub fn play(&mut self) {
        self.is_playing = true;
    }

    pub fn pause(&mut self) {
        self.is_playing = false;
    }

    /// Stored as given; callers are expected to stay within `[0, 1]`.
    pub fn set_volume(&mut self, volume: f64) {
        self.volume = volume;
    }

    /// Replaces the queue and rewinds to its first entry. The current song is
    /// left alone. An empty queue clears the index.
    pub fn set_playlist(&mut self, songs: Vec<Song>) {
        self.current_index = if songs.is_empty() { None } else { Some(0) };
        self.playlist = songs;
    }

    /// Advances within the playlist. Does nothing on the last entry; with no
    /// index (current song outside the playlist) it starts the first entry.
    pub fn next_song(&mut self) {
        let next = self.current_index.map_or(0, |index| index + 1);
        if let Some(song) = self.playlist.get(next) {
            self.current_song = Some(song.clone());
            self.current_index = Some(next);
            self.is_playing = true;
        }
    }

    /// Steps back within the playlist. Does nothing on the first entry.
    pub fn previous_song(&mut self) {
        let previous = match self.current_index {
            Some(index) if index > 0 => index - 1,
            _ => return,
        };
        if let Some(song) = self.playlist.get(previous) {
            self.current_song = Some(song.clone());
            self.current_index = Some(previous);
            self.is_playing = true;
        }
    }

    /// Song click from an album view: clicking the current song pauses it,
    /// any other song queues the album and starts from that song.
    pub fn select_from_album(&mut self, song: Song, album_songs: Vec<Song>) {
        let already_current = self
            .current_song
            .as_ref()
            .map(|current| current.id == song.id)
            .unwrap_or(false);
        if already_current {
            self.pause();
        } else {
            self.set_playlist(album_songs);
            self.set_current_song(song);
        }
    }

    pub fn snapshot(&self) -> PlayerSnapshot {
        PlayerSnapshot {
            current_song: self.current_song.clone(),
            is_playing: self.is_playing,
            volume: self.volume,
            playlist: self.playlist.clone(),
            current_index: self.current_index.map(|index| index as i64).unwrap_or(-1),
        }
    }
}

/// Wire form of [`PlayerState`]; `current_index` is `-1` when unset.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerSnapshot {
    pub current_song: Option<Song>,
    pub is_playing: bool,
    pub volume: f64,
    pub playlist: Vec<Song>,
    pub current_index: i64,
}
