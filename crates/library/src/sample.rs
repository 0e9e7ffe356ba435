use common::{new_id, Album, Era, Song};

/// Fixed two-album catalog served when real storage is unavailable.
pub fn sample_albums() -> Vec<Album> {
    vec![
        sample_album(
            "Example Album",
            "Example Artist",
            2024,
            &[("Example Song 1", 180), ("Example Song 2", 210)],
        ),
        sample_album("Retro Album", "Retro Artist", 1985, &[("Retro Song 1", 240)]),
    ]
}

fn sample_album(title: &str, artist: &str, year: i32, songs: &[(&str, u32)]) -> Album {
    let era = Era::from_year(year);
    Album {
        id: new_id(),
        title: title.to_string(),
        artist: artist.to_string(),
        year,
        era,
        cover_url: None,
        songs: songs
            .iter()
            .map(|(song_title, duration)| Song {
                id: new_id(),
                title: song_title.to_string(),
                artist: artist.to_string(),
                album: title.to_string(),
                duration: *duration,
                url: String::new(),
                cover_url: None,
                year: None,
                genre: None,
                era: Some(era),
            })
            .collect(),
    }
}
