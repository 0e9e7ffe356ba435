use std::fmt;

use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Era {
    #[serde(rename = "50s")]
    Fifties,
    #[serde(rename = "60s")]
    Sixties,
    #[serde(rename = "70s")]
    Seventies,
    #[serde(rename = "80s")]
    Eighties,
    #[serde(rename = "90s")]
    Nineties,
    #[serde(rename = "2000s")]
    TwoThousands,
    #[serde(rename = "2010s")]
    TwentyTens,
    #[serde(rename = "2020s")]
    TwentyTwenties,
}

impl Era {
    /// Every era in browsing order.
    pub const ALL: [Era; 8] = [
        Era::Fifties,
        Era::Sixties,
        Era::Seventies,
        Era::Eighties,
        Era::Nineties,
        Era::TwoThousands,
        Era::TwentyTens,
        Era::TwentyTwenties,
    ];

    /// Decade bucket for a release year. Anything before 1960 is `50s` and
    /// anything from 2020 on is `2020s`.
    pub fn from_year(year: i32) -> Self {
        match year {
            y if y < 1960 => Era::Fifties,
            y if y < 1970 => Era::Sixties,
            y if y < 1980 => Era::Seventies,
            y if y < 1990 => Era::Eighties,
            y if y < 2000 => Era::Nineties,
            y if y < 2010 => Era::TwoThousands,
            y if y < 2020 => Era::TwentyTens,
            _ => Era::TwentyTwenties,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Era::Fifties => "50s",
            Era::Sixties => "60s",
            Era::Seventies => "70s",
            Era::Eighties => "80s",
            Era::Nineties => "90s",
            Era::TwoThousands => "2000s",
            Era::TwentyTens => "2010s",
            Era::TwentyTwenties => "2020s",
        }
    }
}

impl fmt::Display for Era {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Song {
    pub id: String,
    pub title: String,
    pub artist: String,
    pub album: String,
    /// Seconds; 0 when unknown.
    pub duration: u32,
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cover_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub year: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub genre: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub era: Option<Era>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Album {
    pub id: String,
    pub title: String,
    pub artist: String,
    pub year: i32,
    pub era: Era,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cover_url: Option<String>,
    #[serde(default)]
    pub songs: Vec<Song>,
}

impl Album {
    pub fn find_song(&self, song_id: &str) -> Option<&Song> {
        self.songs.iter().find(|song| song.id == song_id)
    }
}

/// One object as reported by the blob store.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredObject {
    pub pathname: String,
    pub url: String,
}

impl StoredObject {
    pub fn new(pathname: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            pathname: pathname.into(),
            url: url.into(),
        }
    }
}

/// Fresh opaque identifier. Not stable across calls.
pub fn new_id() -> String {
    uuid::Uuid::new_v4().simple().to_string()
}

pub fn last_segment(path: &str) -> &str {
    path.rsplit('/').next().unwrap_or(path)
}

#[cfg(test)]
mod tests {
    use super::{last_segment, new_id, Era};

    #[test]
    fn era_boundaries() {
        assert_eq!(Era::from_year(1959), Era::Fifties);
        assert_eq!(Era::from_year(1960), Era::Sixties);
        assert_eq!(Era::from_year(1999), Era::Nineties);
        assert_eq!(Era::from_year(2000), Era::TwoThousands);
        assert_eq!(Era::from_year(2019), Era::TwentyTens);
        assert_eq!(Era::from_year(2025), Era::TwentyTwenties);
        assert_eq!(Era::from_year(i32::MIN), Era::Fifties);
        assert_eq!(Era::from_year(i32::MAX), Era::TwentyTwenties);
    }

    #[test]
    fn era_is_monotonic() {
        let mut previous = Era::from_year(1900);
        for year in 1900..2100 {
            let era = Era::from_year(year);
            assert!(era >= previous, "era went backwards at {}", year);
            previous = era;
        }
    }

    #[test]
    fn era_serializes_as_label() {
        let json = serde_json::to_string(&Era::TwoThousands).unwrap();
        assert_eq!(json, "\"2000s\"");
        let era: Era = serde_json::from_str("\"80s\"").unwrap();
        assert_eq!(era, Era::Eighties);
    }

    #[test]
    fn last_segment_of_path() {
        assert_eq!(last_segment("music/a/A-B-1999-Song.mp3"), "A-B-1999-Song.mp3");
        assert_eq!(last_segment("plain.mp3"), "plain.mp3");
        assert_eq!(last_segment("dir/"), "");
    }

    #[test]
    fn ids_are_unique() {
        assert_ne!(new_id(), new_id());
    }
}
