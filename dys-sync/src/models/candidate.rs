//! Candidate tracks as returned by the track identification API

use serde::{Deserialize, Deserializer, Serialize};

/// One identified track, not yet resolved to a playlist track id
///
/// Only `artist`, `title` and `song_link` drive the pipeline; the remaining
/// fields are carried for logging and future use.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct Candidate {
    #[serde(default, deserialize_with = "null_as_default")]
    pub artist: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub title: String,
    /// Lookup page used to find the playlist track id
    #[serde(default, deserialize_with = "null_as_default")]
    pub song_link: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub played_date: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub timecode: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub label: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub score: f64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub received_datetime: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub album: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub release_date: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub played_datetime: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub out_of: f64,
}

impl Candidate {
    pub fn new(artist: impl Into<String>, title: impl Into<String>, song_link: impl Into<String>) -> Self {
        Self {
            artist: artist.into(),
            title: title.into(),
            song_link: song_link.into(),
            ..Default::default()
        }
    }

    /// Lookup link, or None when the candidate cannot be resolved
    pub fn lookup_link(&self) -> Option<&str> {
        let link = self.song_link.trim();
        if link.is_empty() {
            None
        } else {
            Some(link)
        }
    }

    /// Human-readable "artist - title" tag for log lines
    pub fn tag(&self) -> String {
        format!("{} - {}", self.artist, self.title)
    }
}

/// Response body of the track identification API
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct CandidateResponse {
    #[serde(default, deserialize_with = "null_as_default")]
    pub message: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub tracks: Vec<Candidate>,
}

/// Treat an explicit `null` like a missing key
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}
