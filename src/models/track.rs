use serde::{Deserialize, Serialize};

/// A recommended track as shown to the user, with its measured tempo
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Track {
    pub id: String,
    pub name: String,
    /// Artist names joined with ", "
    pub artists: String,
    pub album: String,
    pub uri: String,
    pub image: Option<String>,
    pub bpm: Option<i32>,
}

impl Track {
    pub fn tempo_within(&self, min: i32, max: i32) -> bool {
        matches!(self.bpm, Some(bpm) if bpm >= min && bpm <= max)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TracksResponse {
    pub tracks: Vec<Track>,
}
