use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

/// Stable identifier of a track inside a `TrackStore`.
pub type TrackId = String;

/// Encoded audio as handed to an `AudioOutput`. Shared so the preload cache
/// and the output can hold the same buffer.
pub type AudioBytes = Arc<[u8]>;

#[derive(Debug, Clone, PartialEq)]
pub struct Track {
    pub id: TrackId,
    pub path: PathBuf,
    pub title: String,
    pub artist: Option<String>,
    pub album: Option<String>,
    pub duration: Option<Duration>,
    /// Musical key, ideally Camelot notation ("8A").
    pub key: Option<String>,
    /// Beats per minute.
    pub tempo: Option<f64>,
    /// Cover image reference.
    pub cover: Option<PathBuf>,
}

impl Track {
    /// "Artist - Title", or just the title when the artist is unknown.
    pub fn display(&self) -> String {
        match self.artist.as_deref().map(str::trim) {
            Some(a) if !a.is_empty() => format!("{} - {}", a, self.title),
            _ => self.title.clone(),
        }
    }
}
