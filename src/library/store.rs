//! Track lookup contract and the filesystem-backed implementation.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, warn};

use super::model::{AudioBytes, Track, TrackId};

/// Where tracks and their encoded audio come from.
///
/// Lookups may be slow; callers always await them off the session timeline.
#[async_trait]
pub trait TrackStore: Send + Sync {
    /// Metadata for `id`, or `None` when the store does not know it.
    async fn get_track(&self, id: &str) -> Option<Track>;

    /// Encoded audio for `id`, or `None` when it is missing or unreadable.
    async fn get_audio_bytes(&self, id: &str) -> Option<AudioBytes>;

    /// Every track the store can serve. Used as the automix candidate pool.
    async fn list_tracks(&self) -> Vec<Track>;
}

/// Serves tracks found by [`scan`](super::scan) straight from disk.
#[derive(Debug, Clone, Default)]
pub struct LibraryStore {
    order: Vec<TrackId>,
    tracks: Arc<HashMap<TrackId, Track>>,
}

impl LibraryStore {
    pub fn new(tracks: Vec<Track>) -> Self {
        let order = tracks.iter().map(|t| t.id.clone()).collect();
        let tracks = tracks.into_iter().map(|t| (t.id.clone(), t)).collect();
        Self {
            order,
            tracks: Arc::new(tracks),
        }
    }

    /// Ids in scan order.
    pub fn ids(&self) -> &[TrackId] {
        &self.order
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}

#[async_trait]
impl TrackStore for LibraryStore {
    async fn get_track(&self, id: &str) -> Option<Track> {
        self.tracks.get(id).cloned()
    }

    async fn get_audio_bytes(&self, id: &str) -> Option<AudioBytes> {
        let Some(track) = self.tracks.get(id) else {
            debug!(id, "audio requested for unknown track");
            return None;
        };
        match tokio::fs::read(&track.path).await {
            Ok(bytes) => Some(AudioBytes::from(bytes)),
            Err(e) => {
                warn!(id, path = %track.path.display(), "failed to read audio: {e}");
                None
            }
        }
    }

    async fn list_tracks(&self) -> Vec<Track> {
        self.order
            .iter()
            .filter_map(|id| self.tracks.get(id).cloned())
            .collect()
    }
}
