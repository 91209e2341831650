//! Single-slot lookahead cache for the track expected to play next.

use tracing::debug;

use crate::library::{AudioBytes, TrackId};

/// Tracks what should be warm and what actually is.
///
/// The preloader never fetches by itself: [`retarget`](Self::retarget) says
/// when a fetch is needed and [`accept`](Self::accept) filters results that
/// arrive after the anticipated track changed again.
#[derive(Debug, Default)]
pub struct Preloader {
    target: Option<TrackId>,
    cached: Option<(TrackId, AudioBytes)>,
    ticket: u64,
}

impl Preloader {
    pub fn new() -> Self {
        Self::default()
    }

    /// The id currently anticipated to play next.
    pub fn target(&self) -> Option<&str> {
        self.target.as_deref()
    }

    /// The id whose bytes are held, if any.
    pub fn cached_id(&self) -> Option<&str> {
        self.cached.as_ref().map(|(id, _)| id.as_str())
    }

    /// Point the cache at `anticipated`. Returns the ticket and id to fetch
    /// when new bytes are needed; any cache for a different id is dropped.
    pub fn retarget(&mut self, anticipated: Option<TrackId>) -> Option<(u64, TrackId)> {
        if self.target == anticipated {
            return None;
        }
        if self.cached_id() != anticipated.as_deref() {
            self.cached = None;
        }
        self.target = anticipated.clone();
        let id = anticipated?;
        if self.cached.is_some() {
            return None;
        }
        self.ticket += 1;
        Some((self.ticket, id))
    }

    /// Store a fetch result if it still answers the latest request.
    pub fn accept(&mut self, ticket: u64, id: &str, bytes: Option<AudioBytes>) -> bool {
        if ticket != self.ticket || self.target.as_deref() != Some(id) {
            debug!(id, ticket, "discarding stale preload");
            return false;
        }
        match bytes {
            Some(bytes) => {
                debug!(id, "preload ready");
                self.cached = Some((id.to_string(), bytes));
                true
            }
            None => {
                debug!(id, "preload found no audio");
                false
            }
        }
    }

    /// Cached bytes for `id`, if that is what is warm.
    pub fn take_for(&self, id: &str) -> Option<AudioBytes> {
        match &self.cached {
            Some((cached, bytes)) if cached == id => Some(bytes.clone()),
            _ => None,
        }
    }

    pub fn clear(&mut self) {
        self.target = None;
        self.cached = None;
    }
}
