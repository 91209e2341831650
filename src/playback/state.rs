//! Playback state as persisted and exposed to callers.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::library::{AudioBytes, TrackId};

#[derive(Debug, Default, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RepeatMode {
    /// Stop at the end of the queue.
    #[default]
    Off,
    /// Repeat the current track when it ends.
    One,
    /// Wrap around to the start of the queue.
    All,
}

impl RepeatMode {
    /// `Off -> All -> One -> Off`.
    pub fn cycled(self) -> Self {
        match self {
            RepeatMode::Off => RepeatMode::All,
            RepeatMode::All => RepeatMode::One,
            RepeatMode::One => RepeatMode::Off,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            RepeatMode::Off => "off",
            RepeatMode::One => "one",
            RepeatMode::All => "all",
        }
    }
}

impl fmt::Display for RepeatMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RepeatMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "off" => Ok(RepeatMode::Off),
            "one" => Ok(RepeatMode::One),
            "all" => Ok(RepeatMode::All),
            other => Err(format!("unknown repeat mode: {other}")),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlaybackState {
    pub current_track_id: Option<TrackId>,
    /// Playback order; shuffled when `shuffle` is on.
    pub queue: Vec<TrackId>,
    /// Canonical order, restored verbatim when shuffle is turned off.
    pub original_queue: Vec<TrackId>,
    pub shuffle: bool,
    pub repeat: RepeatMode,
    pub is_playing: bool,
    /// Always within `[0, 1]`.
    pub volume: f64,
    pub automix: bool,
}

impl Default for PlaybackState {
    fn default() -> Self {
        Self {
            current_track_id: None,
            queue: Vec::new(),
            original_queue: Vec::new(),
            shuffle: false,
            repeat: RepeatMode::Off,
            is_playing: false,
            volume: 1.0,
            automix: false,
        }
    }
}

impl PlaybackState {
    /// Repair a state read back from storage: volume in range, unshuffled
    /// queues equal, and nothing playing yet.
    pub fn normalized(mut self) -> Self {
        self.volume = if self.volume.is_nan() {
            1.0
        } else {
            self.volume.clamp(0.0, 1.0)
        };
        if !self.shuffle {
            self.queue = self.original_queue.clone();
        }
        self.is_playing = false;
        self
    }
}

/// Options for [`PlaybackSession::play_track`](super::PlaybackSession::play_track).
#[derive(Debug, Clone, Default)]
pub struct PlayOptions {
    /// Load and start audio now rather than only selecting the track.
    pub immediate: bool,
    /// The id comes from queue navigation; leave the queue untouched.
    pub from_queue: bool,
    /// Replace both queues with this list.
    pub custom_queue: Option<Vec<TrackId>>,
    /// Bytes already in hand, skipping the store lookup.
    pub preloaded_bytes: Option<AudioBytes>,
}

impl PlayOptions {
    pub fn immediate() -> Self {
        Self {
            immediate: true,
            ..Self::default()
        }
    }

    pub fn from_queue(mut self) -> Self {
        self.from_queue = true;
        self
    }

    pub fn with_queue(mut self, queue: Vec<TrackId>) -> Self {
        self.custom_queue = Some(queue);
        self
    }

    pub fn with_bytes(mut self, bytes: AudioBytes) -> Self {
        self.preloaded_bytes = Some(bytes);
        self
    }
}
