use serde::Deserialize;

use crate::playback::RepeatMode;

/// Top-level application settings loaded from `config.toml`.
///
/// File format: TOML
/// Default path (Linux/XDG): `$XDG_CONFIG_HOME/segue/config.toml` or `~/.config/segue/config.toml`
///
/// Precedence (highest wins):
/// 1) Environment variables (prefix `SEGUE__`, `__` as nested separator)
/// 2) Config file (if present)
/// 3) Struct defaults
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub audio: AudioSettings,
    pub playback: PlaybackSettings,
    pub session: SessionSettings,
    pub automix: AutomixSettings,
    pub library: LibrarySettings,
    pub log: LogSettings,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AudioSettings {
    /// Fade-out duration when quitting (milliseconds).
    /// Set to 0 to stop immediately.
    pub quit_fade_out_ms: u64,
}

impl Default for AudioSettings {
    fn default() -> Self {
        Self {
            quit_fade_out_ms: 500,
        }
    }
}

/// Defaults applied when no persisted playback state exists yet.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PlaybackSettings {
    /// Whether shuffle starts enabled.
    pub shuffle: bool,
    /// Default repeat mode.
    pub repeat: RepeatModeSetting,
    /// Initial volume in `[0, 1]`.
    pub volume: f64,
    /// Whether automix starts enabled.
    pub automix: bool,
}

impl Default for PlaybackSettings {
    fn default() -> Self {
        Self {
            shuffle: false,
            repeat: RepeatModeSetting::Off,
            volume: 1.0,
            automix: false,
        }
    }
}

#[derive(Debug, Copy, Clone, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RepeatModeSetting {
    #[serde(alias = "no-loop", alias = "no_loop", alias = "none")]
    Off,
    #[serde(alias = "loop-all", alias = "loop_all", alias = "repeat-all")]
    All,
    #[serde(alias = "loop-one", alias = "loop_one", alias = "repeat-one")]
    One,
}

impl From<RepeatModeSetting> for RepeatMode {
    fn from(setting: RepeatModeSetting) -> Self {
        match setting {
            RepeatModeSetting::Off => RepeatMode::Off,
            RepeatModeSetting::All => RepeatMode::All,
            RepeatModeSetting::One => RepeatMode::One,
        }
    }
}

/// Session navigation tuning.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SessionSettings {
    /// `prev` restarts the current track instead of going back once playback
    /// is past this many seconds.
    pub restart_threshold_secs: f64,
    /// How many recently played ids automix refuses to pick again.
    pub history_len: usize,
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            restart_threshold_secs: 3.0,
            history_len: 20,
        }
    }
}

/// Weights and thresholds used by the automix picker.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AutomixSettings {
    /// Weight of the harmonic key score.
    pub key_weight: f64,
    /// Weight of the tempo score.
    pub tempo_weight: f64,
    /// Upper bound (exclusive) of the random tie-breaking jitter.
    pub jitter: f64,
    /// Relative tempo difference at which the tempo score bottoms out.
    pub tempo_tolerance: f64,
    /// Fraction of the candidate pool eligible for the weighted draw.
    pub top_fraction: f64,
    /// Hard cap on the weighted draw slice.
    pub top_max: usize,
}

impl Default for AutomixSettings {
    fn default() -> Self {
        Self {
            key_weight: 0.3,
            tempo_weight: 0.7,
            jitter: 0.05,
            tempo_tolerance: 0.15,
            top_fraction: 0.2,
            top_max: 5,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LibrarySettings {
    /// File extensions to treat as audio (case-insensitive, without dot).
    pub extensions: Vec<String>,
    /// Whether to follow symlinks during scanning.
    pub follow_links: bool,
    /// Whether to include hidden files/directories (dotfiles).
    pub include_hidden: bool,
    /// Whether to recurse into subdirectories.
    pub recursive: bool,
    /// Optional cap on directory recursion depth.
    pub max_depth: Option<usize>,
}

impl Default for LibrarySettings {
    fn default() -> Self {
        Self {
            extensions: vec!["mp3".into(), "flac".into(), "wav".into(), "ogg".into()],
            follow_links: true,
            include_hidden: true,
            recursive: true,
            max_depth: None,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LogSettings {
    /// `tracing` filter directive used when `RUST_LOG` is unset.
    pub filter: String,
}

impl Default for LogSettings {
    fn default() -> Self {
        Self {
            filter: "segue=info".to_string(),
        }
    }
}
