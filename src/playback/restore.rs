use tracing::{debug, warn};

use crate::config::PlaybackSettings;
use crate::persist::{PersistenceAdapter, keys};

use super::state::{PlaybackState, RepeatMode};

/// Rebuild the last saved state. The full snapshot wins; without one the
/// individual keys are layered over `defaults`.
pub async fn load_state(
    adapter: &dyn PersistenceAdapter,
    defaults: &PlaybackSettings,
) -> PlaybackState {
    if let Some(value) = adapter.get_setting(keys::PLAYBACK_STATE).await {
        match value.try_into::<PlaybackState>() {
            Ok(state) => {
                debug!("restored playback snapshot");
                return state.normalized();
            }
            Err(e) => warn!("ignoring unreadable playback snapshot: {e}"),
        }
    }

    let mut state = PlaybackState {
        shuffle: defaults.shuffle,
        repeat: defaults.repeat.into(),
        volume: defaults.volume,
        automix: defaults.automix,
        ..PlaybackState::default()
    };
    if let Some(v) = adapter.get_setting(keys::VOLUME).await {
        if let Some(volume) = v.as_float().or_else(|| v.as_integer().map(|i| i as f64)) {
            state.volume = volume;
        }
    }
    if let Some(shuffle) = adapter.get_setting(keys::SHUFFLE).await.and_then(|v| v.as_bool()) {
        state.shuffle = shuffle;
    }
    if let Some(v) = adapter.get_setting(keys::REPEAT).await {
        match v.as_str().map(str::parse::<RepeatMode>) {
            Some(Ok(mode)) => state.repeat = mode,
            _ => warn!("ignoring unreadable repeat setting: {v}"),
        }
    }
    if let Some(automix) = adapter.get_setting(keys::AUTOMIX).await.and_then(|v| v.as_bool()) {
        state.automix = automix;
    }
    if let Some(id) = adapter.get_setting(keys::LAST_TRACK_ID).await {
        state.current_track_id = id.as_str().map(str::to_string);
    }
    state.normalized()
}
