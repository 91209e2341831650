use std::sync::Arc;

use tracing::{info, warn};

use crate::audio::AudioOutput;
use crate::config::{self, default_state_path};
use crate::library::LibraryStore;
use crate::persist::{MemorySettings, PersistenceAdapter, SettingsFile};
use crate::playback::{PlaybackSession, SessionOptions};

pub fn session_options(settings: &config::Settings) -> SessionOptions {
    SessionOptions {
        session: settings.session.clone(),
        automix: settings.automix.clone(),
        defaults: settings.playback.clone(),
        rng: None,
    }
}

/// The state file when there is somewhere to keep it, memory otherwise.
pub async fn open_persistence() -> Arc<dyn PersistenceAdapter> {
    let Some(path) = default_state_path() else {
        warn!("no state directory; playback state will not survive restarts");
        return Arc::new(MemorySettings::new());
    };
    match SettingsFile::open(&path).await {
        Ok(file) => {
            info!(path = %path.display(), "using state file");
            Arc::new(file)
        }
        Err(e) => {
            warn!(path = %path.display(), "cannot open state file, keeping state in memory: {e}");
            Arc::new(MemorySettings::new())
        }
    }
}

/// Queue the whole library on first run. A restored queue is kept as-is
/// unless none of it exists in the scanned library anymore.
pub fn load_library<O: AudioOutput>(session: &mut PlaybackSession<O>, store: &LibraryStore) {
    let state = session.state();
    let stale = !state.original_queue.is_empty()
        && !state
            .original_queue
            .iter()
            .any(|id| store.ids().contains(id));
    if state.original_queue.is_empty() || stale {
        info!(tracks = store.len(), "queueing library");
        session.set_queue(store.ids().to_vec());
    } else {
        info!(queued = state.queue.len(), "keeping restored queue");
    }
}
