//! The playback session: queue, navigation, preloading and automix wiring
//! around a single audio output.

mod persister;
mod preload;
mod queue;
mod restore;
mod session;
mod state;

pub use preload::Preloader;
pub use queue::{
    fisher_yates, insert_after_current, next_index, prev_index, replay_pair, resolve_index,
    shuffle_pinned,
};
pub use restore::load_state;
pub use session::{PlaybackSession, SessionEvent, SessionOptions};
pub use state::{PlayOptions, PlaybackState, RepeatMode};
