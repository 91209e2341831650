//! Music library: track model, directory scanning and the `TrackStore`
//! contract the playback session reads from.

mod model;
mod scan;
mod store;

pub use model::{AudioBytes, Track, TrackId};
pub use scan::scan;
pub use store::{LibraryStore, TrackStore};
