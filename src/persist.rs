//! Durable key/value settings used to restore a playback session.

mod file;
mod memory;

use async_trait::async_trait;

use crate::error::Result;

pub use file::SettingsFile;
pub use memory::MemorySettings;

/// Keys the playback session reads and writes.
pub mod keys {
    pub const VOLUME: &str = "volume";
    pub const SHUFFLE: &str = "shuffle";
    pub const REPEAT: &str = "repeat";
    pub const AUTOMIX: &str = "automix";
    pub const LAST_TRACK_ID: &str = "last_track_id";
    pub const PLAYBACK_STATE: &str = "playback_state";
}

#[async_trait]
pub trait PersistenceAdapter: Send + Sync {
    async fn get_setting(&self, key: &str) -> Option<toml::Value>;

    async fn set_setting(&self, key: &str, value: toml::Value) -> Result<()>;

    /// Forget `key`. Adapters without deletion may store nothing instead.
    async fn remove_setting(&self, key: &str) -> Result<()>;
}
