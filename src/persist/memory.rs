use std::sync::Mutex;

use async_trait::async_trait;

use crate::error::Result;

use super::PersistenceAdapter;

/// Keeps settings in memory only; nothing survives the process.
#[derive(Debug, Default)]
pub struct MemorySettings {
    table: Mutex<toml::Table>,
}

impl MemorySettings {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-seeded store, handy for restoring a known state.
    pub fn with_table(table: toml::Table) -> Self {
        Self {
            table: Mutex::new(table),
        }
    }

    pub fn snapshot(&self) -> toml::Table {
        self.table.lock().map(|t| t.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl PersistenceAdapter for MemorySettings {
    async fn get_setting(&self, key: &str) -> Option<toml::Value> {
        self.table.lock().ok().and_then(|t| t.get(key).cloned())
    }

    async fn set_setting(&self, key: &str, value: toml::Value) -> Result<()> {
        if let Ok(mut t) = self.table.lock() {
            t.insert(key.to_string(), value);
        }
        Ok(())
    }

    async fn remove_setting(&self, key: &str) -> Result<()> {
        if let Ok(mut t) = self.table.lock() {
            t.remove(key);
        }
        Ok(())
    }
}
