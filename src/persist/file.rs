use std::path::{Path, PathBuf};
use std::sync::Mutex;

use async_trait::async_trait;
use tracing::{debug, warn};

use crate::error::Result;

use super::PersistenceAdapter;

/// Settings stored as a single TOML table on disk.
///
/// The table is read once on open and rewritten in full on every change.
#[derive(Debug)]
pub struct SettingsFile {
    path: PathBuf,
    table: Mutex<toml::Table>,
}

impl SettingsFile {
    /// Open `path`, starting empty when it does not exist yet. A corrupt file
    /// is logged and treated as empty so a bad write never blocks startup.
    pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let table = match tokio::fs::read_to_string(&path).await {
            Ok(text) => match text.parse::<toml::Table>() {
                Ok(table) => table,
                Err(e) => {
                    warn!(path = %path.display(), "ignoring unreadable state file: {e}");
                    toml::Table::new()
                }
            },
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %path.display(), "no state file yet");
                toml::Table::new()
            }
            Err(e) => return Err(e.into()),
        };
        Ok(Self {
            path,
            table: Mutex::new(table),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn write_out(&self, text: String) -> Result<()> {
        if let Some(dir) = self.path.parent() {
            tokio::fs::create_dir_all(dir).await?;
        }
        // Write-then-rename keeps the previous file intact if we die mid-write.
        let tmp = self.path.with_extension("toml.tmp");
        tokio::fs::write(&tmp, text).await?;
        tokio::fs::rename(&tmp, &self.path).await?;
        Ok(())
    }

    fn render(&self) -> Result<String> {
        let table = self.table.lock().map(|t| t.clone()).unwrap_or_default();
        Ok(toml::to_string(&table)?)
    }
}

#[async_trait]
impl PersistenceAdapter for SettingsFile {
    async fn get_setting(&self, key: &str) -> Option<toml::Value> {
        self.table.lock().ok().and_then(|t| t.get(key).cloned())
    }

    async fn set_setting(&self, key: &str, value: toml::Value) -> Result<()> {
        if let Ok(mut t) = self.table.lock() {
            t.insert(key.to_string(), value);
        }
        let text = self.render()?;
        self.write_out(text).await
    }

    async fn remove_setting(&self, key: &str) -> Result<()> {
        if let Ok(mut t) = self.table.lock() {
            t.remove(key);
        }
        let text = self.render()?;
        self.write_out(text).await
    }
}
