//! Ordered background writer for session settings.

use std::collections::BTreeMap;
use std::sync::Arc;

use tokio::sync::{mpsc, oneshot};
use tracing::warn;

use crate::persist::PersistenceAdapter;

/// `None` removes the key.
pub(crate) type Entries = Vec<(&'static str, Option<toml::Value>)>;

enum PersistMsg {
    Write(Entries),
    Flush(oneshot::Sender<()>),
}

/// Writes are applied in submission order. Bursts queued while a write is
/// in flight collapse to the latest value per key.
pub(crate) struct Persister {
    tx: mpsc::UnboundedSender<PersistMsg>,
}

impl Persister {
    pub(crate) fn spawn(adapter: Arc<dyn PersistenceAdapter>) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        tokio::spawn(run(adapter, rx));
        Self { tx }
    }

    pub(crate) fn write(&self, entries: Entries) {
        if self.tx.send(PersistMsg::Write(entries)).is_err() {
            warn!("settings writer is gone; dropping update");
        }
    }

    /// Resolves once every write submitted before this call is stored.
    pub(crate) async fn flush(&self) {
        let (done, wait) = oneshot::channel();
        if self.tx.send(PersistMsg::Flush(done)).is_ok() {
            let _ = wait.await;
        }
    }
}

async fn run(adapter: Arc<dyn PersistenceAdapter>, mut rx: mpsc::UnboundedReceiver<PersistMsg>) {
    while let Some(first) = rx.recv().await {
        let mut pending: BTreeMap<&'static str, Option<toml::Value>> = BTreeMap::new();
        let mut flushed = Vec::new();
        let mut next = Some(first);
        while let Some(msg) = next.take() {
            match msg {
                PersistMsg::Write(entries) => pending.extend(entries),
                PersistMsg::Flush(done) => flushed.push(done),
            }
            next = rx.try_recv().ok();
        }

        for (key, value) in pending {
            let res = match value {
                Some(v) => adapter.set_setting(key, v).await,
                None => adapter.remove_setting(key).await,
            };
            if let Err(e) = res {
                warn!(key, "failed to persist setting: {e}");
            }
        }
        for done in flushed {
            let _ = done.send(());
        }
    }
}
