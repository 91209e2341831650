//! The `AudioOutput` contract and its event subscription plumbing.

use std::sync::{Arc, Mutex, Weak};

use crate::error::Result;
use crate::library::AudioBytes;

use super::types::AudioEvent;

pub type Listener = Box<dyn Fn(AudioEvent) + Send + Sync>;

/// One playable primitive. A session owns exactly one and swaps its source
/// when the track changes.
pub trait AudioOutput: Send {
    /// Replace the loaded source. Position resets to 0 and playback pauses.
    fn set_source(&mut self, bytes: AudioBytes) -> Result<()>;

    /// Stop and drop the loaded source.
    fn clear_source(&mut self);

    fn has_source(&self) -> bool;

    /// Request playback. `Ok` only means the request was accepted; the
    /// `Play` event confirms it.
    fn play(&mut self) -> Result<()>;

    fn pause(&mut self);

    fn current_time(&self) -> f64;

    fn set_current_time(&mut self, secs: f64);

    fn duration(&self) -> f64;

    fn volume(&self) -> f64;

    fn set_volume(&mut self, volume: f64);

    /// Register `listener` for native events until the returned
    /// [`Subscription`] is dropped.
    fn subscribe(&self, listener: Listener) -> Subscription;

    /// Stop playback and free the underlying device resources.
    fn release(&mut self) {
        self.pause();
        self.clear_source();
    }
}

#[derive(Default)]
struct HubInner {
    next_id: u64,
    listeners: Vec<(u64, Arc<dyn Fn(AudioEvent) + Send + Sync>)>,
}

/// Fan-out of output events to registered listeners.
#[derive(Clone, Default)]
pub struct EventHub {
    inner: Arc<Mutex<HubInner>>,
}

impl EventHub {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&self, listener: Listener) -> Subscription {
        let mut id = 0;
        if let Ok(mut inner) = self.inner.lock() {
            id = inner.next_id;
            inner.next_id += 1;
            inner.listeners.push((id, Arc::from(listener)));
        }
        Subscription {
            id,
            hub: Arc::downgrade(&self.inner),
        }
    }

    /// Deliver `event` to every listener. Listeners run outside the lock so
    /// they may subscribe or unsubscribe re-entrantly.
    pub fn emit(&self, event: AudioEvent) {
        let listeners: Vec<_> = match self.inner.lock() {
            Ok(inner) => inner.listeners.iter().map(|(_, l)| l.clone()).collect(),
            Err(_) => return,
        };
        for listener in listeners {
            listener(event);
        }
    }

    pub fn listener_count(&self) -> usize {
        self.inner.lock().map(|i| i.listeners.len()).unwrap_or(0)
    }
}

/// Disposer for a registered listener; dropping it unregisters.
#[must_use = "dropping a Subscription unregisters the listener"]
pub struct Subscription {
    id: u64,
    hub: Weak<Mutex<HubInner>>,
}

impl Subscription {
    pub fn unsubscribe(self) {}
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(hub) = self.hub.upgrade() {
            if let Ok(mut inner) = hub.lock() {
                inner.listeners.retain(|(id, _)| *id != self.id);
            }
        }
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription").field("id", &self.id).finish()
    }
}
