use std::collections::VecDeque;
use std::sync::Arc;

use rand::Rng;
use rand::rngs::StdRng;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::audio::{AudioEvent, AudioOutput, Subscription, sanitize_seconds};
use crate::automix::Automix;
use crate::config::{AutomixSettings, PlaybackSettings, SessionSettings};
use crate::library::{AudioBytes, Track, TrackId, TrackStore};
use crate::persist::{PersistenceAdapter, keys};

use super::persister::{Entries, Persister};
use super::preload::Preloader;
use super::queue;
use super::restore::load_state;
use super::state::{PlayOptions, PlaybackState, RepeatMode};

/// Everything that can change the session from outside a method call:
/// native output events and the results of background fetches.
#[derive(Debug)]
pub enum SessionEvent {
    Output(AudioEvent),
    /// Metadata and audio for a track requested by `play_track`.
    Loaded {
        ticket: u64,
        id: TrackId,
        track: Option<Track>,
        bytes: Option<AudioBytes>,
    },
    /// Metadata only, when the audio was already in hand.
    Described { id: TrackId, track: Option<Track> },
    Preloaded {
        ticket: u64,
        id: TrackId,
        bytes: Option<AudioBytes>,
    },
    /// Candidate pool for extending the queue past `after`.
    AutomixPool {
        ticket: u64,
        after: TrackId,
        candidates: Vec<Track>,
    },
}

pub struct SessionOptions {
    pub session: SessionSettings,
    pub automix: AutomixSettings,
    /// Used only when nothing has been persisted yet.
    pub defaults: PlaybackSettings,
    /// Source for shuffles and automix draws. Seeded from entropy when unset.
    pub rng: Option<Box<dyn Rng + Send>>,
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self {
            session: SessionSettings::default(),
            automix: AutomixSettings::default(),
            defaults: PlaybackSettings::default(),
            rng: None,
        }
    }
}

/// Owns one [`AudioOutput`] and the queue around it.
///
/// Operations are synchronous and never fail from the caller's point of view;
/// slow work (store lookups, persistence) runs on spawned tasks and comes back
/// through the session's inbox as [`SessionEvent`]s, which the owner drains
/// with [`process_next`](Self::process_next) or
/// [`process_pending`](Self::process_pending).
pub struct PlaybackSession<O: AudioOutput> {
    state: PlaybackState,
    output: O,
    store: Arc<dyn TrackStore>,
    persister: Persister,
    preloader: Preloader,
    automix: Automix,
    rng: Box<dyn Rng + Send>,
    tuning: SessionSettings,

    inbox_tx: mpsc::UnboundedSender<SessionEvent>,
    inbox: mpsc::UnboundedReceiver<SessionEvent>,
    subscription: Option<Subscription>,

    /// Queue position of the current track when it is known exactly.
    cursor: Option<usize>,
    load_ticket: u64,
    pending_load: Option<(u64, TrackId)>,
    automix_ticket: u64,
    pending_automix: Option<(u64, TrackId)>,

    current_track: Option<Track>,
    history: VecDeque<TrackId>,
    position: f64,
    duration: f64,
}

impl<O: AudioOutput> PlaybackSession<O> {
    /// Build a session from whatever `persistence` last recorded.
    pub async fn restore(
        output: O,
        store: Arc<dyn TrackStore>,
        persistence: Arc<dyn PersistenceAdapter>,
        options: SessionOptions,
    ) -> Self {
        let state = load_state(persistence.as_ref(), &options.defaults).await;
        let current_track = match state.current_track_id.as_deref() {
            Some(id) => store.get_track(id).await,
            None => None,
        };
        info!(
            queued = state.queue.len(),
            current = state.current_track_id.as_deref().unwrap_or("-"),
            "session restored"
        );
        let mut session = Self::with_state(output, store, persistence, state, options);
        session.current_track = current_track;
        session
    }

    /// Build a session around an explicit starting state.
    ///
    /// # Panics
    ///
    /// Must be called from within a Tokio runtime: the persistence writer and
    /// the first preload are spawned onto it.
    pub fn with_state(
        mut output: O,
        store: Arc<dyn TrackStore>,
        persistence: Arc<dyn PersistenceAdapter>,
        state: PlaybackState,
        options: SessionOptions,
    ) -> Self {
        let (inbox_tx, inbox) = mpsc::unbounded_channel();
        let forward = inbox_tx.clone();
        let subscription = output.subscribe(Box::new(move |ev| {
            let _ = forward.send(SessionEvent::Output(ev));
        }));
        let state = state.normalized();
        output.set_volume(state.volume);

        let rng: Box<dyn Rng + Send> = match options.rng {
            Some(rng) => rng,
            None => Box::new(rand::make_rng::<StdRng>()),
        };

        let mut session = Self {
            state,
            output,
            store,
            persister: Persister::spawn(persistence),
            preloader: Preloader::new(),
            automix: Automix::new(options.automix),
            rng,
            tuning: options.session,
            inbox_tx,
            inbox,
            subscription: Some(subscription),
            cursor: None,
            load_ticket: 0,
            pending_load: None,
            automix_ticket: 0,
            pending_automix: None,
            current_track: None,
            history: VecDeque::new(),
            position: 0.0,
            duration: 0.0,
        };
        session.refresh_preload();
        session.maybe_extend_with_automix();
        session
    }

    pub fn state(&self) -> &PlaybackState {
        &self.state
    }

    pub fn current_track(&self) -> Option<&Track> {
        self.current_track.as_ref()
    }

    /// Last reported playback position in seconds.
    pub fn position(&self) -> f64 {
        self.position
    }

    /// Duration of the loaded source in seconds, 0 when unknown.
    pub fn duration(&self) -> f64 {
        self.duration
    }

    /// Recently started tracks, oldest first.
    pub fn history(&self) -> impl Iterator<Item = &str> {
        self.history.iter().map(String::as_str)
    }

    /// Whether a `play_track` is still waiting for its audio.
    pub fn is_loading(&self) -> bool {
        self.pending_load.is_some()
    }

    pub fn preloader(&self) -> &Preloader {
        &self.preloader
    }

    pub fn output(&self) -> &O {
        &self.output
    }

    /// Index of the current track in `queue`.
    pub fn current_index(&self) -> usize {
        queue::resolve_index(
            &self.state.queue,
            self.state.current_track_id.as_deref(),
            self.cursor,
        )
    }

    /// What `next_track` would play right now.
    pub fn anticipated_next(&self) -> Option<TrackId> {
        queue::next_index(
            self.state.queue.len(),
            self.current_index(),
            self.state.repeat,
        )
        .and_then(|i| self.state.queue.get(i).cloned())
    }

    /// Make `id` the current track, editing the queue as `opts` asks.
    pub fn play_track(&mut self, id: &str, opts: PlayOptions) {
        let PlayOptions {
            immediate,
            from_queue,
            custom_queue,
            preloaded_bytes,
        } = opts;

        if let Some(custom) = custom_queue {
            self.state.queue = if self.state.shuffle {
                queue::shuffle_pinned(&custom, Some(id), &mut *self.rng)
            } else {
                custom.clone()
            };
            self.state.original_queue = custom;
            self.cursor = None;
        } else if !from_queue {
            self.insert_for_play(id);
            self.cursor = None;
        }

        debug!(id, immediate, from_queue, "play track");
        self.state.current_track_id = Some(id.to_string());
        self.state.is_playing = true;
        self.position = 0.0;
        self.pending_load = None;
        self.push_history(id);
        if self.current_track.as_ref().is_some_and(|t| t.id != id) {
            self.current_track = None;
        }

        let bytes = preloaded_bytes.or_else(|| self.preloader.take_for(id));
        match (immediate, bytes) {
            (true, Some(bytes)) => {
                self.describe(id);
                self.start_source(id, bytes);
            }
            (true, None) => self.request_load(id),
            (false, _) => self.describe(id),
        }

        self.after_change();
    }

    pub fn toggle_play(&mut self) {
        if self.state.is_playing {
            self.output.pause();
            self.state.is_playing = false;
            self.persist();
            return;
        }
        if self.output.has_source() {
            if let Err(e) = self.output.play() {
                warn!("playback rejected: {e}");
            }
            return;
        }
        if self.pending_load.is_some() {
            return;
        }
        let target = self
            .state
            .current_track_id
            .clone()
            .or_else(|| self.state.queue.first().cloned());
        if let Some(id) = target {
            self.play_track(&id, PlayOptions::immediate().from_queue());
        }
    }

    pub fn pause(&mut self) {
        if self.state.is_playing {
            self.toggle_play();
        }
    }

    pub fn resume(&mut self) {
        if !self.state.is_playing {
            self.toggle_play();
        }
    }

    /// Pause and rewind to the start of the current track.
    pub fn stop(&mut self) {
        self.output.pause();
        self.output.set_current_time(0.0);
        self.position = 0.0;
        self.state.is_playing = false;
        self.persist();
    }

    pub fn next_track(&mut self) {
        let next = queue::next_index(
            self.state.queue.len(),
            self.current_index(),
            self.state.repeat,
        );
        match next {
            Some(i) => self.play_at(i),
            None => {
                debug!("end of queue");
                self.output.pause();
                self.state.is_playing = false;
                self.persist();
            }
        }
    }

    pub fn prev_track(&mut self) {
        let elapsed = sanitize_seconds(self.output.current_time());
        if elapsed > self.tuning.restart_threshold_secs {
            self.output.set_current_time(0.0);
            self.position = 0.0;
            return;
        }
        let prev = queue::prev_index(
            self.state.queue.len(),
            self.current_index(),
            self.state.repeat,
        );
        if let Some(i) = prev {
            self.play_at(i);
        }
    }

    pub fn toggle_shuffle(&mut self) {
        self.state.shuffle = !self.state.shuffle;
        self.state.queue = if self.state.shuffle {
            queue::shuffle_pinned(
                &self.state.original_queue,
                self.state.current_track_id.as_deref(),
                &mut *self.rng,
            )
        } else {
            self.state.original_queue.clone()
        };
        self.cursor = None;
        info!(shuffle = self.state.shuffle, "shuffle toggled");
        self.after_change();
    }

    /// Move to `time` seconds, clamped to the loaded duration.
    pub fn seek(&mut self, time: f64) {
        let duration = self.known_duration(self.output.duration());
        let target = if time.is_finite() {
            time.clamp(0.0, duration)
        } else {
            0.0
        };
        self.output.set_current_time(target);
        self.position = target;
    }

    /// Seek relative to the current position.
    pub fn seek_by(&mut self, delta: f64) {
        let now = sanitize_seconds(self.output.current_time());
        self.seek(now + delta);
    }

    pub fn set_volume(&mut self, volume: f64) {
        if volume.is_nan() {
            return;
        }
        let volume = volume.clamp(0.0, 1.0);
        self.state.volume = volume;
        self.output.set_volume(volume);
        self.persist();
    }

    pub fn set_repeat(&mut self, mode: RepeatMode) {
        self.state.repeat = mode;
        info!(repeat = %mode, "repeat mode set");
        self.after_change();
    }

    pub fn cycle_repeat(&mut self) {
        self.set_repeat(self.state.repeat.cycled());
    }

    pub fn set_automix(&mut self, enabled: bool) {
        self.state.automix = enabled;
        info!(automix = enabled, "automix set");
        self.after_change();
    }

    pub fn toggle_automix(&mut self) {
        self.set_automix(!self.state.automix);
    }

    /// Replace both queues. The current track stays current and, under
    /// shuffle, leads the new order when it is part of it.
    pub fn set_queue(&mut self, ids: Vec<TrackId>) {
        let pinned = self
            .state
            .current_track_id
            .as_deref()
            .filter(|c| ids.iter().any(|x| x == c));
        self.state.queue = if self.state.shuffle {
            queue::shuffle_pinned(&ids, pinned, &mut *self.rng)
        } else {
            ids.clone()
        };
        self.state.original_queue = ids;
        self.cursor = None;
        self.after_change();
    }

    /// Append `id` to the end of both orders.
    pub fn enqueue(&mut self, id: &str) {
        self.state.queue.push(id.to_string());
        if self.state.shuffle {
            self.state.original_queue.push(id.to_string());
        } else {
            self.sync_original();
        }
        self.after_change();
    }

    /// Drop the entry at `index` of the playback order.
    pub fn remove_from_queue(&mut self, index: usize) -> Option<TrackId> {
        if index >= self.state.queue.len() {
            return None;
        }
        let removed = self.state.queue.remove(index);
        if self.state.shuffle {
            if let Some(pos) = self.state.original_queue.iter().position(|x| *x == removed) {
                self.state.original_queue.remove(pos);
            }
        } else {
            self.sync_original();
        }
        self.cursor = match self.cursor {
            Some(c) if index < c => Some(c - 1),
            Some(c) if index == c => None,
            other => other,
        };
        self.after_change();
        Some(removed)
    }

    /// Move the entry at `from` so it ends up at `to`.
    pub fn move_queue_item(&mut self, from: usize, to: usize) {
        let len = self.state.queue.len();
        if from >= len || to >= len || from == to {
            return;
        }
        let item = self.state.queue.remove(from);
        self.state.queue.insert(to, item);
        self.cursor = self.cursor.map(|c| {
            if c == from {
                to
            } else if from < c && to >= c {
                c - 1
            } else if from > c && to <= c {
                c + 1
            } else {
                c
            }
        });
        if !self.state.shuffle {
            self.sync_original();
        }
        self.after_change();
    }

    /// Jump to position `index` of the playback order.
    pub fn play_queue_index(&mut self, index: usize) {
        if index < self.state.queue.len() {
            self.play_at(index);
        }
    }

    /// Wait for the next inbox event. `None` once the session is shut down.
    pub async fn recv_event(&mut self) -> Option<SessionEvent> {
        self.inbox.recv().await
    }

    /// Wait for one event and apply it.
    pub async fn process_next(&mut self) -> bool {
        match self.inbox.recv().await {
            Some(ev) => {
                self.apply_event(ev);
                true
            }
            None => false,
        }
    }

    /// Apply every event already queued, returning how many there were.
    pub fn process_pending(&mut self) -> usize {
        let mut n = 0;
        while let Ok(ev) = self.inbox.try_recv() {
            self.apply_event(ev);
            n += 1;
        }
        n
    }

    pub fn apply_event(&mut self, event: SessionEvent) {
        match event {
            SessionEvent::Output(ev) => self.on_output_event(ev),
            SessionEvent::Loaded {
                ticket,
                id,
                track,
                bytes,
            } => self.on_loaded(ticket, id, track, bytes),
            SessionEvent::Described { id, track } => {
                if self.state.current_track_id.as_deref() == Some(id.as_str()) {
                    self.current_track = track;
                }
            }
            SessionEvent::Preloaded { ticket, id, bytes } => {
                self.preloader.accept(ticket, &id, bytes);
            }
            SessionEvent::AutomixPool {
                ticket,
                after,
                candidates,
            } => self.on_automix_pool(ticket, after, candidates),
        }
    }

    /// Wait until every state change so far has been written.
    pub async fn flush(&self) {
        self.persister.flush().await;
    }

    /// Stop listening, release the output and persist the final state.
    pub async fn shutdown(mut self) {
        info!("session shutting down");
        if let Some(sub) = self.subscription.take() {
            sub.unsubscribe();
        }
        self.output.release();
        self.preloader.clear();
        self.state.is_playing = false;
        self.persist();
        self.persister.flush().await;
    }

    fn on_output_event(&mut self, event: AudioEvent) {
        match event {
            AudioEvent::TimeUpdate(t) => self.position = sanitize_seconds(t),
            AudioEvent::DurationChange(d) => self.duration = self.known_duration(d),
            AudioEvent::Play => self.set_playing(true),
            AudioEvent::Pause => self.set_playing(false),
            AudioEvent::Ended => self.on_ended(),
        }
    }

    /// `reported` when the source knows its length, else the tagged length
    /// of the loaded track.
    fn known_duration(&self, reported: f64) -> f64 {
        let reported = sanitize_seconds(reported);
        if reported > 0.0 || !self.output.has_source() {
            return reported;
        }
        self.current_track
            .as_ref()
            .filter(|t| self.state.current_track_id.as_deref() == Some(t.id.as_str()))
            .and_then(|t| t.duration)
            .map_or(0.0, |d| d.as_secs_f64())
    }

    fn set_playing(&mut self, playing: bool) {
        if self.state.is_playing != playing {
            self.state.is_playing = playing;
            self.persist();
        }
    }

    fn on_ended(&mut self) {
        if self.state.repeat == RepeatMode::One {
            self.output.set_current_time(0.0);
            self.position = 0.0;
            if let Err(e) = self.output.play() {
                warn!("replay rejected: {e}");
                self.set_playing(false);
            }
        } else {
            self.next_track();
        }
    }

    fn on_loaded(
        &mut self,
        ticket: u64,
        id: TrackId,
        track: Option<Track>,
        bytes: Option<AudioBytes>,
    ) {
        let expected = matches!(&self.pending_load, Some((t, p)) if *t == ticket && *p == id);
        if !expected || self.state.current_track_id.as_deref() != Some(id.as_str()) {
            debug!(id, ticket, "discarding stale load");
            return;
        }
        self.pending_load = None;
        match (track, bytes) {
            (Some(track), Some(bytes)) => {
                self.current_track = Some(track);
                if self.state.is_playing {
                    self.start_source(&id, bytes);
                } else if let Err(e) = self.output.set_source(bytes) {
                    warn!(id, "cannot load audio: {e}");
                }
            }
            (track, _) => {
                warn!(id, known = track.is_some(), "no playable audio for track");
                self.current_track = track;
                self.set_playing(false);
            }
        }
    }

    fn on_automix_pool(&mut self, ticket: u64, after: TrackId, candidates: Vec<Track>) {
        let expected = matches!(&self.pending_automix, Some((t, a)) if *t == ticket && *a == after);
        if !expected {
            debug!(after, "discarding stale automix pool");
            return;
        }
        self.pending_automix = None;
        if !self.wants_automix() || self.state.current_track_id.as_deref() != Some(after.as_str()) {
            return;
        }

        let from = match &self.current_track {
            Some(t) if t.id == after => Some(t.clone()),
            _ => candidates.iter().find(|t| t.id == after).cloned(),
        };
        let Some(from) = from else {
            debug!(after, "current track unknown to the store; no automix pick");
            return;
        };
        let recent: Vec<TrackId> = self.history.iter().cloned().collect();
        let pick = self
            .automix
            .get_smart_next_track(&from, &candidates, &recent, &mut *self.rng)
            .map(|t| t.id.clone());
        match pick {
            Some(id) => {
                info!(after, next = id, "automix queued next track");
                self.state.queue.push(id.clone());
                if self.state.shuffle {
                    self.state.original_queue.push(id);
                } else {
                    self.sync_original();
                }
                self.after_change();
            }
            None => debug!(after, "automix found no candidate"),
        }
    }

    /// Queue edits for playing `id` from outside the queue.
    fn insert_for_play(&mut self, id: &str) {
        let current = self.state.current_track_id.clone();
        if self.state.queue.is_empty() {
            self.state.queue = vec![id.to_string()];
            self.state.original_queue = self.state.queue.clone();
        } else if current.as_deref() == Some(id) {
            self.state.queue = queue::replay_pair(&self.state.queue, id);
            if !self.state.shuffle {
                self.sync_original();
            }
        } else {
            queue::insert_after_current(&mut self.state.queue, id, current.as_deref());
            if !self.state.shuffle {
                self.sync_original();
            } else if !self.state.original_queue.iter().any(|x| x == id) {
                self.state.original_queue.push(id.to_string());
            }
        }
    }

    fn play_at(&mut self, index: usize) {
        let Some(id) = self.state.queue.get(index).cloned() else {
            return;
        };
        self.cursor = Some(index);
        self.play_track(&id, PlayOptions::immediate().from_queue());
    }

    fn start_source(&mut self, id: &str, bytes: AudioBytes) {
        if let Err(e) = self.output.set_source(bytes) {
            warn!(id, "cannot load audio: {e}");
            self.set_playing(false);
            return;
        }
        self.position = 0.0;
        if let Err(e) = self.output.play() {
            warn!(id, "playback rejected: {e}");
            self.set_playing(false);
        }
    }

    fn request_load(&mut self, id: &str) {
        self.load_ticket += 1;
        let ticket = self.load_ticket;
        self.pending_load = Some((ticket, id.to_string()));

        let store = self.store.clone();
        let tx = self.inbox_tx.clone();
        let id = id.to_string();
        tokio::spawn(async move {
            let track = store.get_track(&id).await;
            let bytes = match track {
                Some(_) => store.get_audio_bytes(&id).await,
                None => None,
            };
            let _ = tx.send(SessionEvent::Loaded {
                ticket,
                id,
                track,
                bytes,
            });
        });
    }

    fn describe(&mut self, id: &str) {
        if self.current_track.as_ref().is_some_and(|t| t.id == id) {
            return;
        }
        let store = self.store.clone();
        let tx = self.inbox_tx.clone();
        let id = id.to_string();
        tokio::spawn(async move {
            let track = store.get_track(&id).await;
            let _ = tx.send(SessionEvent::Described { id, track });
        });
    }

    fn refresh_preload(&mut self) {
        let anticipated = self.anticipated_next();
        if let Some((ticket, id)) = self.preloader.retarget(anticipated) {
            debug!(id, "preloading");
            let store = self.store.clone();
            let tx = self.inbox_tx.clone();
            tokio::spawn(async move {
                let bytes = store.get_audio_bytes(&id).await;
                let _ = tx.send(SessionEvent::Preloaded { ticket, id, bytes });
            });
        }
    }

    fn wants_automix(&self) -> bool {
        if !self.state.automix || self.state.repeat != RepeatMode::Off {
            return false;
        }
        let idx = self.current_index();
        idx + 1 >= self.state.queue.len()
            && self.state.queue.get(idx) == self.state.current_track_id.as_ref()
    }

    /// Ask the store for candidates when the current track is the last one
    /// queued and nothing would follow it.
    fn maybe_extend_with_automix(&mut self) {
        if !self.wants_automix() {
            return;
        }
        let Some(current) = self.state.current_track_id.clone() else {
            return;
        };
        if self
            .pending_automix
            .as_ref()
            .is_some_and(|(_, after)| *after == current)
        {
            return;
        }
        self.automix_ticket += 1;
        let ticket = self.automix_ticket;
        self.pending_automix = Some((ticket, current.clone()));

        let store = self.store.clone();
        let tx = self.inbox_tx.clone();
        tokio::spawn(async move {
            let candidates = store.list_tracks().await;
            let _ = tx.send(SessionEvent::AutomixPool {
                ticket,
                after: current,
                candidates,
            });
        });
    }

    fn push_history(&mut self, id: &str) {
        if self.history.back().is_some_and(|last| last == id) {
            return;
        }
        self.history.push_back(id.to_string());
        while self.history.len() > self.tuning.history_len {
            self.history.pop_front();
        }
    }

    fn sync_original(&mut self) {
        self.state.original_queue = self.state.queue.clone();
    }

    fn after_change(&mut self) {
        self.refresh_preload();
        self.maybe_extend_with_automix();
        self.persist();
    }

    fn persist(&self) {
        let s = &self.state;
        let mut entries: Entries = vec![
            (keys::VOLUME, Some(toml::Value::Float(s.volume))),
            (keys::SHUFFLE, Some(toml::Value::Boolean(s.shuffle))),
            (
                keys::REPEAT,
                Some(toml::Value::String(s.repeat.as_str().to_string())),
            ),
            (keys::AUTOMIX, Some(toml::Value::Boolean(s.automix))),
            (
                keys::LAST_TRACK_ID,
                s.current_track_id.clone().map(toml::Value::String),
            ),
        ];
        match toml::Value::try_from(s) {
            Ok(snapshot) => entries.push((keys::PLAYBACK_STATE, Some(snapshot))),
            Err(e) => warn!("cannot encode playback snapshot: {e}"),
        }
        self.persister.write(entries);
    }
}
