use std::collections::HashMap;
use std::sync::mpsc::{self, Receiver, Sender, TryRecvError};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_io::{Timer, block_on};
use tokio::sync::mpsc::UnboundedSender;
use tracing::{debug, warn};
use zbus::object_server::InterfaceRef;
use zbus::{Connection, interface};
use zvariant::{ObjectPath, OwnedValue, Value};

use crate::controls::ControlCmd;
use crate::library::Track;
use crate::playback::RepeatMode;

const OBJECT_PATH: &str = "/org/mpris/MediaPlayer2";
const BUS_NAME: &str = "org.mpris.MediaPlayer2.segue";
const NOTIFY_POLL: Duration = Duration::from_millis(250);

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum PlaybackStatus {
    #[default]
    Stopped,
    Playing,
    Paused,
}

impl PlaybackStatus {
    fn as_str(self) -> &'static str {
        match self {
            PlaybackStatus::Stopped => "Stopped",
            PlaybackStatus::Playing => "Playing",
            PlaybackStatus::Paused => "Paused",
        }
    }
}

/// What the bus sees. Written by the runtime, read by the D-Bus thread.
#[derive(Debug, Default)]
struct SharedState {
    playback: PlaybackStatus,
    title: Option<String>,
    artist: Vec<String>,
    album: Option<String>,
    url: Option<String>,
    length_micros: Option<i64>,
    track_id: Option<ObjectPath<'static>>,
    position_micros: i64,
    volume: f64,
    shuffle: bool,
    repeat: RepeatMode,
}

pub struct MprisHandle {
    state: Arc<Mutex<SharedState>>,
    notify: Sender<()>,
}

impl MprisHandle {
    pub fn set_playback(&self, playback: PlaybackStatus) {
        if let Ok(mut s) = self.state.lock() {
            s.playback = playback;
        }
        self.changed();
    }

    /// `index` is the queue position; it only has to be unique per entry.
    pub fn set_track_metadata(&self, index: Option<usize>, track: Option<&Track>) {
        if let Ok(mut s) = self.state.lock() {
            s.title = track.map(|t| t.title.clone());
            s.artist = track.and_then(|t| t.artist.clone()).into_iter().collect();
            s.album = track.and_then(|t| t.album.clone());
            s.url = track.map(|t| format!("file://{}", t.path.display()));
            s.length_micros = track
                .and_then(|t| t.duration)
                .map(|d| d.as_micros().min(i64::MAX as u128) as i64);
            s.track_id = match (index, track) {
                (Some(i), Some(_)) => ObjectPath::try_from(format!("{OBJECT_PATH}/track/{i}")).ok(),
                _ => None,
            };
        }
        self.changed();
    }

    pub fn set_position(&self, secs: f64) {
        if let Ok(mut s) = self.state.lock() {
            s.position_micros = (secs.max(0.0) * 1e6) as i64;
        }
    }

    pub fn set_options(&self, volume: f64, shuffle: bool, repeat: RepeatMode) {
        if let Ok(mut s) = self.state.lock() {
            s.volume = volume;
            s.shuffle = shuffle;
            s.repeat = repeat;
        }
        self.changed();
    }

    fn changed(&self) {
        let _ = self.notify.send(());
    }
}

struct RootIface {
    tx: UnboundedSender<ControlCmd>,
}

#[interface(name = "org.mpris.MediaPlayer2")]
impl RootIface {
    fn raise(&self) {
        // Headless; nothing to raise.
    }

    fn quit(&self) {
        let _ = self.tx.send(ControlCmd::Quit);
    }

    #[zbus(property)]
    fn can_quit(&self) -> bool {
        true
    }

    #[zbus(property)]
    fn can_raise(&self) -> bool {
        false
    }

    #[zbus(property)]
    fn has_track_list(&self) -> bool {
        false
    }

    #[zbus(property)]
    fn identity(&self) -> &str {
        "segue"
    }

    #[zbus(property)]
    fn supported_uri_schemes(&self) -> Vec<String> {
        vec!["file".to_string()]
    }

    #[zbus(property)]
    fn supported_mime_types(&self) -> Vec<String> {
        vec![]
    }
}

struct PlayerIface {
    tx: UnboundedSender<ControlCmd>,
    state: Arc<Mutex<SharedState>>,
}

impl PlayerIface {
    fn send(&self, cmd: ControlCmd) {
        if self.tx.send(cmd).is_err() {
            debug!("MPRIS: control channel closed");
        }
    }

    fn read<T>(&self, f: impl FnOnce(&SharedState) -> T, fallback: T) -> T {
        self.state.lock().map(|s| f(&s)).unwrap_or(fallback)
    }
}

fn owned<'a>(v: impl Into<Value<'a>>) -> Option<OwnedValue> {
    OwnedValue::try_from(v.into()).ok()
}

#[interface(name = "org.mpris.MediaPlayer2.Player")]
impl PlayerIface {
    fn next(&self) {
        self.send(ControlCmd::Next);
    }

    fn previous(&self) {
        self.send(ControlCmd::Prev);
    }

    fn play(&self) {
        self.send(ControlCmd::Play);
    }

    fn pause(&self) {
        self.send(ControlCmd::Pause);
    }

    fn play_pause(&self) {
        self.send(ControlCmd::PlayPause);
    }

    fn stop(&self) {
        self.send(ControlCmd::Stop);
    }

    /// `offset` in microseconds, relative to the current position.
    fn seek(&self, offset: i64) {
        self.send(ControlCmd::SeekBy(offset as f64 / 1e6));
    }

    /// Ignored unless `track_id` names the current track.
    fn set_position(&self, track_id: ObjectPath<'_>, position: i64) {
        let current = self.read(|s| s.track_id.clone(), None);
        if current.as_ref().map(|p| p.as_str()) != Some(track_id.as_str()) || position < 0 {
            return;
        }
        self.send(ControlCmd::SetPosition(position as f64 / 1e6));
    }

    #[zbus(property)]
    fn playback_status(&self) -> &str {
        self.read(|s| s.playback.as_str(), PlaybackStatus::Stopped.as_str())
    }

    #[zbus(property)]
    fn loop_status(&self) -> &str {
        self.read(
            |s| match s.repeat {
                RepeatMode::Off => "None",
                RepeatMode::One => "Track",
                RepeatMode::All => "Playlist",
            },
            "None",
        )
    }

    #[zbus(property)]
    fn set_loop_status(&mut self, value: String) {
        let mode = match value.as_str() {
            "None" => RepeatMode::Off,
            "Track" => RepeatMode::One,
            "Playlist" => RepeatMode::All,
            other => {
                debug!("MPRIS: unknown loop status {other:?}");
                return;
            }
        };
        self.send(ControlCmd::SetRepeat(mode));
    }

    #[zbus(property)]
    fn shuffle(&self) -> bool {
        self.read(|s| s.shuffle, false)
    }

    #[zbus(property)]
    fn set_shuffle(&mut self, value: bool) {
        self.send(ControlCmd::SetShuffle(value));
    }

    #[zbus(property)]
    fn volume(&self) -> f64 {
        self.read(|s| s.volume, 0.0)
    }

    #[zbus(property)]
    fn set_volume(&mut self, value: f64) {
        self.send(ControlCmd::SetVolume(value));
    }

    #[zbus(property(emits_changed_signal = "false"))]
    fn position(&self) -> i64 {
        self.read(|s| s.position_micros, 0)
    }

    #[zbus(property)]
    fn rate(&self) -> f64 {
        1.0
    }

    #[zbus(property)]
    fn minimum_rate(&self) -> f64 {
        1.0
    }

    #[zbus(property)]
    fn maximum_rate(&self) -> f64 {
        1.0
    }

    #[zbus(property)]
    fn can_control(&self) -> bool {
        true
    }

    #[zbus(property)]
    fn can_play(&self) -> bool {
        true
    }

    #[zbus(property)]
    fn can_pause(&self) -> bool {
        true
    }

    #[zbus(property)]
    fn can_seek(&self) -> bool {
        true
    }

    #[zbus(property)]
    fn can_go_next(&self) -> bool {
        true
    }

    #[zbus(property)]
    fn can_go_previous(&self) -> bool {
        true
    }

    #[zbus(property)]
    fn metadata(&self) -> HashMap<String, OwnedValue> {
        let mut map = HashMap::new();
        let Ok(s) = self.state.lock() else {
            return map;
        };
        let mut put = |key: &str, value: Option<OwnedValue>| {
            if let Some(v) = value {
                map.insert(key.to_string(), v);
            }
        };
        put("mpris:trackid", s.track_id.clone().and_then(owned));
        put("xesam:title", owned(s.title.clone().unwrap_or_default()));
        if !s.artist.is_empty() {
            put("xesam:artist", owned(s.artist.clone()));
        }
        put("xesam:album", s.album.clone().and_then(owned));
        put("xesam:url", s.url.clone().and_then(owned));
        put("mpris:length", s.length_micros.and_then(owned));
        map
    }
}

async fn emit_changes(player: &InterfaceRef<PlayerIface>) {
    let emitter = player.signal_emitter();
    let iface = player.get().await;
    let results = [
        iface.playback_status_changed(emitter).await,
        iface.metadata_changed(emitter).await,
        iface.loop_status_changed(emitter).await,
        iface.shuffle_changed(emitter).await,
        iface.volume_changed(emitter).await,
    ];
    for res in results {
        if let Err(e) = res {
            debug!("MPRIS: failed to emit PropertiesChanged: {e}");
        }
    }
}

async fn serve(
    tx: UnboundedSender<ControlCmd>,
    state: Arc<Mutex<SharedState>>,
    notify: Receiver<()>,
) -> zbus::Result<()> {
    let connection = Connection::session().await?;
    connection.request_name(BUS_NAME).await?;

    let object_server = connection.object_server();
    object_server
        .at(OBJECT_PATH, RootIface { tx: tx.clone() })
        .await?;
    object_server
        .at(OBJECT_PATH, PlayerIface { tx, state })
        .await?;
    let player = object_server
        .interface::<_, PlayerIface>(OBJECT_PATH)
        .await?;
    debug!("MPRIS: serving {BUS_NAME}");

    loop {
        Timer::after(NOTIFY_POLL).await;
        let mut dirty = false;
        loop {
            match notify.try_recv() {
                Ok(()) => dirty = true,
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => return Ok(()),
            }
        }
        if dirty {
            emit_changes(&player).await;
        }
    }
}

/// Expose the session on the session bus from a dedicated thread. Bus
/// failures are logged and leave the player running without media keys.
pub fn spawn_mpris(tx: UnboundedSender<ControlCmd>) -> MprisHandle {
    let state = Arc::new(Mutex::new(SharedState {
        volume: 1.0,
        ..SharedState::default()
    }));
    let (notify_tx, notify_rx) = mpsc::channel::<()>();

    let state_for_thread = state.clone();
    std::thread::spawn(move || {
        if let Err(e) = block_on(serve(tx, state_for_thread, notify_rx)) {
            warn!("MPRIS unavailable: {e}");
        }
    });

    MprisHandle {
        state,
        notify: notify_tx,
    }
}
