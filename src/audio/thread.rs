use std::sync::mpsc::{Receiver, RecvTimeoutError, SyncSender};
use std::sync::{Arc, Mutex};
use std::thread;
use std::thread::JoinHandle;
use std::time::Duration;

use rodio::{OutputStreamBuilder, Sink};
use tracing::{debug, warn};

use crate::error::{Error, Result};
use crate::library::AudioBytes;

use super::output::EventHub;
use super::sink::create_sink_at;
use super::types::AudioEvent;

const TICK: Duration = Duration::from_millis(200);

#[derive(Debug)]
pub(super) enum OutputCmd {
    SetSource(AudioBytes),
    Clear,
    Play,
    Pause,
    Seek(Duration),
    SetVolume(f32),
    /// Stop the thread, fading out over `fade_out_ms` milliseconds first.
    Quit { fade_out_ms: u64 },
}

/// Output state mirrored for synchronous reads from the owning handle.
#[derive(Debug, Clone)]
pub(super) struct OutputInfo {
    pub position: f64,
    pub duration: f64,
    pub volume: f64,
    pub has_source: bool,
}

impl Default for OutputInfo {
    fn default() -> Self {
        Self {
            position: 0.0,
            duration: f64::NAN,
            volume: 1.0,
            has_source: false,
        }
    }
}

pub(super) type OutputHandle = Arc<Mutex<OutputInfo>>;

fn update(info: &OutputHandle, f: impl FnOnce(&mut OutputInfo)) {
    if let Ok(mut i) = info.lock() {
        f(&mut i);
    }
}

fn fade_out_sink(sink: &Sink, fade_out_ms: u64, volume: f32) {
    if fade_out_ms == 0 {
        sink.set_volume(0.0);
        return;
    }
    let steps: u64 = 20;
    let step_ms = (fade_out_ms / steps).max(1);
    for step in 1..=steps {
        let t = step as f32 / steps as f32;
        sink.set_volume(volume * (1.0 - t));
        thread::sleep(Duration::from_millis(step_ms));
    }
    sink.set_volume(0.0);
}

pub(super) fn spawn_output_thread(
    rx: Receiver<OutputCmd>,
    info: OutputHandle,
    hub: EventHub,
    ready: SyncSender<Result<()>>,
) -> JoinHandle<()> {
    thread::spawn(move || {
        let mut stream = match OutputStreamBuilder::open_default_stream() {
            Ok(s) => {
                let _ = ready.send(Ok(()));
                s
            }
            Err(e) => {
                let _ = ready.send(Err(Error::AudioOutput(e.to_string())));
                return;
            }
        };
        // rodio logs to stderr when OutputStream is dropped; we log through tracing instead.
        stream.log_on_drop(false);

        let mut bytes: Option<AudioBytes> = None;
        let mut sink: Option<Sink> = None;
        // Where the current sink started inside the track; rodio positions are relative to it.
        let mut offset = Duration::ZERO;
        let mut playing = false;
        let mut volume: f32 = 1.0;

        loop {
            match rx.recv_timeout(TICK) {
                Ok(cmd) => match cmd {
                    OutputCmd::SetSource(new_bytes) => {
                        if let Some(s) = sink.take() {
                            s.stop();
                        }
                        if playing {
                            playing = false;
                            hub.emit(AudioEvent::Pause);
                        }
                        offset = Duration::ZERO;
                        match create_sink_at(&stream, &new_bytes, Duration::ZERO, volume) {
                            Ok((s, total)) => {
                                sink = Some(s);
                                bytes = Some(new_bytes);
                                let total = total.map_or(f64::NAN, |d| d.as_secs_f64());
                                update(&info, |i| {
                                    i.has_source = true;
                                    i.position = 0.0;
                                    i.duration = total;
                                });
                                hub.emit(AudioEvent::DurationChange(total));
                                hub.emit(AudioEvent::TimeUpdate(0.0));
                            }
                            Err(e) => {
                                warn!("failed to load source: {e}");
                                bytes = None;
                                update(&info, |i| {
                                    i.has_source = false;
                                    i.position = 0.0;
                                    i.duration = f64::NAN;
                                });
                            }
                        }
                    }

                    OutputCmd::Clear => {
                        if let Some(s) = sink.take() {
                            s.stop();
                        }
                        bytes = None;
                        offset = Duration::ZERO;
                        if playing {
                            playing = false;
                            hub.emit(AudioEvent::Pause);
                        }
                        update(&info, |i| {
                            i.has_source = false;
                            i.position = 0.0;
                            i.duration = f64::NAN;
                        });
                    }

                    OutputCmd::Play => {
                        // A finished sink is empty; rewind like a media element would.
                        if sink.as_ref().is_some_and(|s| s.empty()) {
                            if let Some(b) = bytes.as_ref() {
                                match create_sink_at(&stream, b, Duration::ZERO, volume) {
                                    Ok((s, _)) => {
                                        sink = Some(s);
                                        offset = Duration::ZERO;
                                    }
                                    Err(e) => warn!("failed to rewind source: {e}"),
                                }
                            }
                        }
                        let Some(s) = sink.as_ref() else {
                            debug!("play requested without a source");
                            continue;
                        };
                        s.play();
                        if !playing {
                            playing = true;
                            hub.emit(AudioEvent::Play);
                        }
                    }

                    OutputCmd::Pause => {
                        if let Some(s) = sink.as_ref() {
                            s.pause();
                        }
                        if playing {
                            playing = false;
                            hub.emit(AudioEvent::Pause);
                        }
                    }

                    OutputCmd::Seek(to) => {
                        // Scrubbing: rebuild the sink and skip into the source.
                        let Some(b) = bytes.as_ref() else {
                            continue;
                        };
                        if let Some(s) = sink.take() {
                            s.stop();
                        }
                        match create_sink_at(&stream, b, to, volume) {
                            Ok((s, _)) => {
                                if playing {
                                    s.play();
                                }
                                sink = Some(s);
                                offset = to;
                                let secs = to.as_secs_f64();
                                update(&info, |i| i.position = secs);
                                hub.emit(AudioEvent::TimeUpdate(secs));
                            }
                            Err(e) => warn!("failed to seek: {e}"),
                        }
                    }

                    OutputCmd::SetVolume(v) => {
                        volume = v;
                        if let Some(s) = sink.as_ref() {
                            s.set_volume(v);
                        }
                        update(&info, |i| i.volume = v as f64);
                    }

                    OutputCmd::Quit { fade_out_ms } => {
                        if let Some(s) = sink.take() {
                            if playing {
                                fade_out_sink(&s, fade_out_ms, volume);
                            }
                            s.stop();
                        }
                        if playing {
                            hub.emit(AudioEvent::Pause);
                        }
                        update(&info, |i| i.has_source = false);
                        break;
                    }
                },
                Err(RecvTimeoutError::Timeout) => {
                    if !playing {
                        continue;
                    }
                    let Some(s) = sink.as_ref() else {
                        continue;
                    };
                    if s.empty() {
                        playing = false;
                        hub.emit(AudioEvent::Pause);
                        hub.emit(AudioEvent::Ended);
                    } else {
                        let secs = (offset + s.get_pos()).as_secs_f64();
                        update(&info, |i| i.position = secs);
                        hub.emit(AudioEvent::TimeUpdate(secs));
                    }
                }
                Err(RecvTimeoutError::Disconnected) => break,
            }
        }
    })
}
