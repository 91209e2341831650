use std::sync::mpsc::{self, Sender};
use std::sync::{Arc, Mutex};
use std::thread::JoinHandle;
use std::time::Duration;

use crate::config::AudioSettings;
use crate::error::{Error, Result};
use crate::library::AudioBytes;

use super::output::{AudioOutput, EventHub, Listener, Subscription};
use super::sink::decode;
use super::thread::{OutputCmd, OutputHandle, OutputInfo, spawn_output_thread};
use super::types::sanitize_seconds;

/// `AudioOutput` backed by the default rodio device.
///
/// The device lives on a dedicated thread; this handle forwards commands and
/// serves reads from state the thread mirrors back.
pub struct RodioOutput {
    tx: Sender<OutputCmd>,
    info: OutputHandle,
    hub: EventHub,
    fade_out: Duration,
    join: Mutex<Option<JoinHandle<()>>>,
}

impl RodioOutput {
    pub fn open(settings: &AudioSettings) -> Result<Self> {
        let (tx, rx) = mpsc::channel::<OutputCmd>();
        let (ready_tx, ready_rx) = mpsc::sync_channel::<Result<()>>(1);
        let info: OutputHandle = Arc::new(Mutex::new(OutputInfo::default()));
        let hub = EventHub::new();

        let handle = spawn_output_thread(rx, info.clone(), hub.clone(), ready_tx);
        ready_rx
            .recv()
            .map_err(|_| Error::AudioOutput("output thread exited during startup".into()))??;

        Ok(Self {
            tx,
            info,
            hub,
            fade_out: Duration::from_millis(settings.quit_fade_out_ms),
            join: Mutex::new(Some(handle)),
        })
    }

    fn send(&self, cmd: OutputCmd) -> Result<()> {
        self.tx
            .send(cmd)
            .map_err(|_| Error::AudioOutput("output thread is gone".into()))
    }

    fn read<T>(&self, f: impl FnOnce(&OutputInfo) -> T, fallback: T) -> T {
        self.info.lock().map(|i| f(&i)).unwrap_or(fallback)
    }
}

impl AudioOutput for RodioOutput {
    fn set_source(&mut self, bytes: AudioBytes) -> Result<()> {
        // Probe here so undecodable bytes fail the caller instead of the thread.
        decode(&bytes)?;
        if let Ok(mut i) = self.info.lock() {
            i.has_source = true;
            i.position = 0.0;
        }
        self.send(OutputCmd::SetSource(bytes))
    }

    fn clear_source(&mut self) {
        let _ = self.send(OutputCmd::Clear);
    }

    fn has_source(&self) -> bool {
        self.read(|i| i.has_source, false)
    }

    fn play(&mut self) -> Result<()> {
        if !self.has_source() {
            return Err(Error::PlayRejected("no source loaded".into()));
        }
        self.send(OutputCmd::Play)
    }

    fn pause(&mut self) {
        let _ = self.send(OutputCmd::Pause);
    }

    fn current_time(&self) -> f64 {
        self.read(|i| i.position, 0.0)
    }

    fn set_current_time(&mut self, secs: f64) {
        let secs = sanitize_seconds(secs);
        if let Ok(mut i) = self.info.lock() {
            i.position = secs;
        }
        let _ = self.send(OutputCmd::Seek(Duration::from_secs_f64(secs)));
    }

    fn duration(&self) -> f64 {
        self.read(|i| i.duration, f64::NAN)
    }

    fn volume(&self) -> f64 {
        self.read(|i| i.volume, 1.0)
    }

    fn set_volume(&mut self, volume: f64) {
        let volume = volume.clamp(0.0, 1.0);
        if let Ok(mut i) = self.info.lock() {
            i.volume = volume;
        }
        let _ = self.send(OutputCmd::SetVolume(volume as f32));
    }

    fn subscribe(&self, listener: Listener) -> Subscription {
        self.hub.subscribe(listener)
    }

    /// Fades out, stops the device thread and waits for it. Safe to call twice.
    fn release(&mut self) {
        let handle = self.join.lock().ok().and_then(|mut j| j.take());
        if let Some(h) = handle {
            let _ = self.send(OutputCmd::Quit {
                fade_out_ms: self.fade_out.as_millis() as u64,
            });
            let _ = h.join();
        }
    }
}

impl Drop for RodioOutput {
    fn drop(&mut self) {
        self.release();
    }
}
