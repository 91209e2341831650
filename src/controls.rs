//! Remote-control commands shared by the stdin reader and the MPRIS adapter.

use std::ops::ControlFlow;
use std::str::FromStr;

use tracing::debug;

use crate::audio::AudioOutput;
use crate::library::TrackId;
use crate::playback::{PlayOptions, PlaybackSession, RepeatMode};

#[derive(Clone, Debug, PartialEq)]
pub enum ControlCmd {
    Quit,
    Play,
    Pause,
    PlayPause,
    Stop,
    Next,
    Prev,
    /// Relative seek in seconds.
    SeekBy(f64),
    /// Absolute position in seconds.
    SetPosition(f64),
    SetVolume(f64),
    ToggleShuffle,
    SetShuffle(bool),
    CycleRepeat,
    SetRepeat(RepeatMode),
    ToggleAutomix,
    /// Play the queue entry at this position.
    JumpTo(usize),
    /// Play a library track right after the current one.
    PlayTrack(TrackId),
    Enqueue(TrackId),
}

impl FromStr for ControlCmd {
    type Err = String;

    /// One command per line, e.g. `next`, `seek 42`, `+10`, `vol 0.5`.
    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let line = line.trim();
        let (word, arg) = match line.split_once(char::is_whitespace) {
            Some((w, a)) => (w, a.trim()),
            None => (line, ""),
        };
        let secs = |s: &str| {
            s.parse::<f64>()
                .ok()
                .filter(|v| v.is_finite())
                .ok_or_else(|| format!("not a number: {s:?}"))
        };

        let cmd = match word.to_ascii_lowercase().as_str() {
            "q" | "quit" | "exit" => ControlCmd::Quit,
            "play" if arg.is_empty() => ControlCmd::Play,
            "play" => ControlCmd::PlayTrack(arg.to_string()),
            "pause" => ControlCmd::Pause,
            "p" | "toggle" => ControlCmd::PlayPause,
            "stop" => ControlCmd::Stop,
            "n" | "next" => ControlCmd::Next,
            "prev" | "previous" => ControlCmd::Prev,
            "seek" => ControlCmd::SetPosition(secs(arg)?),
            "vol" | "volume" => ControlCmd::SetVolume(secs(arg)?),
            "shuffle" => ControlCmd::ToggleShuffle,
            "repeat" if arg.is_empty() => ControlCmd::CycleRepeat,
            "repeat" => ControlCmd::SetRepeat(arg.parse()?),
            "automix" => ControlCmd::ToggleAutomix,
            "jump" => ControlCmd::JumpTo(
                arg.parse()
                    .map_err(|_| format!("not a queue position: {arg:?}"))?,
            ),
            "add" | "enqueue" if !arg.is_empty() => ControlCmd::Enqueue(arg.to_string()),
            w if w.starts_with(['+', '-']) && arg.is_empty() => ControlCmd::SeekBy(secs(w)?),
            "" => return Err("empty command".to_string()),
            other => return Err(format!("unknown command: {other}")),
        };
        Ok(cmd)
    }
}

impl ControlCmd {
    /// Run the command against `session`. `Break` means shut down.
    pub fn apply<O: AudioOutput>(self, session: &mut PlaybackSession<O>) -> ControlFlow<()> {
        debug!(cmd = ?self, "control command");
        match self {
            ControlCmd::Quit => return ControlFlow::Break(()),
            ControlCmd::Play => session.resume(),
            ControlCmd::Pause => session.pause(),
            ControlCmd::PlayPause => session.toggle_play(),
            ControlCmd::Stop => session.stop(),
            ControlCmd::Next => session.next_track(),
            ControlCmd::Prev => session.prev_track(),
            ControlCmd::SeekBy(delta) => session.seek_by(delta),
            ControlCmd::SetPosition(secs) => session.seek(secs),
            ControlCmd::SetVolume(v) => session.set_volume(v),
            ControlCmd::ToggleShuffle => session.toggle_shuffle(),
            ControlCmd::SetShuffle(on) => {
                if session.state().shuffle != on {
                    session.toggle_shuffle();
                }
            }
            ControlCmd::CycleRepeat => session.cycle_repeat(),
            ControlCmd::SetRepeat(mode) => session.set_repeat(mode),
            ControlCmd::ToggleAutomix => session.toggle_automix(),
            ControlCmd::JumpTo(index) => session.play_queue_index(index),
            ControlCmd::PlayTrack(id) => session.play_track(&id, PlayOptions::immediate()),
            ControlCmd::Enqueue(id) => session.enqueue(&id),
        }
        ControlFlow::Continue(())
    }
}

#[cfg(test)]
mod tests;
