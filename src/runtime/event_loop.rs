use std::time::Duration;

use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender};
use tracing::{debug, warn};

use crate::audio::AudioOutput;
use crate::controls::ControlCmd;
use crate::mpris::MprisHandle;
use crate::playback::PlaybackSession;

use super::mpris_sync::{Published, update_mpris};

const MPRIS_SYNC: Duration = Duration::from_millis(500);

/// Drive the session until a `Quit` arrives or every control source is gone.
pub async fn run<O: AudioOutput>(
    session: &mut PlaybackSession<O>,
    mpris: &MprisHandle,
    mut controls: UnboundedReceiver<ControlCmd>,
) {
    let mut tick = tokio::time::interval(MPRIS_SYNC);
    let mut published: Option<Published> = None;

    loop {
        tokio::select! {
            event = session.recv_event() => match event {
                Some(event) => session.apply_event(event),
                None => break,
            },
            cmd = controls.recv() => match cmd {
                Some(cmd) => {
                    if cmd.apply(session).is_break() {
                        break;
                    }
                }
                None => break,
            },
            _ = tick.tick() => {}
        }
        update_mpris(mpris, session, &mut published);
    }
}

/// Forward stdin lines as control commands. EOF just stops listening.
pub fn spawn_stdin_reader(tx: UnboundedSender<ControlCmd>) {
    tokio::spawn(async move {
        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        loop {
            match lines.next_line().await {
                Ok(Some(line)) if line.trim().is_empty() => {}
                Ok(Some(line)) => match line.parse::<ControlCmd>() {
                    Ok(cmd) => {
                        if tx.send(cmd).is_err() {
                            break;
                        }
                    }
                    Err(e) => warn!("{e}"),
                },
                Ok(None) => {
                    debug!("stdin closed");
                    break;
                }
                Err(e) => {
                    warn!("failed to read stdin: {e}");
                    break;
                }
            }
        }
    });
}
