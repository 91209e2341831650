use crate::audio::AudioOutput;
use crate::library::TrackId;
use crate::mpris::{MprisHandle, PlaybackStatus};
use crate::playback::{PlaybackSession, RepeatMode};

/// The last values pushed to MPRIS, so unchanged state is not re-announced.
#[derive(Debug, Clone, PartialEq)]
pub struct Published {
    index: Option<usize>,
    track: Option<TrackId>,
    has_metadata: bool,
    status: PlaybackStatus,
    volume: f64,
    shuffle: bool,
    repeat: RepeatMode,
}

pub fn update_mpris<O: AudioOutput>(
    mpris: &MprisHandle,
    session: &PlaybackSession<O>,
    published: &mut Option<Published>,
) {
    mpris.set_position(session.position());

    let state = session.state();
    let status = match (state.is_playing, &state.current_track_id) {
        (true, _) => PlaybackStatus::Playing,
        (false, Some(_)) => PlaybackStatus::Paused,
        (false, None) => PlaybackStatus::Stopped,
    };
    let now = Published {
        index: state.current_track_id.as_ref().map(|_| session.current_index()),
        track: state.current_track_id.clone(),
        has_metadata: session.current_track().is_some(),
        status,
        volume: state.volume,
        shuffle: state.shuffle,
        repeat: state.repeat,
    };
    let Some(last) = published.as_ref() else {
        push_all(mpris, session, &now);
        *published = Some(now);
        return;
    };
    if *last == now {
        return;
    }

    if (last.index, &last.track, last.has_metadata) != (now.index, &now.track, now.has_metadata) {
        mpris.set_track_metadata(now.index, session.current_track());
    }
    if last.status != now.status {
        mpris.set_playback(now.status);
    }
    if (last.volume, last.shuffle, last.repeat) != (now.volume, now.shuffle, now.repeat) {
        mpris.set_options(now.volume, now.shuffle, now.repeat);
    }
    *published = Some(now);
}

fn push_all<O: AudioOutput>(mpris: &MprisHandle, session: &PlaybackSession<O>, now: &Published) {
    mpris.set_track_metadata(now.index, session.current_track());
    mpris.set_playback(now.status);
    mpris.set_options(now.volume, now.shuffle, now.repeat);
}
