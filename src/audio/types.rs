//! Audio-related small types shared by outputs and the playback session.

/// Native notifications emitted by an `AudioOutput`.
///
/// These are the source of truth for position, duration and whether audio
/// is actually playing.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AudioEvent {
    /// Playback position moved, in seconds.
    TimeUpdate(f64),
    /// Duration of the loaded source became known or changed, in seconds.
    /// May be NaN when the source cannot tell.
    DurationChange(f64),
    /// The source played to its end.
    Ended,
    /// Audio started (or resumed).
    Play,
    /// Audio stopped advancing: user pause, source swap, end of media, or an
    /// interruption from outside the session.
    Pause,
}

/// Seconds as reported by an output, with NaN, infinities and negatives
/// collapsed to 0.
pub fn sanitize_seconds(secs: f64) -> f64 {
    if secs.is_finite() && secs > 0.0 {
        secs
    } else {
        0.0
    }
}
