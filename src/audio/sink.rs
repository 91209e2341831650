//! Utilities for creating `rodio` sinks from encoded audio bytes.
//!
//! The helper here encapsulates decoding and preparing a paused `Sink` at the
//! requested start position.

use std::io::Cursor;
use std::time::Duration;

use rodio::{Decoder, OutputStream, Sink, Source};

use crate::error::{Error, Result};
use crate::library::AudioBytes;

/// The byte length lets the decoder work out a total duration for streams
/// without timing headers (CBR MP3, Vorbis).
pub(super) fn decode(bytes: &AudioBytes) -> Result<Decoder<Cursor<AudioBytes>>> {
    Decoder::builder()
        .with_data(Cursor::new(bytes.clone()))
        .with_byte_len(bytes.len() as u64)
        .with_seekable(true)
        .build()
        .map_err(|e| Error::Decode(e.to_string()))
}

/// Create a paused `Sink` for `bytes` that starts playback at `start_at`.
/// Also returns the total duration when the container reports one.
pub(super) fn create_sink_at(
    stream: &OutputStream,
    bytes: &AudioBytes,
    start_at: Duration,
    volume: f32,
) -> Result<(Sink, Option<Duration>)> {
    let source = decode(bytes)?;
    let total = source.total_duration();

    let sink = Sink::connect_new(stream.mixer());
    sink.set_volume(volume);
    // `skip_duration` is our seeking primitive; even Duration::ZERO is fine.
    sink.append(source.skip_duration(start_at));
    sink.pause();
    Ok((sink, total))
}
