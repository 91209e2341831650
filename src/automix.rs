//! Automix: harmonic (Camelot) and tempo compatibility scoring, and the
//! weighted picker that chooses a next track from a library.
//!
//! Everything here is pure; randomness comes in through the caller's RNG.

mod key;
mod picker;
mod tempo;

pub use key::{CamelotKey, KeyMode, ParseKeyError, UNKNOWN_KEY_SCORE, key_compatibility};
pub use picker::{Automix, MixProfile};
pub use tempo::{
    DEFAULT_TEMPO_TOLERANCE, TEMPO_MISMATCH_SCORE, UNKNOWN_TEMPO_SCORE, bpm_compatibility,
    relative_tempo_error, tempo_compatibility,
};

#[cfg(test)]
mod tests;
