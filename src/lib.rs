//! Headless music playback engine: a queue-driven playback session with
//! lookahead preloading and harmonic automix, plus the library, persistence,
//! audio output and MPRIS adapters a runnable player needs.

pub mod audio;
pub mod automix;
pub mod config;
pub mod controls;
pub mod error;
pub mod library;
pub mod mpris;
pub mod persist;
pub mod playback;
pub mod runtime;

pub use error::{Error, Result};
