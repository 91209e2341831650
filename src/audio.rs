//! Audio output: the `AudioOutput` contract, its event plumbing and the
//! rodio-backed implementation.

mod output;
mod player;
mod sink;
mod thread;
mod types;

pub use output::{AudioOutput, EventHub, Listener, Subscription};
pub use player::RodioOutput;
pub use types::{AudioEvent, sanitize_seconds};

#[cfg(test)]
mod tests;
