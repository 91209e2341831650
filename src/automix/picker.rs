//! Picks the next track by harmonic and tempo fit.

use rand::{Rng, RngExt};

use crate::config::AutomixSettings;
use crate::library::{Track, TrackId};

use super::key::{CamelotKey, KeyMode};
use super::tempo::tempo_compatibility;

/// Key and tempo used for scoring; real tags win, gaps are synthesized.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MixProfile {
    pub key: CamelotKey,
    pub tempo: f64,
}

/// 32-bit FNV-1a. Stable across runs and platforms, unlike `DefaultHasher`.
fn fnv1a(bytes: &[u8]) -> u32 {
    bytes.iter().fold(0x811c_9dc5u32, |h, b| {
        (h ^ *b as u32).wrapping_mul(0x0100_0193)
    })
}

impl MixProfile {
    pub fn of(track: &Track) -> Self {
        let h = fnv1a(track.id.as_bytes());
        let key = track
            .key
            .as_deref()
            .and_then(|k| k.parse::<CamelotKey>().ok())
            .unwrap_or_else(|| {
                let mode = if (h >> 4) & 1 == 0 { KeyMode::A } else { KeyMode::B };
                CamelotKey::on_wheel(h, mode)
            });
        let tempo = track
            .tempo
            .filter(|t| t.is_finite() && *t > 0.0)
            .unwrap_or(80.0 + ((h >> 8) % 80) as f64);
        Self { key, tempo }
    }
}

#[derive(Debug, Clone, Default)]
pub struct Automix {
    settings: AutomixSettings,
}

impl Automix {
    pub fn new(settings: AutomixSettings) -> Self {
        Self { settings }
    }

    pub fn settings(&self) -> &AutomixSettings {
        &self.settings
    }

    /// Weighted key + tempo score of moving from `from` to `to`, without jitter.
    pub fn score(&self, from: &MixProfile, to: &MixProfile) -> f64 {
        let key = from.key.compatibility(&to.key);
        let tempo = tempo_compatibility(
            Some(from.tempo),
            Some(to.tempo),
            self.settings.tempo_tolerance,
        );
        self.settings.key_weight * key + self.settings.tempo_weight * tempo
    }

    fn slice_len(&self, pool: usize) -> usize {
        let by_fraction = (self.settings.top_fraction * pool as f64).floor() as usize;
        by_fraction.min(self.settings.top_max).max(1)
    }

    /// Pick a successor for `current` among `candidates`.
    ///
    /// The current track and anything in `recent_history` are never returned.
    /// The best few matches are drawn from at random, weighted by score, so
    /// the same library does not always mix the same way.
    pub fn get_smart_next_track<'a, R: Rng + ?Sized>(
        &self,
        current: &Track,
        candidates: &'a [Track],
        recent_history: &[TrackId],
        rng: &mut R,
    ) -> Option<&'a Track> {
        let pool: Vec<&Track> = candidates
            .iter()
            .filter(|t| t.id != current.id && !recent_history.contains(&t.id))
            .collect();
        if pool.is_empty() {
            return None;
        }

        let from = MixProfile::of(current);
        let mut scored: Vec<(&Track, f64)> = pool
            .iter()
            .map(|t| {
                let jitter = rng.random_range(0.0..1.0) * self.settings.jitter;
                (*t, self.score(&from, &MixProfile::of(t)) + jitter)
            })
            .collect();
        scored.sort_by(|a, b| b.1.total_cmp(&a.1));
        scored.truncate(self.slice_len(pool.len()));

        let total: f64 = scored.iter().map(|(_, s)| s).sum();
        if !(total > 0.0 && total.is_finite()) {
            return scored.first().map(|(t, _)| *t);
        }
        let mut remaining = rng.random_range(0.0..total);
        for (track, weight) in &scored {
            remaining -= weight;
            if remaining < 0.0 {
                return Some(*track);
            }
        }
        // Float rounding can leave a sliver past the last weight.
        scored.last().map(|(t, _)| *t)
    }
}
