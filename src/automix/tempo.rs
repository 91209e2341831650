//! Tempo compatibility with half-time/double-time matching.

pub const DEFAULT_TEMPO_TOLERANCE: f64 = 0.15;
pub const UNKNOWN_TEMPO_SCORE: f64 = 0.6;
pub const TEMPO_MISMATCH_SCORE: f64 = 0.1;

const TEMPO_RATIOS: [f64; 3] = [1.0, 0.5, 2.0];

fn known(bpm: Option<f64>) -> Option<f64> {
    bpm.filter(|t| t.is_finite() && *t > 0.0)
}

/// Smallest relative difference between `t1` and `t2` scaled by 1, 1/2 or 2.
pub fn relative_tempo_error(t1: f64, t2: f64) -> f64 {
    TEMPO_RATIOS
        .iter()
        .map(|r| {
            let target = t2 * r;
            ((t1 - target) / target).abs()
        })
        .fold(f64::INFINITY, f64::min)
}

/// Linear decay from 1.0 at a perfect match to 0.0 at `tolerance`; anything
/// beyond scores 0.1. Unknown tempos score 0.6.
pub fn tempo_compatibility(a: Option<f64>, b: Option<f64>, tolerance: f64) -> f64 {
    let (Some(t1), Some(t2)) = (known(a), known(b)) else {
        return UNKNOWN_TEMPO_SCORE;
    };
    let e = relative_tempo_error(t1, t2);
    if e > tolerance {
        TEMPO_MISMATCH_SCORE
    } else {
        1.0 - e / tolerance
    }
}

pub fn bpm_compatibility(a: Option<f64>, b: Option<f64>) -> f64 {
    tempo_compatibility(a, b, DEFAULT_TEMPO_TOLERANCE)
}
