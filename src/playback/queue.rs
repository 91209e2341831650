//! Queue ordering rules shared by navigation and preloading.
//!
//! `next_index` is the single positional rule for "what plays after this";
//! both `PlaybackSession::next_track` and the preloader go through it.

use std::iter;

use rand::{Rng, RngExt};

use crate::library::TrackId;

use super::state::RepeatMode;

/// Uniform in-place Fisher-Yates shuffle, swapping from the end.
pub fn fisher_yates<T, R: Rng + ?Sized>(items: &mut [T], rng: &mut R) {
    for i in (1..items.len()).rev() {
        let j = rng.random_range(0..=i);
        items.swap(i, j);
    }
}

/// `order` without `pinned`, shuffled, with `pinned` (if any) in front.
pub fn shuffle_pinned<R: Rng + ?Sized>(
    order: &[TrackId],
    pinned: Option<&str>,
    rng: &mut R,
) -> Vec<TrackId> {
    let mut rest: Vec<TrackId> = order
        .iter()
        .filter(|id| Some(id.as_str()) != pinned)
        .cloned()
        .collect();
    fisher_yates(&mut rest, rng);
    match pinned {
        Some(id) => iter::once(id.to_string()).chain(rest).collect(),
        None => rest,
    }
}

/// Move `id` to just after `current`, or to the front when `current` is not
/// queued.
pub fn insert_after_current(queue: &mut Vec<TrackId>, id: &str, current: Option<&str>) {
    queue.retain(|x| x != id);
    let at = current
        .and_then(|c| queue.iter().position(|x| x == c))
        .map_or(0, |i| i + 1);
    queue.insert(at, id.to_string());
}

/// `[id, id, ...queue without id]`: replaying the current track from the
/// library queues it twice at the front.
pub fn replay_pair(queue: &[TrackId], id: &str) -> Vec<TrackId> {
    iter::repeat_n(id.to_string(), 2)
        .chain(queue.iter().filter(|x| *x != id).cloned())
        .collect()
}

/// Index of `current` in `queue`. `cursor` disambiguates duplicates when it
/// still points at `current`; a missing current counts as index 0.
pub fn resolve_index(queue: &[TrackId], current: Option<&str>, cursor: Option<usize>) -> usize {
    let Some(current) = current else {
        return 0;
    };
    if let Some(c) = cursor.filter(|&c| queue.get(c).is_some_and(|x| x == current)) {
        return c;
    }
    queue.iter().position(|x| x == current).unwrap_or(0)
}

/// Position that follows `idx`, wrapping only under `RepeatMode::All`.
pub fn next_index(len: usize, idx: usize, repeat: RepeatMode) -> Option<usize> {
    if len == 0 {
        None
    } else if idx + 1 < len {
        Some(idx + 1)
    } else if repeat == RepeatMode::All {
        Some(0)
    } else {
        None
    }
}

/// Position before `idx`, wrapping to the end only under `RepeatMode::All`.
pub fn prev_index(len: usize, idx: usize, repeat: RepeatMode) -> Option<usize> {
    if len == 0 {
        None
    } else if idx > 0 && idx < len {
        Some(idx - 1)
    } else if repeat == RepeatMode::All {
        Some(len - 1)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn ids(v: &[&str]) -> Vec<TrackId> {
        v.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn fisher_yates_is_a_permutation_and_seeded() {
        let mut a: Vec<u32> = (0..50).collect();
        let mut b = a.clone();
        fisher_yates(&mut a, &mut StdRng::seed_from_u64(9));
        fisher_yates(&mut b, &mut StdRng::seed_from_u64(9));
        assert_eq!(a, b);
        assert_ne!(a, (0..50).collect::<Vec<_>>());
        let mut sorted = a.clone();
        sorted.sort_unstable();
        assert_eq!(sorted, (0..50).collect::<Vec<_>>());
    }

    #[test]
    fn fisher_yates_handles_tiny_slices() {
        let mut rng = StdRng::seed_from_u64(0);
        let mut empty: Vec<u8> = vec![];
        fisher_yates(&mut empty, &mut rng);
        let mut one = vec![1];
        fisher_yates(&mut one, &mut rng);
        assert_eq!(one, vec![1]);
    }

    #[test]
    fn shuffle_pinned_keeps_pinned_first_and_members_intact() {
        let order = ids(&["a", "b", "c", "d", "e"]);
        let mut rng = StdRng::seed_from_u64(1);
        let out = shuffle_pinned(&order, Some("c"), &mut rng);
        assert_eq!(out[0], "c");
        let mut sorted = out.clone();
        sorted.sort();
        assert_eq!(sorted, order);

        let unpinned = shuffle_pinned(&order, None, &mut rng);
        assert_eq!(unpinned.len(), 5);
    }

    #[test]
    fn insert_after_current_moves_existing_entry() {
        let mut q = ids(&["a", "b", "c", "d"]);
        insert_after_current(&mut q, "d", Some("a"));
        assert_eq!(q, ids(&["a", "d", "b", "c"]));

        insert_after_current(&mut q, "x", Some("c"));
        assert_eq!(q, ids(&["a", "d", "b", "c", "x"]));

        insert_after_current(&mut q, "b", Some("zzz"));
        assert_eq!(q, ids(&["b", "a", "d", "c", "x"]));
    }

    #[test]
    fn replay_pair_puts_two_copies_in_front() {
        let q = ids(&["a", "b", "c"]);
        assert_eq!(replay_pair(&q, "b"), ids(&["b", "b", "a", "c"]));
    }

    #[test]
    fn resolve_index_prefers_cursor_for_duplicates() {
        let q = ids(&["a", "a", "b"]);
        assert_eq!(resolve_index(&q, Some("a"), None), 0);
        assert_eq!(resolve_index(&q, Some("a"), Some(1)), 1);
        // A cursor that no longer points at current is ignored.
        assert_eq!(resolve_index(&q, Some("b"), Some(1)), 2);
        assert_eq!(resolve_index(&q, Some("zzz"), None), 0);
        assert_eq!(resolve_index(&q, None, Some(2)), 0);
    }

    #[test]
    fn next_and_prev_wrap_only_under_repeat_all() {
        assert_eq!(next_index(3, 0, RepeatMode::Off), Some(1));
        assert_eq!(next_index(3, 2, RepeatMode::Off), None);
        assert_eq!(next_index(3, 2, RepeatMode::One), None);
        assert_eq!(next_index(3, 2, RepeatMode::All), Some(0));
        assert_eq!(next_index(0, 0, RepeatMode::All), None);

        assert_eq!(prev_index(3, 2, RepeatMode::Off), Some(1));
        assert_eq!(prev_index(3, 0, RepeatMode::Off), None);
        assert_eq!(prev_index(3, 0, RepeatMode::All), Some(2));
        assert_eq!(prev_index(0, 0, RepeatMode::All), None);
    }
}
