use std::collections::HashSet;
use std::path::PathBuf;

use rand::SeedableRng;
use rand::rngs::StdRng;

use super::*;
use crate::config::AutomixSettings;
use crate::library::Track;

fn t(id: &str, key: Option<&str>, tempo: Option<f64>) -> Track {
    Track {
        id: id.into(),
        path: PathBuf::new(),
        title: id.into(),
        artist: None,
        album: None,
        duration: None,
        key: key.map(str::to_string),
        tempo,
        cover: None,
    }
}

fn approx(a: f64, b: f64) -> bool {
    (a - b).abs() < 1e-9
}

#[test]
fn key_compatibility_follows_the_camelot_wheel() {
    assert_eq!(key_compatibility(Some("8A"), Some("8A")), 1.0);
    assert_eq!(key_compatibility(Some("8A"), Some("8B")), 1.0);
    assert_eq!(key_compatibility(Some("8A"), Some("9A")), 0.9);
    assert_eq!(key_compatibility(Some("8A"), Some("7B")), 0.7);
    assert_eq!(key_compatibility(Some("8A"), Some("10A")), 0.6);
    assert_eq!(key_compatibility(Some("8A"), Some("10B")), 0.1);
    assert_eq!(key_compatibility(Some("8A"), Some("2A")), 0.1);
}

#[test]
fn key_compatibility_wraps_around_twelve() {
    assert_eq!(key_compatibility(Some("1A"), Some("12A")), 0.9);
    assert_eq!(key_compatibility(Some("12B"), Some("2B")), 0.6);
}

#[test]
fn unknown_or_garbage_keys_are_neutral() {
    assert_eq!(key_compatibility(None, Some("8A")), 0.5);
    assert_eq!(key_compatibility(Some("8A"), None), 0.5);
    assert_eq!(key_compatibility(Some("13A"), Some("8A")), 0.5);
    assert_eq!(key_compatibility(Some("H minor"), Some("8A")), 0.5);
    assert_eq!(key_compatibility(Some("8♭"), Some("8A")), 0.5);
}

#[test]
fn musical_notation_maps_onto_camelot() {
    let k = |s: &str| s.parse::<CamelotKey>().unwrap().to_string();
    assert_eq!(k("Am"), "8A");
    assert_eq!(k("C"), "8B");
    assert_eq!(k("C major"), "8B");
    assert_eq!(k("G#m"), "1A");
    assert_eq!(k("Abm"), "1A");
    assert_eq!(k("B"), "1B");
    assert_eq!(k("Bb major"), "6B");
    assert_eq!(k("F minor"), "4A");
    assert_eq!(k("E"), "12B");
    assert_eq!(k("C#m"), "12A");
    assert_eq!(k(" 08a "), "8A");
    assert_eq!(key_compatibility(Some("Am"), Some("C")), 1.0);
}

#[test]
fn bpm_compatibility_matches_half_and_double_time() {
    assert_eq!(bpm_compatibility(Some(120.0), Some(120.0)), 1.0);
    assert!(approx(bpm_compatibility(Some(120.0), Some(60.0)), 1.0));
    assert!(approx(bpm_compatibility(Some(60.0), Some(120.0)), 1.0));
    assert!(bpm_compatibility(Some(120.0), Some(140.0)) < bpm_compatibility(Some(120.0), Some(125.0)));
}

#[test]
fn bpm_compatibility_decays_linearly_then_bottoms_out() {
    // 6% off is 40% of the way to the 15% threshold.
    assert!(approx(bpm_compatibility(Some(106.0), Some(100.0)), 0.6));
    assert_eq!(bpm_compatibility(Some(150.0), Some(100.0)), TEMPO_MISMATCH_SCORE);
    assert_eq!(bpm_compatibility(None, Some(100.0)), UNKNOWN_TEMPO_SCORE);
    assert_eq!(bpm_compatibility(Some(f64::NAN), Some(100.0)), UNKNOWN_TEMPO_SCORE);
    assert_eq!(bpm_compatibility(Some(0.0), Some(100.0)), UNKNOWN_TEMPO_SCORE);
}

#[test]
fn mix_profile_keeps_real_tags_and_synthesizes_stably() {
    let tagged = t("x", Some("5B"), Some(128.0));
    let p = MixProfile::of(&tagged);
    assert_eq!(p.key.to_string(), "5B");
    assert_eq!(p.tempo, 128.0);

    let bare = t("some/untagged.mp3", None, None);
    let a = MixProfile::of(&bare);
    let b = MixProfile::of(&bare);
    assert_eq!(a, b);
    assert!((80.0..160.0).contains(&a.tempo));
    assert!((1..=12).contains(&a.key.number()));
}

#[test]
fn smart_next_never_returns_current_or_recent() {
    let current = t("now", Some("8A"), Some(120.0));
    let pool: Vec<Track> = (0..30)
        .map(|i| t(&format!("t{i}"), None, None))
        .chain(std::iter::once(current.clone()))
        .collect();
    let recent: Vec<String> = (0..10).map(|i| format!("t{i}")).collect();

    let automix = Automix::default();
    let mut rng = StdRng::seed_from_u64(7);
    for _ in 0..200 {
        let pick = automix
            .get_smart_next_track(&current, &pool, &recent, &mut rng)
            .unwrap();
        assert_ne!(pick.id, current.id);
        assert!(!recent.contains(&pick.id));
    }
}

#[test]
fn smart_next_with_exhausted_pool_returns_none() {
    let current = t("now", None, None);
    let pool = vec![current.clone(), t("a", None, None)];
    let mut rng = StdRng::seed_from_u64(1);
    let automix = Automix::default();
    assert!(
        automix
            .get_smart_next_track(&current, &pool, &["a".to_string()], &mut rng)
            .is_none()
    );
    assert!(automix.get_smart_next_track(&current, &[], &[], &mut rng).is_none());
}

#[test]
fn smart_next_draws_only_from_the_top_slice() {
    // 20 candidates -> slice of min(5, floor(0.2 * 20)) = 4.
    let current = t("now", Some("8A"), Some(120.0));
    let mut pool = vec![
        t("p1", Some("8A"), Some(120.0)),
        t("p2", Some("8B"), Some(120.0)),
        t("p3", Some("9A"), Some(120.0)),
        t("p4", Some("7A"), Some(121.0)),
    ];
    for i in 0..16 {
        pool.push(t(&format!("bad{i}"), Some("2B"), Some(170.0)));
    }

    let automix = Automix::default();
    let mut rng = StdRng::seed_from_u64(42);
    let mut seen = HashSet::new();
    for _ in 0..300 {
        let pick = automix
            .get_smart_next_track(&current, &pool, &[], &mut rng)
            .unwrap();
        seen.insert(pick.id.clone());
    }
    assert!(seen.iter().all(|id| id.starts_with('p')), "{seen:?}");
    // The draw is weighted, not argmax.
    assert!(seen.len() > 1);
}

#[test]
fn small_pools_still_get_a_pick() {
    let current = t("now", Some("8A"), Some(120.0));
    let pool = vec![t("only", Some("3B"), Some(90.0))];
    let automix = Automix::new(AutomixSettings {
        jitter: 0.0,
        ..AutomixSettings::default()
    });
    let mut rng = StdRng::seed_from_u64(3);
    let pick = automix.get_smart_next_track(&current, &pool, &[], &mut rng);
    assert_eq!(pick.map(|t| t.id.as_str()), Some("only"));
}

#[test]
fn score_weights_tempo_over_key() {
    let automix = Automix::default();
    let from = MixProfile::of(&t("a", Some("8A"), Some(120.0)));
    let same_tempo_far_key = MixProfile::of(&t("b", Some("2B"), Some(120.0)));
    let same_key_far_tempo = MixProfile::of(&t("c", Some("8A"), Some(170.0)));
    assert!(approx(automix.score(&from, &same_tempo_far_key), 0.3 * 0.1 + 0.7));
    assert!(approx(automix.score(&from, &same_key_far_tempo), 0.3 + 0.7 * 0.1));
    assert!(automix.score(&from, &same_tempo_far_key) > automix.score(&from, &same_key_far_tempo));
}

#[test]
fn smart_next_survives_unbounded_weights() {
    let current = t("now", Some("8A"), Some(120.0));
    let pool = vec![t("a", Some("8A"), Some(120.0)), t("b", Some("3B"), Some(80.0))];
    let automix = Automix::new(AutomixSettings {
        key_weight: f64::INFINITY,
        ..AutomixSettings::default()
    });
    let mut rng = StdRng::seed_from_u64(5);
    let pick = automix.get_smart_next_track(&current, &pool, &[], &mut rng);
    assert!(pick.is_some_and(|p| p.id != current.id));
}
