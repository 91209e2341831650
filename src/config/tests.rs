use super::load::{default_config_path, default_state_path, resolve_config_path};
use super::schema::*;
use crate::playback::RepeatMode;
use std::sync::{Mutex, OnceLock};

static ENV_LOCK: OnceLock<Mutex<()>> = OnceLock::new();

fn env_lock() -> std::sync::MutexGuard<'static, ()> {
    ENV_LOCK
        .get_or_init(|| Mutex::new(()))
        .lock()
        .unwrap_or_else(|e| e.into_inner())
}

struct EnvGuard {
    key: &'static str,
    old: Option<std::ffi::OsString>,
}

impl EnvGuard {
    fn set(key: &'static str, val: &str) -> Self {
        let old = std::env::var_os(key);
        unsafe {
            std::env::set_var(key, val);
        }
        Self { key, old }
    }

    fn remove(key: &'static str) -> Self {
        let old = std::env::var_os(key);
        unsafe {
            std::env::remove_var(key);
        }
        Self { key, old }
    }
}

impl Drop for EnvGuard {
    fn drop(&mut self) {
        match self.old.take() {
            Some(v) => unsafe {
                std::env::set_var(self.key, v);
            },
            None => unsafe {
                std::env::remove_var(self.key);
            },
        }
    }
}

#[test]
fn resolve_config_path_prefers_segue_config_path() {
    let _lock = env_lock();
    let _g1 = EnvGuard::set("SEGUE_CONFIG_PATH", "/tmp/segue-test-config.toml");
    assert_eq!(
        resolve_config_path().unwrap(),
        std::path::PathBuf::from("/tmp/segue-test-config.toml")
    );
}

#[test]
fn default_config_path_prefers_xdg_config_home() {
    let _lock = env_lock();
    let _g1 = EnvGuard::set("XDG_CONFIG_HOME", "/tmp/xdg-config-home");
    let _g2 = EnvGuard::set("HOME", "/tmp/home-should-not-win");

    let p = default_config_path().unwrap();
    assert_eq!(
        p,
        std::path::PathBuf::from("/tmp/xdg-config-home")
            .join("segue")
            .join("config.toml")
    );
}

#[test]
fn default_state_path_falls_back_to_home_local_state() {
    let _lock = env_lock();
    let _g1 = EnvGuard::remove("SEGUE_STATE_PATH");
    let _g2 = EnvGuard::remove("XDG_STATE_HOME");
    let _g3 = EnvGuard::set("HOME", "/tmp/home-dir");

    let p = default_state_path().unwrap();
    assert_eq!(
        p,
        std::path::PathBuf::from("/tmp/home-dir")
            .join(".local/state")
            .join("segue")
            .join("state.toml")
    );
}

#[test]
fn defaults_keep_the_tuned_navigation_and_automix_constants() {
    let s = Settings::default();
    assert_eq!(s.session.restart_threshold_secs, 3.0);
    assert_eq!(s.automix.key_weight, 0.3);
    assert_eq!(s.automix.tempo_weight, 0.7);
    assert_eq!(s.automix.jitter, 0.05);
    assert_eq!(s.automix.tempo_tolerance, 0.15);
    assert_eq!(s.automix.top_fraction, 0.2);
    assert_eq!(s.automix.top_max, 5);
    assert!(s.validate().is_ok());
}

#[test]
fn settings_load_from_config_file_and_parse_repeat_aliases() {
    let _lock = env_lock();

    let dir = tempfile::tempdir().unwrap();
    let cfg_path = dir.path().join("config.toml");
    std::fs::write(
        &cfg_path,
        r#"
[playback]
shuffle = true
repeat = "repeat-one"
volume = 0.4

[audio]
quit_fade_out_ms = 123

[session]
restart_threshold_secs = 5.0
history_len = 3

[automix]
jitter = 0.0
top_max = 2

[library]
extensions = ["mp3"]
recursive = false
include_hidden = false
follow_links = false

[log]
filter = "segue=debug"
"#,
    )
    .unwrap();

    let _g1 = EnvGuard::set("SEGUE_CONFIG_PATH", cfg_path.to_str().unwrap());
    let _g2 = EnvGuard::remove("SEGUE__AUDIO__QUIT_FADE_OUT_MS");

    let s = Settings::load().unwrap();
    assert!(s.playback.shuffle);
    assert_eq!(RepeatMode::from(s.playback.repeat), RepeatMode::One);
    assert_eq!(s.playback.volume, 0.4);
    assert_eq!(s.audio.quit_fade_out_ms, 123);
    assert_eq!(s.session.restart_threshold_secs, 5.0);
    assert_eq!(s.session.history_len, 3);
    assert_eq!(s.automix.jitter, 0.0);
    assert_eq!(s.automix.top_max, 2);
    // Untouched keys keep their defaults.
    assert_eq!(s.automix.key_weight, 0.3);
    assert_eq!(s.library.extensions, vec!["mp3".to_string()]);
    assert!(!s.library.recursive);
    assert!(!s.library.include_hidden);
    assert!(!s.library.follow_links);
    assert_eq!(s.log.filter, "segue=debug");
}

#[test]
fn settings_env_overrides_config_file() {
    let _lock = env_lock();

    let dir = tempfile::tempdir().unwrap();
    let cfg_path = dir.path().join("config.toml");
    std::fs::write(
        &cfg_path,
        r#"
[audio]
quit_fade_out_ms = 250
"#,
    )
    .unwrap();

    let _g1 = EnvGuard::set("SEGUE_CONFIG_PATH", cfg_path.to_str().unwrap());
    let _g2 = EnvGuard::set("SEGUE__AUDIO__QUIT_FADE_OUT_MS", "0");

    let s = Settings::load().unwrap();
    assert_eq!(s.audio.quit_fade_out_ms, 0);
}

#[test]
fn validate_rejects_out_of_range_values() {
    let mut s = Settings::default();
    s.playback.volume = 1.5;
    assert!(s.validate().is_err());

    let mut s = Settings::default();
    s.automix.tempo_tolerance = 0.0;
    assert!(s.validate().is_err());

    let mut s = Settings::default();
    s.automix.top_max = 0;
    assert!(s.validate().is_err());

    let mut s = Settings::default();
    s.session.restart_threshold_secs = f64::NAN;
    assert!(s.validate().is_err());
}

#[test]
fn validate_rejects_non_finite_automix_weights() {
    let mut s = Settings::default();
    s.automix.key_weight = f64::INFINITY;
    assert!(s.validate().is_err());

    let mut s = Settings::default();
    s.automix.tempo_weight = f64::NAN;
    assert!(s.validate().is_err());

    let mut s = Settings::default();
    s.automix.jitter = f64::NAN;
    assert!(s.validate().is_err());

    let mut s = Settings::default();
    s.automix.jitter = f64::INFINITY;
    assert!(s.validate().is_err());

    let mut s = Settings::default();
    s.automix.tempo_tolerance = f64::INFINITY;
    assert!(s.validate().is_err());
}
