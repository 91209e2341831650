use std::{env, path::PathBuf};

use crate::error::Error;

use super::schema::Settings;

/// Configuration loading helpers.
///
/// `Settings::load` tries environment variables first (prefix `SEGUE__`), then an
/// optional config file and falls back to struct defaults.
impl Settings {
    /// Load settings from environment and optional config file.
    pub fn load() -> Result<Self, ::config::ConfigError> {
        let config_path = resolve_config_path();

        let mut builder = ::config::Config::builder();

        if let Some(path) = &config_path {
            builder = builder.add_source(::config::File::from(path.as_path()).required(false));
        }

        builder = builder.add_source(
            ::config::Environment::with_prefix("SEGUE")
                .separator("__")
                .try_parsing(true),
        );

        let cfg = builder.build()?;
        let settings: Settings = cfg.try_deserialize()?;
        Ok(settings)
    }

    /// Perform basic validation checks on loaded settings.
    pub fn validate(&self) -> Result<(), Error> {
        if !(0.0..=1.0).contains(&self.playback.volume) {
            return Err(Error::Config("playback.volume must be within [0, 1]".into()));
        }
        if !self.session.restart_threshold_secs.is_finite()
            || self.session.restart_threshold_secs < 0.0
        {
            return Err(Error::Config(
                "session.restart_threshold_secs must be >= 0".into(),
            ));
        }
        let a = &self.automix;
        let weights_ok = [a.key_weight, a.tempo_weight]
            .iter()
            .all(|w| w.is_finite() && *w >= 0.0);
        if !weights_ok || a.key_weight + a.tempo_weight <= 0.0 {
            return Err(Error::Config(
                "automix weights must be finite, >= 0 and not both zero".into(),
            ));
        }
        if !(a.tempo_tolerance.is_finite() && a.tempo_tolerance > 0.0) {
            return Err(Error::Config("automix.tempo_tolerance must be > 0".into()));
        }
        if !(a.jitter.is_finite() && a.jitter >= 0.0) {
            return Err(Error::Config("automix.jitter must be finite and >= 0".into()));
        }
        if a.top_max == 0 {
            return Err(Error::Config("automix.top_max must be >= 1".into()));
        }
        Ok(())
    }
}

/// Resolve the config path from `SEGUE_CONFIG_PATH` or XDG defaults.
pub fn resolve_config_path() -> Option<PathBuf> {
    if let Some(p) = env::var_os("SEGUE_CONFIG_PATH") {
        return Some(PathBuf::from(p));
    }
    default_config_path()
}

/// Compute the default config path under `$XDG_CONFIG_HOME/segue/config.toml`
/// or `~/.config/segue/config.toml` when `XDG_CONFIG_HOME` is not set.
pub fn default_config_path() -> Option<PathBuf> {
    xdg_dir("XDG_CONFIG_HOME", ".config").map(|d| d.join("segue").join("config.toml"))
}

/// Compute where playback state is persisted:
/// `$XDG_STATE_HOME/segue/state.toml` or `~/.local/state/segue/state.toml`.
pub fn default_state_path() -> Option<PathBuf> {
    if let Some(p) = env::var_os("SEGUE_STATE_PATH") {
        return Some(PathBuf::from(p));
    }
    xdg_dir("XDG_STATE_HOME", ".local/state").map(|d| d.join("segue").join("state.toml"))
}

fn xdg_dir(var: &str, home_fallback: &str) -> Option<PathBuf> {
    if let Some(xdg) = env::var_os(var) {
        Some(PathBuf::from(xdg))
    } else {
        env::var_os("HOME").map(|home| PathBuf::from(home).join(home_fallback))
    }
}
