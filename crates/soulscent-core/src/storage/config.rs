//! TOML-based application configuration.
//!
//! Stores:
//! - Audio asset URLs (scenario default, functional noise overlays, chime)
//! - Timing knobs (immersion auto-timeout)
//! - Collaborator endpoints (AI reply, validation, daily sign, analytics)
//!
//! Configuration is stored at `~/.config/soulscent/config.toml`.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use super::data_dir;
use crate::error::ConfigError;

/// Audio asset configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AudioConfig {
    #[serde(default = "default_scenario_url")]
    pub default_scenario_url: String,
    #[serde(default = "default_pink_noise_url")]
    pub pink_noise_url: String,
    #[serde(default = "default_brown_noise_url")]
    pub brown_noise_url: String,
    #[serde(default = "default_chime_url")]
    pub chime_url: String,
}

/// Timing configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimingConfig {
    /// Minutes of immersion before the auto-transition to the treehole.
    #[serde(default = "default_immersion_timeout_min")]
    pub immersion_timeout_min: u64,
}

/// Collaborator endpoints. Empty string disables a collaborator.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ServiceConfig {
    #[serde(default)]
    pub reply_url: String,
    #[serde(default)]
    pub validate_url: String,
    #[serde(default)]
    pub sign_url: String,
    #[serde(default)]
    pub analytics_url: String,
}

/// Application configuration.
///
/// Serialized to/from TOML at `~/.config/soulscent/config.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub audio: AudioConfig,
    #[serde(default)]
    pub timing: TimingConfig,
    #[serde(default)]
    pub service: ServiceConfig,
}

// Default functions
fn default_scenario_url() -> String {
    "assets/audio/scenario-forest.mp3".into()
}
fn default_pink_noise_url() -> String {
    "assets/audio/pink-noise.mp3".into()
}
fn default_brown_noise_url() -> String {
    "assets/audio/brown-noise.mp3".into()
}
fn default_chime_url() -> String {
    "assets/audio/transition-chime.mp3".into()
}
fn default_immersion_timeout_min() -> u64 {
    10
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self {
            default_scenario_url: default_scenario_url(),
            pink_noise_url: default_pink_noise_url(),
            brown_noise_url: default_brown_noise_url(),
            chime_url: default_chime_url(),
        }
    }
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            immersion_timeout_min: default_immersion_timeout_min(),
        }
    }
}

impl Config {
    /// Load from the default location. A missing file yields defaults.
    pub fn load() -> Result<Self, ConfigError> {
        let path = Self::default_path()?;
        Self::load_from(&path)
    }

    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let raw = std::fs::read_to_string(path).map_err(|e| ConfigError::LoadFailed {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        toml::from_str(&raw).map_err(|e| ConfigError::ParseFailed(e.to_string()))
    }

    pub fn save(&self) -> Result<(), ConfigError> {
        let path = Self::default_path()?;
        self.save_to(&path)
    }

    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        let raw = toml::to_string_pretty(self).map_err(|e| ConfigError::SaveFailed {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        std::fs::write(path, raw).map_err(|e| ConfigError::SaveFailed {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
    }

    fn default_path() -> Result<PathBuf, ConfigError> {
        let dir = data_dir().map_err(|e| ConfigError::LoadFailed {
            path: PathBuf::from("~/.config/soulscent"),
            message: e.to_string(),
        })?;
        Ok(dir.join("config.toml"))
    }

    /// Immersion auto-timeout in milliseconds.
    pub fn immersion_timeout_ms(&self) -> u64 {
        self.timing.immersion_timeout_min.saturating_mul(60_000)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_sane() {
        let cfg = Config::default();
        assert_eq!(cfg.timing.immersion_timeout_min, 10);
        assert_eq!(cfg.immersion_timeout_ms(), 600_000);
        assert!(cfg.audio.pink_noise_url.ends_with("pink-noise.mp3"));
        assert!(cfg.service.reply_url.is_empty());
    }

    #[test]
    fn missing_file_loads_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = Config::load_from(&dir.path().join("nope.toml")).unwrap();
        assert_eq!(cfg.timing.immersion_timeout_min, 10);
    }

    #[test]
    fn save_load_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");

        let mut cfg = Config::default();
        cfg.timing.immersion_timeout_min = 3;
        cfg.service.reply_url = "https://api.example.com/reply".into();
        cfg.save_to(&path).unwrap();

        let loaded = Config::load_from(&path).unwrap();
        assert_eq!(loaded.timing.immersion_timeout_min, 3);
        assert_eq!(loaded.service.reply_url, "https://api.example.com/reply");
    }

    #[test]
    fn partial_toml_fills_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[timing]\nimmersion_timeout_min = 1\n").unwrap();

        let cfg = Config::load_from(&path).unwrap();
        assert_eq!(cfg.timing.immersion_timeout_min, 1);
        assert!(cfg.audio.chime_url.ends_with("transition-chime.mp3"));
    }
}
