//! Runtime settings
//!
//! Physics is compile-time (`consts`). What can change between runs - audio
//! mix, seed, how long a headless run lasts, how the autopilot plays - is
//! read from a JSON file named by `MERGE_ARENA_SETTINGS`.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Environment variable naming the settings file
pub const SETTINGS_ENV: &str = "MERGE_ARENA_SETTINGS";

/// Frames a headless run lasts when no limit is configured
pub const DEFAULT_FRAME_LIMIT: u64 = 600;

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("failed to read settings file {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid settings JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// Scripted player for headless runs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AutopilotSettings {
    /// Press fire every this many frames (at least 2, so each press is an edge)
    pub fire_interval: u64,
    /// Frames spent aiming up before switching to down, and back
    pub sweep_period: u64,
}

impl Default for AutopilotSettings {
    fn default() -> Self {
        Self {
            fire_interval: 12,
            sweep_period: 45,
        }
    }
}

/// Game settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Run seed for the on-deck tier rolls
    pub seed: u64,
    /// Stop after this many frames (`None` runs forever)
    pub frame_limit: Option<u64>,

    // === Audio ===
    /// Master volume (0.0 - 1.0)
    pub master_volume: f32,
    /// Sound effects volume (0.0 - 1.0)
    pub sfx_volume: f32,
    pub muted: bool,

    pub autopilot: AutopilotSettings,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            seed: 0x5EED,
            frame_limit: Some(DEFAULT_FRAME_LIMIT),
            master_volume: 0.8,
            sfx_volume: 1.0,
            muted: false,
            autopilot: AutopilotSettings::default(),
        }
    }
}

impl Settings {
    pub fn from_json(json: &str) -> Result<Self, SettingsError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_json(&self) -> Result<String, SettingsError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Read settings from a JSON file; missing fields take their defaults
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self, SettingsError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|source| SettingsError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&json)
    }

    /// Settings from `MERGE_ARENA_SETTINGS`, falling back to defaults
    pub fn load() -> Self {
        let Some(path) = std::env::var_os(SETTINGS_ENV) else {
            log::info!("Using default settings");
            return Self::default();
        };

        match Self::load_from(&path) {
            Ok(settings) => {
                log::info!("Loaded settings from {}", Path::new(&path).display());
                settings
            }
            Err(err) => {
                log::warn!("{err}; using default settings");
                Self::default()
            }
        }
    }
}
