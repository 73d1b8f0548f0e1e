//! Configuration file support.
//!
//! User preferences are stored as versioned JSON under the platform config
//! directory (`<config_dir>/sonrai/sonrai-config.json`). A missing or broken
//! file is never fatal: callers fall back to defaults.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::constants::{self, zoom};
use crate::model::Label;
use crate::viewer::ViewerSettings;

/// Log level setting for the application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    /// Show only errors
    Error,
    /// Show errors and warnings
    Warn,
    /// Show errors, warnings, and info messages
    #[default]
    Info,
    /// Show debug-level logging
    Debug,
    /// Show all log messages including trace
    Trace,
}

impl LogLevel {
    /// Convert to log crate's LevelFilter.
    pub fn to_level_filter(&self) -> log::LevelFilter {
        match self {
            LogLevel::Error => log::LevelFilter::Error,
            LogLevel::Warn => log::LevelFilter::Warn,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Trace => log::LevelFilter::Trace,
        }
    }
}

/// Current configuration file format version.
/// Increment this when making breaking changes to the config format.
pub const CONFIG_VERSION: u32 = 1;

/// Application configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    /// Version of the configuration file format
    pub version: u32,

    /// User preferences
    #[serde(default)]
    pub preferences: UserPreferences,
}

/// User preferences section of the config.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserPreferences {
    /// Log verbosity level
    #[serde(default)]
    pub log_level: LogLevel,

    /// Label selected when the application starts
    #[serde(default)]
    pub default_label: Label,

    /// Scale increment for zoom in/out
    #[serde(default = "default_zoom_step")]
    pub zoom_step: f64,

    /// Smallest scale zooming or fitting may reach
    #[serde(default = "default_min_scale")]
    pub min_scale: f64,

    /// Horizontal space kept free around the page when fitting to width
    #[serde(default = "default_fit_padding")]
    pub fit_padding: f64,

    /// Pixel discrepancy tolerated before a drawable is repositioned
    #[serde(default = "default_sync_tolerance")]
    pub sync_tolerance: f64,

    /// Number of undoable steps kept
    #[serde(default = "default_undo_history")]
    pub undo_history: usize,

    /// Written as `created_by` on drawn annotations
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
}

fn default_zoom_step() -> f64 {
    zoom::STEP
}

fn default_min_scale() -> f64 {
    zoom::MIN_SCALE
}

fn default_fit_padding() -> f64 {
    zoom::FIT_PADDING
}

fn default_sync_tolerance() -> f64 {
    constants::sync::GEOMETRY_TOLERANCE
}

fn default_undo_history() -> usize {
    constants::DEFAULT_UNDO_HISTORY
}

impl Default for UserPreferences {
    fn default() -> Self {
        Self {
            log_level: LogLevel::default(),
            default_label: Label::default(),
            zoom_step: default_zoom_step(),
            min_scale: default_min_scale(),
            fit_padding: default_fit_padding(),
            sync_tolerance: default_sync_tolerance(),
            undo_history: default_undo_history(),
            author: None,
        }
    }
}

impl From<&UserPreferences> for ViewerSettings {
    fn from(prefs: &UserPreferences) -> Self {
        let defaults = ViewerSettings::default();
        let positive = |v: f64, fallback: f64| if v.is_finite() && v > 0.0 { v } else { fallback };
        Self {
            zoom_step: positive(prefs.zoom_step, defaults.zoom_step),
            min_scale: positive(prefs.min_scale, defaults.min_scale),
            fit_padding: if prefs.fit_padding.is_finite() {
                prefs.fit_padding.max(0.0)
            } else {
                defaults.fit_padding
            },
            sync_tolerance: if prefs.sync_tolerance.is_finite() {
                prefs.sync_tolerance.max(0.0)
            } else {
                defaults.sync_tolerance
            },
            undo_history: prefs.undo_history,
            default_label: prefs.default_label,
            author: prefs.author.clone(),
            ..defaults
        }
    }
}

impl AppConfig {
    pub fn new() -> Self {
        Self {
            version: CONFIG_VERSION,
            preferences: UserPreferences::default(),
        }
    }

    /// Serialize the configuration to JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Deserialize configuration from JSON.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;

        if config.version > CONFIG_VERSION {
            return Err(ConfigError::VersionTooNew {
                file_version: config.version,
                supported_version: CONFIG_VERSION,
            });
        }

        Ok(config)
    }

    /// Viewer behavior derived from the preferences.
    pub fn viewer_settings(&self) -> ViewerSettings {
        ViewerSettings::from(&self.preferences)
    }

    pub fn default_filename() -> &'static str {
        "sonrai-config.json"
    }

    /// Default config file path for auto-load/save.
    #[cfg(not(target_arch = "wasm32"))]
    pub fn default_path() -> Option<PathBuf> {
        // Prefer the platform config directory, fall back to ~/.config
        if let Some(config_dir) = dirs::config_dir() {
            Some(config_dir.join("sonrai").join(Self::default_filename()))
        } else {
            dirs::home_dir().map(|home| {
                home.join(".config")
                    .join("sonrai")
                    .join(Self::default_filename())
            })
        }
    }

    /// Load configuration from `path`.
    pub fn load_from_path(path: &Path) -> Result<Self, ConfigError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    /// Save configuration to `path`, creating parent directories.
    pub fn save_to_path(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let json = self.to_json()?;
        std::fs::write(path, json)?;
        log::info!("Saved configuration to {:?}", path);
        Ok(())
    }

    /// Try to load configuration from the default path.
    /// Returns None if the file doesn't exist or can't be read.
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load_from_default_path() -> Option<Self> {
        let path = Self::default_path()?;
        if !path.exists() {
            log::debug!("No config file found at {:?}", path);
            return None;
        }

        match Self::load_from_path(&path) {
            Ok(config) => {
                log::info!("Loaded configuration from {:?}", path);
                Some(config)
            }
            Err(e) => {
                log::warn!("Failed to load config file {:?}: {}", path, e);
                None
            }
        }
    }

    /// Save configuration to the default path.
    #[cfg(not(target_arch = "wasm32"))]
    pub fn save_to_default_path(&self) -> Result<(), ConfigError> {
        let path = Self::default_path().ok_or_else(|| {
            ConfigError::IoError(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                "Could not determine config directory",
            ))
        })?;
        self.save_to_path(&path)
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// JSON parsing error
    #[error("Failed to parse configuration: {0}")]
    ParseError(#[from] serde_json::Error),

    /// Configuration version is newer than supported
    #[error(
        "Configuration file version {file_version} is newer than supported version {supported_version}"
    )]
    VersionTooNew {
        file_version: u32,
        supported_version: u32,
    },

    /// I/O error when reading/writing config
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_round_trip() {
        let config = AppConfig::new();
        let json = config.to_json().unwrap();
        let parsed = AppConfig::from_json(&json).unwrap();
        assert_eq!(parsed, config);
    }

    #[test]
    fn test_missing_preferences_use_defaults() {
        let config = AppConfig::from_json(r#"{"version": 1}"#).unwrap();
        assert_eq!(config.preferences, UserPreferences::default());

        let partial = AppConfig::from_json(
            r#"{"version": 1, "preferences": {"log_level": "debug", "default_label": "gpo_double"}}"#,
        )
        .unwrap();
        assert_eq!(partial.preferences.log_level, LogLevel::Debug);
        assert_eq!(partial.preferences.default_label, Label::GpoDouble);
        assert_eq!(partial.preferences.zoom_step, zoom::STEP);
    }

    #[test]
    fn test_version_too_new() {
        let json = format!(r#"{{"version": {}}}"#, CONFIG_VERSION + 1);
        let err = AppConfig::from_json(&json).unwrap_err();
        assert!(matches!(err, ConfigError::VersionTooNew { .. }));
    }

    #[test]
    fn test_log_level_filter() {
        assert_eq!(LogLevel::Warn.to_level_filter(), log::LevelFilter::Warn);
        assert_eq!(LogLevel::default().to_level_filter(), log::LevelFilter::Info);
    }

    #[test]
    fn test_viewer_settings_sanitized() {
        let mut config = AppConfig::new();
        config.preferences.zoom_step = -1.0;
        config.preferences.min_scale = f64::NAN;
        config.preferences.fit_padding = -10.0;
        config.preferences.author = Some("jo".to_string());

        let settings = config.viewer_settings();
        assert_eq!(settings.zoom_step, zoom::STEP);
        assert_eq!(settings.min_scale, zoom::MIN_SCALE);
        assert_eq!(settings.fit_padding, 0.0);
        assert_eq!(settings.author.as_deref(), Some("jo"));
    }

    #[test]
    fn test_save_and_load_path() {
        let temp = tempfile::tempdir().expect("temp dir should be created");
        let path = temp.path().join("nested").join(AppConfig::default_filename());

        let mut config = AppConfig::new();
        config.preferences.undo_history = 7;
        config.save_to_path(&path).expect("save should succeed");

        let loaded = AppConfig::load_from_path(&path).expect("load should succeed");
        assert_eq!(loaded.preferences.undo_history, 7);
    }
}
