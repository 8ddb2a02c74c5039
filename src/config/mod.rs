// SPDX-License-Identifier: GPL-3.0-only

//! User configuration.
//!
//! [`Config`] holds every appearance and behaviour option of the keyboard.
//! It is persisted as JSON with `serde_json`. Missing fields take their
//! defaults, so a config written by an older version keeps loading.
//!
//! Colours are kept as strings. A malformed colour is not a load error: it
//! is stored as-is and the renderer falls back to the last good colour.
//!
//! # Example
//!
//! ```rust,ignore
//! use fastboard::config::Config;
//!
//! let mut config = Config::load_or_default("settings.json");
//! config.apply_theme("blue")?;
//! config.save("settings.json")?;
//! ```

pub mod color;
pub mod theme;

pub use color::Color;
pub use theme::{ThemePreset, PRESETS};

use crate::app_settings::{APP_VERSION, DEFAULT_HEIGHT};
use crate::input::RepeatTiming;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::Path;
use std::time::Duration;

/// Default quick-emoji list, comma separated.
pub const DEFAULT_QUICK_EMOJIS: &str = "😀,😂,❤️,👍,🔥,✨,🎉,💯";

// ============================================================================
// Error Types
// ============================================================================

/// Errors that can occur while loading, saving or editing the config.
#[derive(Debug)]
pub enum ConfigError {
    /// I/O error while reading or writing the config file
    IoError {
        source: std::io::Error,
        file_path: Option<String>,
        suggestion: Option<String>,
    },

    /// The config file is not valid JSON for [`Config`]
    JsonError {
        source: serde_json::Error,
        file_path: Option<String>,
        line_number: Option<usize>,
        suggestion: Option<String>,
    },

    /// A colour value could not be parsed
    InvalidColor {
        value: String,
        suggestion: Option<String>,
    },

    /// No preset with this name exists
    UnknownTheme {
        name: String,
        suggestion: Option<String>,
    },
}

impl ConfigError {
    /// Creates an I/O error with file path.
    pub fn io_error_with_path(source: std::io::Error, file_path: impl Into<String>) -> Self {
        Self::IoError {
            source,
            file_path: Some(file_path.into()),
            suggestion: Some("Check that the file exists and is accessible".into()),
        }
    }

    /// Creates a JSON error with file path.
    pub fn json_error_with_path(source: serde_json::Error, file_path: impl Into<String>) -> Self {
        let line_number = Some(source.line()).filter(|&l| l > 0);
        Self::JsonError {
            source,
            file_path: Some(file_path.into()),
            line_number,
            suggestion: Some("Check the JSON syntax at the indicated line".into()),
        }
    }

    /// Creates an invalid colour error.
    pub fn invalid_color(value: impl Into<String>) -> Self {
        Self::InvalidColor {
            value: value.into(),
            suggestion: Some("Use #rgb, #rrggbb or #aarrggbb".into()),
        }
    }

    /// Creates an unknown theme error listing the known presets.
    pub fn unknown_theme(name: impl Into<String>) -> Self {
        let known: Vec<&str> = PRESETS.iter().map(|p| p.name).collect();
        Self::UnknownTheme {
            name: name.into(),
            suggestion: Some(format!("Known themes: {}", known.join(", "))),
        }
    }
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let suggestion = match self {
            ConfigError::IoError {
                source,
                file_path,
                suggestion,
            } => {
                write!(f, "I/O error")?;
                if let Some(path) = file_path {
                    write!(f, " accessing '{}'", path)?;
                }
                write!(f, ": {}", source)?;
                suggestion
            }
            ConfigError::JsonError {
                source,
                file_path,
                line_number,
                suggestion,
            } => {
                write!(f, "Config parsing error")?;
                if let Some(path) = file_path {
                    write!(f, " in file '{}'", path)?;
                }
                if let Some(line) = line_number {
                    write!(f, " at line {}", line)?;
                }
                write!(f, ": {}", source)?;
                suggestion
            }
            ConfigError::InvalidColor { value, suggestion } => {
                write!(f, "Invalid color '{}'", value)?;
                suggestion
            }
            ConfigError::UnknownTheme { name, suggestion } => {
                write!(f, "Unknown theme '{}'", name)?;
                suggestion
            }
        };
        if let Some(hint) = suggestion {
            write!(f, "\n  Suggestion: {}", hint)?;
        }
        Ok(())
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::IoError { source, .. } => Some(source),
            ConfigError::JsonError { source, .. } => Some(source),
            _ => None,
        }
    }
}

// ============================================================================
// Config
// ============================================================================

/// User configuration that persists between application runs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Config format version.
    pub version: u64,
    pub color_background: String,
    pub color_key: String,
    pub color_key_special: String,
    pub color_key_enter: String,
    pub color_key_space: String,
    pub color_text: String,
    /// Height of the key area in pixels.
    pub keyboard_height: f32,
    pub key_radius: f32,
    /// Margin on every side of each key.
    pub key_gap: f32,
    /// Label size for character keys.
    pub key_text_size: f32,
    pub vibration_enabled: bool,
    /// Pulse length in milliseconds.
    pub vibration_strength: u64,
    /// Hold time before a repeatable key starts repeating, in milliseconds.
    pub long_press_delay: u64,
    /// Time between repeats, in milliseconds.
    pub repeat_interval: u64,
    pub show_emoji_row: bool,
    /// Comma separated.
    pub quick_emojis: String,
    /// Name of the last applied preset.
    pub theme: String,
}

impl Default for Config {
    fn default() -> Self {
        let black = &PRESETS[0];
        Self {
            version: APP_VERSION,
            color_background: black.background.into(),
            color_key: black.key.into(),
            color_key_special: black.special.into(),
            color_key_enter: black.enter.into(),
            color_key_space: black.space.into(),
            color_text: black.text.into(),
            keyboard_height: DEFAULT_HEIGHT,
            key_radius: 8.0,
            key_gap: 2.0,
            key_text_size: 20.0,
            vibration_enabled: true,
            vibration_strength: 5,
            long_press_delay: crate::app_settings::LONG_PRESS_DELAY_MS,
            repeat_interval: crate::app_settings::REPEAT_INTERVAL_MS,
            show_emoji_row: false,
            quick_emojis: DEFAULT_QUICK_EMOJIS.into(),
            theme: black.name.into(),
        }
    }
}

impl Config {
    /// Loads a config from a JSON file.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::IoError`] if the file cannot be read and
    /// [`ConfigError::JsonError`] if it is not valid JSON.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let path_str = path.display().to_string();
        let json = fs::read_to_string(path)
            .map_err(|e| ConfigError::io_error_with_path(e, &path_str))?;
        let config: Config = serde_json::from_str(&json)
            .map_err(|e| ConfigError::json_error_with_path(e, &path_str))?;
        tracing::debug!("Loaded config from {}", path_str);
        Ok(config)
    }

    /// Loads a config, falling back to defaults on any error.
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        match Self::load(path) {
            Ok(config) => config,
            Err(ConfigError::IoError { source, .. })
                if source.kind() == std::io::ErrorKind::NotFound =>
            {
                tracing::info!("No config at {}, using defaults", path.display());
                Self::default()
            }
            Err(e) => {
                tracing::warn!("Failed to load config, using defaults: {}", e);
                Self::default()
            }
        }
    }

    /// Writes the config as pretty-printed JSON, creating parent directories.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let path = path.as_ref();
        let path_str = path.display().to_string();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .map_err(|e| ConfigError::io_error_with_path(e, parent.display().to_string()))?;
        }
        let json = serde_json::to_string_pretty(self)
            .map_err(|e| ConfigError::json_error_with_path(e, &path_str))?;
        fs::write(path, json).map_err(|e| ConfigError::io_error_with_path(e, &path_str))?;
        tracing::debug!("Saved config to {}", path_str);
        Ok(())
    }

    /// Applies a built-in theme preset.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::UnknownTheme`] and leaves the config untouched
    /// if no preset has this name.
    pub fn apply_theme(&mut self, name: &str) -> Result<(), ConfigError> {
        let preset = theme::preset(name).ok_or_else(|| ConfigError::unknown_theme(name))?;
        self.color_background = preset.background.into();
        self.color_key = preset.key.into();
        self.color_key_special = preset.special.into();
        self.color_key_enter = preset.enter.into();
        self.color_key_space = preset.space.into();
        self.color_text = preset.text.into();
        self.theme = preset.name.into();
        tracing::info!("Applied theme '{}'", preset.name);
        Ok(())
    }

    /// Sets the background and derives matching key colours from it.
    pub fn set_background_color(&mut self, value: &str) -> Result<(), ConfigError> {
        let background = Color::parse(value)?;
        let derived = theme::derive_from_background(background);
        self.color_background = background.to_hex();
        self.color_key = derived.key.to_hex();
        self.color_key_special = derived.special.to_hex();
        self.color_key_space = derived.space.to_hex();
        Ok(())
    }

    /// Sets the key colour and derives the special-key and space colours.
    pub fn set_key_background_color(&mut self, value: &str) -> Result<(), ConfigError> {
        let key = Color::parse(value)?;
        let derived = theme::derive_from_key(key);
        self.color_key = derived.key.to_hex();
        self.color_key_special = derived.special.to_hex();
        self.color_key_space = derived.space.to_hex();
        Ok(())
    }

    /// The quick-emoji list split on commas, blanks dropped.
    pub fn quick_emoji_list(&self) -> Vec<String> {
        self.quick_emojis
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(String::from)
            .collect()
    }

    /// Repeat timing derived from the long-press settings.
    pub fn repeat_timing(&self) -> RepeatTiming {
        RepeatTiming::from_millis(self.long_press_delay, self.repeat_interval)
    }

    /// Haptic pulse length.
    pub fn vibration_duration(&self) -> Duration {
        Duration::from_millis(self.vibration_strength)
    }
}

// ============================================================================
// Tests
// ============================================================================
