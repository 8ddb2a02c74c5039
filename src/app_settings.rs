// SPDX-License-Identifier: GPL-3.0-only

//! Centralized application settings and constants.

/// Application ID in RDNN (reverse domain name notation) format.
pub const APP_ID: &str = "io.github.fastboard.Fastboard";

/// Application version for config versioning.
pub const APP_VERSION: u64 = 1;

/// Config file name inside the config directory.
pub const CONFIG_FILE_NAME: &str = "settings.json";

/// Default keyboard width in pixels.
pub const DEFAULT_WIDTH: f32 = 400.0;

/// Default keyboard height in pixels.
pub const DEFAULT_HEIGHT: f32 = 245.0;

/// Hold time before Backspace starts repeating.
pub const LONG_PRESS_DELAY_MS: u64 = 400;

/// Time between repeats once repeating.
pub const REPEAT_INTERVAL_MS: u64 = 50;

/// Lower bound for the configurable long-press delay.
pub const MIN_LONG_PRESS_DELAY_MS: u64 = 50;

/// Lower bound for the configurable repeat interval.
pub const MIN_REPEAT_INTERVAL_MS: u64 = 10;

/// Shift key colour while one-shot shift is active.
pub const SHIFT_ACCENT: &str = "#3b82f6";

/// Shift key colour while caps lock is active.
pub const CAPS_ACCENT: &str = "#10b981";

/// Touches farther than this from every key centre hit nothing.
pub const HIT_SLOP: f32 = 50.0;

/// Height of the quick-emoji strip above the keys.
pub const EMOJI_ROW_HEIGHT: f32 = 44.0;

/// Horizontal padding around the key area.
pub const PADDING_HORIZONTAL: f32 = 3.0;

/// Vertical padding around the key area.
pub const PADDING_VERTICAL: f32 = 6.0;

/// Extra inset on both sides of the second row.
pub const HOME_ROW_INSET: f32 = 14.0;

/// Capacity of the message channel feeding the keyboard loop.
pub const MESSAGE_CHANNEL_CAPACITY: usize = 64;

/// Number of recent side effects the keyboard loop keeps for inspection.
pub const EFFECT_HISTORY_CAPACITY: usize = 256;
