// SPDX-License-Identifier: GPL-3.0-only

//! Built-in theme presets and derived key colours.

use crate::config::color::Color;

/// Backgrounds darker than this get the fixed dark key set.
const DARK_LUMINANCE: f32 = 0.02;

/// Backgrounds lighter than this get the fixed light key set.
const LIGHT_LUMINANCE: f32 = 0.7;

/// Shade step used when deriving key colours from a mid-tone background.
const DERIVE_FACTOR: f32 = 0.1;

/// Per-channel drop from a key colour to its special-key colour.
const SPECIAL_KEY_OFFSET: i16 = -30;

/// A named colour scheme.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ThemePreset {
    pub name: &'static str,
    pub background: &'static str,
    pub key: &'static str,
    pub special: &'static str,
    pub enter: &'static str,
    pub space: &'static str,
    pub text: &'static str,
}

/// All built-in presets. `black` is the default.
pub const PRESETS: &[ThemePreset] = &[
    ThemePreset {
        name: "black",
        background: "#000000",
        key: "#1a1a1a",
        special: "#0d0d0d",
        enter: "#2563eb",
        space: "#1a1a1a",
        text: "#ffffff",
    },
    ThemePreset {
        name: "dark",
        background: "#1a1a2e",
        key: "#3d3d5c",
        special: "#252540",
        enter: "#2563eb",
        space: "#3d3d5c",
        text: "#ffffff",
    },
    ThemePreset {
        name: "light",
        background: "#f0f0f5",
        key: "#ffffff",
        special: "#e0e0e5",
        enter: "#2563eb",
        space: "#ffffff",
        text: "#1a1a2e",
    },
    ThemePreset {
        name: "blue",
        background: "#0f172a",
        key: "#1e3a5f",
        special: "#0c2340",
        enter: "#3b82f6",
        space: "#1e3a5f",
        text: "#ffffff",
    },
    ThemePreset {
        name: "green",
        background: "#0f1f0f",
        key: "#1a3d1a",
        special: "#0d2d0d",
        enter: "#10b981",
        space: "#1a3d1a",
        text: "#ffffff",
    },
    ThemePreset {
        name: "purple",
        background: "#1a0a2e",
        key: "#3d2d5c",
        special: "#251540",
        enter: "#8b5cf6",
        space: "#3d2d5c",
        text: "#ffffff",
    },
    ThemePreset {
        name: "red",
        background: "#1f0f0f",
        key: "#3d1a1a",
        special: "#2d0d0d",
        enter: "#ef4444",
        space: "#3d1a1a",
        text: "#ffffff",
    },
];

/// Looks up a preset by name (case-insensitive).
pub fn preset(name: &str) -> Option<&'static ThemePreset> {
    PRESETS.iter().find(|p| p.name.eq_ignore_ascii_case(name))
}

/// Key colours derived from a keyboard background.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DerivedKeyColors {
    pub key: Color,
    pub special: Color,
    pub space: Color,
}

/// Derives key, special-key and space colours from a background colour.
///
/// Very dark backgrounds get a fixed charcoal key set and very light ones a
/// fixed white set. Anything in between is lightened for keys and darkened
/// for special keys.
pub fn derive_from_background(background: Color) -> DerivedKeyColors {
    let luminance = background.relative_luminance();

    if luminance < DARK_LUMINANCE {
        DerivedKeyColors {
            key: Color::rgb(0x1a, 0x1a, 0x1a),
            special: Color::rgb(0x0d, 0x0d, 0x0d),
            space: Color::rgb(0x1a, 0x1a, 0x1a),
        }
    } else if luminance > LIGHT_LUMINANCE {
        DerivedKeyColors {
            key: Color::WHITE,
            special: Color::rgb(0xe0, 0xe0, 0xe0),
            space: Color::WHITE,
        }
    } else {
        let lighter = background.lighten(DERIVE_FACTOR);
        DerivedKeyColors {
            key: lighter,
            special: background.darken(DERIVE_FACTOR),
            space: lighter,
        }
    }
}

/// Derives the special-key and space colours from a key colour.
pub fn derive_from_key(key: Color) -> DerivedKeyColors {
    DerivedKeyColors {
        key,
        special: key.shift_channels(SPECIAL_KEY_OFFSET),
        space: key,
    }
}
