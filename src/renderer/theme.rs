// SPDX-License-Identifier: GPL-3.0-only

//! Colour resolution for the keyboard renderer.
//!
//! A [`Palette`] holds the concrete colours for one frame. It is rebuilt
//! from the [`Config`] whenever settings change. Any colour string that
//! fails to parse keeps the colour the previous palette had, so a bad value
//! typed into a settings screen never breaks rendering.
//!
//! # Colour Classes
//!
//! - `Base`: ordinary character keys
//! - `Special`: Backspace, mode keys and inactive Shift
//! - `Space`: the space bar
//! - `Accent`: Enter
//! - `AccentDim` / `AccentCaps`: Shift while shift or caps is active

use crate::app_settings::{CAPS_ACCENT, SHIFT_ACCENT};
use crate::config::{Color, Config, PRESETS};
use crate::input::ColorClass;

/// Amount a pressed key is lightened by.
const PRESSED_FACTOR: f32 = 0.1;

/// Concrete colours for one render.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Palette {
    pub background: Color,
    pub key: Color,
    pub special: Color,
    pub enter: Color,
    pub space: Color,
    pub text: Color,
    pub shift_accent: Color,
    pub caps_accent: Color,
}

impl Default for Palette {
    fn default() -> Self {
        let black = &PRESETS[0];
        let parse = |value: &str, fallback: Color| Color::parse(value).unwrap_or(fallback);
        Self {
            background: parse(black.background, Color::BLACK),
            key: parse(black.key, Color::rgb(0x1a, 0x1a, 0x1a)),
            special: parse(black.special, Color::rgb(0x0d, 0x0d, 0x0d)),
            enter: parse(black.enter, Color::rgb(0x25, 0x63, 0xeb)),
            space: parse(black.space, Color::rgb(0x1a, 0x1a, 0x1a)),
            text: parse(black.text, Color::WHITE),
            shift_accent: parse(SHIFT_ACCENT, Color::rgb(0x3b, 0x82, 0xf6)),
            caps_accent: parse(CAPS_ACCENT, Color::rgb(0x10, 0xb9, 0x81)),
        }
    }
}

impl Palette {
    /// Builds a palette from `config`, keeping `previous` colours for any
    /// value that does not parse.
    pub fn resolve(config: &Config, previous: &Palette) -> Self {
        Self {
            background: resolve_one(
                "color_background",
                &config.color_background,
                previous.background,
            ),
            key: resolve_one("color_key", &config.color_key, previous.key),
            special: resolve_one("color_key_special", &config.color_key_special, previous.special),
            enter: resolve_one("color_key_enter", &config.color_key_enter, previous.enter),
            space: resolve_one("color_key_space", &config.color_key_space, previous.space),
            text: resolve_one("color_text", &config.color_text, previous.text),
            shift_accent: previous.shift_accent,
            caps_accent: previous.caps_accent,
        }
    }

    /// Background colour for a colour class.
    pub fn color_for(&self, class: ColorClass) -> Color {
        match class {
            ColorClass::Base => self.key,
            ColorClass::Special => self.special,
            ColorClass::Space => self.space,
            ColorClass::Accent => self.enter,
            ColorClass::AccentDim => self.shift_accent,
            ColorClass::AccentCaps => self.caps_accent,
        }
    }

    /// Label colour for a colour class. Accent keys always use white.
    pub fn text_for(&self, class: ColorClass) -> Color {
        match class {
            ColorClass::Accent | ColorClass::AccentDim | ColorClass::AccentCaps => Color::WHITE,
            ColorClass::Base | ColorClass::Special | ColorClass::Space => self.text,
        }
    }

    /// Background of a key while it is held down.
    pub fn pressed(&self, base: Color) -> Color {
        base.lighten(PRESSED_FACTOR)
    }
}

fn resolve_one(field: &str, value: &str, fallback: Color) -> Color {
    match Color::parse(value) {
        Ok(color) => color,
        Err(e) => {
            tracing::warn!("{}: {}, keeping {}", field, e, fallback);
            fallback
        }
    }
}
