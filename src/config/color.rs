// SPDX-License-Identifier: GPL-3.0-only

//! Hex colour parsing and arithmetic.
//!
//! Colours are stored in the config as strings so that a malformed value can
//! be kept on disk and replaced with a fallback at render time. This module
//! turns those strings into [`Color`] values and derives related shades.

use crate::config::ConfigError;
use std::fmt;
use std::str::FromStr;

/// An sRGB colour with alpha.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    /// Opaque black.
    pub const BLACK: Color = Color::rgb(0, 0, 0);

    /// Opaque white.
    pub const WHITE: Color = Color::rgb(255, 255, 255);

    /// Creates an opaque colour.
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    /// Parses `#rgb`, `#rrggbb` or `#aarrggbb` (alpha first).
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidColor`] if the string is not one of the
    /// accepted forms.
    ///
    /// # Example
    ///
    /// ```rust,ignore
    /// use fastboard::config::Color;
    ///
    /// assert_eq!(Color::parse("#fff")?, Color::WHITE);
    /// assert_eq!(Color::parse("#2563eb")?, Color::rgb(0x25, 0x63, 0xeb));
    /// ```
    pub fn parse(value: &str) -> Result<Self, ConfigError> {
        let invalid = || ConfigError::invalid_color(value);

        let hex = value.trim().strip_prefix('#').ok_or_else(invalid)?;
        if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(invalid());
        }

        let byte = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).map_err(|_| invalid());
        let nibble = |i: usize| {
            u8::from_str_radix(&hex[i..i + 1], 16)
                .map(|n| n * 17)
                .map_err(|_| invalid())
        };

        match hex.len() {
            3 => Ok(Color::rgb(nibble(0)?, nibble(1)?, nibble(2)?)),
            6 => Ok(Color::rgb(byte(0)?, byte(2)?, byte(4)?)),
            8 => Ok(Color {
                a: byte(0)?,
                r: byte(2)?,
                g: byte(4)?,
                b: byte(6)?,
            }),
            _ => Err(invalid()),
        }
    }

    /// Formats as `#rrggbb`, or `#aarrggbb` when not fully opaque.
    pub fn to_hex(&self) -> String {
        if self.a == 255 {
            format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
        } else {
            format!("#{:02x}{:02x}{:02x}{:02x}", self.a, self.r, self.g, self.b)
        }
    }

    /// WCAG relative luminance in `0.0..=1.0`.
    pub fn relative_luminance(&self) -> f32 {
        fn linear(channel: u8) -> f32 {
            let c = channel as f32 / 255.0;
            if c <= 0.04045 {
                c / 12.92
            } else {
                ((c + 0.055) / 1.055).powf(2.4)
            }
        }
        0.2126 * linear(self.r) + 0.7152 * linear(self.g) + 0.0722 * linear(self.b)
    }

    /// Adds `factor * 255` to every channel, saturating at 255.
    pub fn lighten(&self, factor: f32) -> Self {
        self.shift_channels((255.0 * factor) as i16)
    }

    /// Subtracts `factor * 255` from every channel, saturating at 0.
    pub fn darken(&self, factor: f32) -> Self {
        self.shift_channels(-((255.0 * factor) as i16))
    }

    /// Adds `delta` to every channel, clamped to `0..=255`. Alpha is kept.
    pub fn shift_channels(&self, delta: i16) -> Self {
        let apply = |c: u8| (c as i16 + delta).clamp(0, 255) as u8;
        Self {
            r: apply(self.r),
            g: apply(self.g),
            b: apply(self.b),
            a: self.a,
        }
    }
}

impl FromStr for Color {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Color::parse(s)
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_forms() {
        assert_eq!(Color::parse("#fff").ok(), Some(Color::WHITE));
        assert_eq!(Color::parse("#1A1a1a").ok(), Some(Color::rgb(0x1a, 0x1a, 0x1a)));
        assert_eq!(
            Color::parse("#80ff0000").ok(),
            Some(Color { r: 255, g: 0, b: 0, a: 0x80 })
        );
    }

    #[test]
    fn test_parse_rejects_malformed() {
        for bad in ["", "fff", "#ff", "#gggggg", "#12345", "#ŧŧŧ", "red"] {
            let err = Color::parse(bad);
            assert!(
                matches!(err, Err(ConfigError::InvalidColor { .. })),
                "{:?} must be rejected",
                bad
            );
        }
    }

    #[test]
    fn test_hex_output() {
        assert_eq!(Color::rgb(0x25, 0x63, 0xeb).to_hex(), "#2563eb");
        assert_eq!(Color { r: 1, g: 2, b: 3, a: 4 }.to_hex(), "#04010203");
    }

    #[test]
    fn test_luminance_extremes() {
        assert!(Color::BLACK.relative_luminance() < 0.001);
        assert!((Color::WHITE.relative_luminance() - 1.0).abs() < 0.001);
        let mid = Color::rgb(0x80, 0x80, 0x80).relative_luminance();
        assert!(mid > 0.2 && mid < 0.25, "mid grey luminance was {}", mid);
    }

    #[test]
    fn test_lighten_darken_saturate() {
        let c = Color::rgb(250, 10, 128);
        assert_eq!(c.lighten(0.1), Color::rgb(255, 35, 153));
        assert_eq!(c.darken(0.1), Color::rgb(225, 0, 103));
        assert_eq!(c.shift_channels(-30), Color::rgb(220, 0, 98));
    }
}
