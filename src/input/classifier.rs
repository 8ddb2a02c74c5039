// SPDX-License-Identifier: GPL-3.0-only

//! Key classification.
//!
//! Maps a [`KeyId`] to its semantic role, its layout weight and the colour
//! class used to paint it. Labels and colour classes depend on the current
//! [`ModeState`]; roles and weights do not.
//!
//! # Weights
//!
//! | Key                                  | Weight |
//! |--------------------------------------|--------|
//! | Space                                | 5.0    |
//! | Shift, Backspace, Enter, mode keys   | 1.5    |
//! | Character keys                       | 1.0    |

use crate::input::mode::ModeState;
use crate::layout::KeyId;

/// Layout weight of the space bar.
pub const SPACE_WEIGHT: f32 = 5.0;

/// Layout weight of control keys other than space.
pub const SPECIAL_WEIGHT: f32 = 1.5;

/// Layout weight of character keys.
pub const CHAR_WEIGHT: f32 = 1.0;

/// Fixed label shown on the space bar.
pub const SPACE_LABEL: &str = "space";

/// Semantic role of a key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyRole {
    Character,
    Shift,
    Backspace,
    Enter,
    Space,
    ModeSwitch,
}

/// Colour class of a key, resolved to a concrete colour by the palette.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ColorClass {
    /// Ordinary character key.
    Base,
    /// Backspace, mode keys and inactive Shift.
    Special,
    /// The space bar.
    Space,
    /// The Enter key.
    Accent,
    /// Shift while one-shot shift is active.
    AccentDim,
    /// Shift while caps lock is active.
    AccentCaps,
}

/// State-independent classification of a key.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct KeyClass {
    pub role: KeyRole,
    pub weight: f32,
}

/// Classifies a key.
pub fn classify(key: KeyId) -> KeyClass {
    let role = match key {
        KeyId::Char(_) => KeyRole::Character,
        KeyId::Shift => KeyRole::Shift,
        KeyId::Backspace => KeyRole::Backspace,
        KeyId::Enter => KeyRole::Enter,
        KeyId::Space => KeyRole::Space,
        KeyId::ModeNumbers | KeyId::ModeLetters | KeyId::ModeSymbols => KeyRole::ModeSwitch,
    };
    KeyClass {
        role,
        weight: weight(role),
    }
}

/// Returns the layout weight for a role.
pub fn weight(role: KeyRole) -> f32 {
    match role {
        KeyRole::Space => SPACE_WEIGHT,
        KeyRole::Shift | KeyRole::Backspace | KeyRole::Enter | KeyRole::ModeSwitch => {
            SPECIAL_WEIGHT
        }
        KeyRole::Character => CHAR_WEIGHT,
    }
}

/// Returns the label drawn on `key` in the given state.
///
/// Character keys show uppercase while shift or caps is active. Shift shows
/// `⇧` when off, `⬆` for one-shot shift and `⇪` for caps lock.
pub fn display_text(key: KeyId, state: &ModeState) -> String {
    match key {
        KeyId::Char(c) => {
            if state.is_uppercase() {
                c.to_uppercase().collect()
            } else {
                c.to_string()
            }
        }
        KeyId::Shift => {
            if state.caps {
                "⇪".into()
            } else if state.shift {
                "⬆".into()
            } else {
                "⇧".into()
            }
        }
        KeyId::Space => SPACE_LABEL.into(),
        KeyId::Backspace | KeyId::Enter | KeyId::ModeNumbers | KeyId::ModeLetters
        | KeyId::ModeSymbols => key.token(),
    }
}

/// Returns the text a key commits in the given state, if it commits any.
///
/// Only character keys and space produce text. Enter is handled by the
/// committer because its output depends on the host field.
pub fn commit_text(key: KeyId, state: &ModeState) -> Option<String> {
    match key {
        KeyId::Char(c) => Some(if state.is_uppercase() {
            c.to_uppercase().collect()
        } else {
            c.to_lowercase().collect()
        }),
        KeyId::Space => Some(" ".into()),
        _ => None,
    }
}

/// Returns the colour class of `key` in the given state.
pub fn color_class(key: KeyId, state: &ModeState) -> ColorClass {
    match classify(key).role {
        KeyRole::Enter => ColorClass::Accent,
        KeyRole::Shift if state.caps => ColorClass::AccentCaps,
        KeyRole::Shift if state.shift => ColorClass::AccentDim,
        KeyRole::Shift | KeyRole::Backspace | KeyRole::ModeSwitch => ColorClass::Special,
        KeyRole::Space => ColorClass::Space,
        KeyRole::Character => ColorClass::Base,
    }
}

/// Returns the label text size for `key`, given the configured size for
/// character keys.
pub fn text_size(key: KeyId, char_size: f32) -> f32 {
    match key {
        KeyId::Enter | KeyId::Backspace => 24.0,
        KeyId::Shift => 26.0,
        KeyId::Space => 12.0,
        KeyId::ModeNumbers | KeyId::ModeLetters | KeyId::ModeSymbols => 14.0,
        KeyId::Char(_) => char_size,
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::{self, LayoutMode};

    fn shifted() -> ModeState {
        ModeState::new().toggle_shift()
    }

    fn caps() -> ModeState {
        ModeState::new().toggle_shift().toggle_shift()
    }

    /// Test 1: Every key in every table classifies to a known role
    #[test]
    fn test_all_table_keys_classify() {
        for mode in LayoutMode::ALL {
            for key in layout::keys(mode) {
                let class = classify(key);
                let expected = match key {
                    KeyId::Char(_) => KeyRole::Character,
                    KeyId::Shift => KeyRole::Shift,
                    KeyId::Backspace => KeyRole::Backspace,
                    KeyId::Enter => KeyRole::Enter,
                    KeyId::Space => KeyRole::Space,
                    _ => KeyRole::ModeSwitch,
                };
                assert_eq!(class.role, expected, "role of {} in {}", key, mode);
                assert!(class.weight > 0.0);
            }
        }
    }

    /// Test 2: Weights match the fixed proportions
    #[test]
    fn test_weights() {
        assert_eq!(classify(KeyId::Space).weight, 5.0);
        for key in [
            KeyId::Shift,
            KeyId::Backspace,
            KeyId::Enter,
            KeyId::ModeNumbers,
            KeyId::ModeLetters,
            KeyId::ModeSymbols,
        ] {
            assert_eq!(classify(key).weight, 1.5, "weight of {}", key);
        }
        assert_eq!(classify(KeyId::Char('a')).weight, 1.0);
    }

    /// Test 3: Character labels follow shift and caps
    #[test]
    fn test_character_labels() {
        assert_eq!(display_text(KeyId::Char('a'), &ModeState::new()), "a");
        assert_eq!(display_text(KeyId::Char('a'), &shifted()), "A");
        assert_eq!(display_text(KeyId::Char('a'), &caps()), "A");
        assert_eq!(display_text(KeyId::Char('1'), &caps()), "1");
    }

    /// Test 4: Shift glyph shows the active state
    #[test]
    fn test_shift_labels() {
        assert_eq!(display_text(KeyId::Shift, &ModeState::new()), "⇧");
        assert_eq!(display_text(KeyId::Shift, &shifted()), "⬆");
        assert_eq!(display_text(KeyId::Shift, &caps()), "⇪");
    }

    /// Test 5: Fixed labels do not depend on state
    #[test]
    fn test_fixed_labels() {
        for state in [ModeState::new(), shifted(), caps()] {
            assert_eq!(display_text(KeyId::Space, &state), "space");
            assert_eq!(display_text(KeyId::ModeNumbers, &state), "123");
            assert_eq!(display_text(KeyId::ModeLetters, &state), "ABC");
            assert_eq!(display_text(KeyId::ModeSymbols, &state), "#+=");
        }
    }

    /// Test 6: Colour classes for every role
    #[test]
    fn test_color_classes() {
        let off = ModeState::new();
        assert_eq!(color_class(KeyId::Enter, &off), ColorClass::Accent);
        assert_eq!(color_class(KeyId::Shift, &off), ColorClass::Special);
        assert_eq!(color_class(KeyId::Shift, &shifted()), ColorClass::AccentDim);
        assert_eq!(color_class(KeyId::Shift, &caps()), ColorClass::AccentCaps);
        assert_eq!(color_class(KeyId::Backspace, &off), ColorClass::Special);
        assert_eq!(color_class(KeyId::ModeLetters, &off), ColorClass::Special);
        assert_eq!(color_class(KeyId::Space, &off), ColorClass::Space);
        assert_eq!(color_class(KeyId::Char('x'), &caps()), ColorClass::Base);
    }

    #[test]
    fn test_commit_text() {
        assert_eq!(commit_text(KeyId::Char('h'), &ModeState::new()).as_deref(), Some("h"));
        assert_eq!(commit_text(KeyId::Char('i'), &shifted()).as_deref(), Some("I"));
        assert_eq!(commit_text(KeyId::Space, &shifted()).as_deref(), Some(" "));
        assert_eq!(commit_text(KeyId::Enter, &ModeState::new()), None);
        assert_eq!(commit_text(KeyId::Shift, &ModeState::new()), None);
    }

    #[test]
    fn test_text_sizes() {
        assert_eq!(text_size(KeyId::Char('a'), 20.0), 20.0);
        assert_eq!(text_size(KeyId::Shift, 20.0), 26.0);
        assert_eq!(text_size(KeyId::Space, 20.0), 12.0);
        assert_eq!(text_size(KeyId::ModeSymbols, 20.0), 14.0);
    }
}
