// SPDX-License-Identifier: GPL-3.0-only

//! Layout mode and shift state for one input session.
//!
//! [`ModeState`] is a small `Copy` value. Every transition takes the current
//! state and returns the next one, so callers always hold an explicit
//! snapshot and there is no hidden shared flag to fall out of sync.
//!
//! Shift behaves like a one-shot modifier with a toggle mode on top:
//!
//! - **Off**: lowercase output
//! - **Shift**: the next character or space is uppercase, then shift clears
//! - **Caps**: every character is uppercase until Shift is pressed again
//!
//! # Example
//!
//! ```rust,ignore
//! use fastboard::input::{FieldClass, ModeState};
//!
//! let state = ModeState::for_session(FieldClass::Text).toggle_shift();
//! assert!(state.is_uppercase());
//!
//! let state = state.after_commit();
//! assert!(!state.is_uppercase());
//! ```

use crate::layout::{KeyId, LayoutMode};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Input class declared by the host field when a session starts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldClass {
    /// Free text.
    #[default]
    Text,
    /// Numeric entry.
    Number,
    /// Phone number entry.
    Phone,
    /// Anything else (dates, unknown classes).
    Other,
}

impl FieldClass {
    /// Returns the layout mode a fresh session on this field starts in.
    pub fn initial_layout(self) -> LayoutMode {
        match self {
            FieldClass::Number | FieldClass::Phone => LayoutMode::Numbers,
            FieldClass::Text | FieldClass::Other => LayoutMode::Letters,
        }
    }
}

impl FromStr for FieldClass {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "text" => Ok(FieldClass::Text),
            "number" | "numeric" => Ok(FieldClass::Number),
            "phone" => Ok(FieldClass::Phone),
            "other" => Ok(FieldClass::Other),
            other => Err(format!("unknown field class '{}'", other)),
        }
    }
}

/// The key-input state machine: current table plus shift and caps flags.
///
/// `caps` implies uppercase output regardless of `shift`. The transitions in
/// this type never produce `shift && caps`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ModeState {
    /// Which table is displayed.
    pub layout: LayoutMode,
    /// One-shot shift, cleared by the next character or space commit.
    pub shift: bool,
    /// Sticky caps lock.
    pub caps: bool,
}

impl ModeState {
    /// Creates the initial state: letters, shift and caps off.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            layout: LayoutMode::Letters,
            shift: false,
            caps: false,
        }
    }

    /// Creates the state for a new session on a field of the given class.
    ///
    /// Numeric and phone fields open on the numbers table. Shift and caps are
    /// always cleared.
    #[must_use]
    pub fn for_session(field: FieldClass) -> Self {
        Self {
            layout: field.initial_layout(),
            shift: false,
            caps: false,
        }
    }

    /// Returns `true` if character keys currently produce uppercase output.
    #[must_use]
    pub fn is_uppercase(&self) -> bool {
        self.shift || self.caps
    }

    /// Advances the shift cycle: off, shift, caps, off.
    #[must_use]
    pub fn toggle_shift(self) -> Self {
        let (shift, caps) = if self.caps {
            (false, false)
        } else if self.shift {
            (false, true)
        } else {
            (true, false)
        };
        Self { shift, caps, ..self }
    }

    /// Applies the one-shot reset after a character or space commit.
    ///
    /// Shift is consumed only when caps is off. Caps is never cleared here.
    #[must_use]
    pub fn after_commit(self) -> Self {
        if self.shift && !self.caps {
            Self { shift: false, ..self }
        } else {
            self
        }
    }

    /// Switches the displayed table. Shift and caps are left alone.
    #[must_use]
    pub fn switch_layout(self, layout: LayoutMode) -> Self {
        Self { layout, ..self }
    }

    /// Applies the pure state transition for a key press.
    ///
    /// Shift and mode-switch keys change the state. All other keys leave it
    /// untouched; their post-commit effect is [`ModeState::after_commit`].
    #[must_use]
    pub fn on_key(self, key: KeyId) -> Self {
        match key {
            KeyId::Shift => self.toggle_shift(),
            KeyId::ModeNumbers | KeyId::ModeLetters | KeyId::ModeSymbols => {
                match key.target_mode() {
                    Some(layout) => self.switch_layout(layout),
                    None => self,
                }
            }
            KeyId::Char(_) | KeyId::Backspace | KeyId::Enter | KeyId::Space => self,
        }
    }
}

impl fmt::Display for ModeState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let shift = match (self.shift, self.caps) {
            (_, true) => "caps",
            (true, false) => "shift",
            (false, false) => "off",
        };
        write!(f, "{} ({})", self.layout, shift)
    }
}

// ============================================================================
// Tests
// ============================================================================
