// SPDX-License-Identifier: GPL-3.0-only

//! Core data types for the keyboard layout tables.
//!
//! A layout is a closed, statically known set of rows per [`LayoutMode`].
//! Every key position is named by a [`KeyId`], which is either a literal
//! character or one of a small set of control keys. Resolving keys into a
//! closed enumeration up front lets the compiler check that every control
//! key is handled wherever a `match` consumes it.

use serde::{Deserialize, Serialize};
use std::fmt;

// ============================================================================
// Layout Mode
// ============================================================================

/// Which of the three key-row tables is currently displayed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LayoutMode {
    /// Alphabetic QWERTY rows.
    #[default]
    Letters,
    /// Digits and common punctuation.
    Numbers,
    /// Less common symbols, reachable from the numbers table.
    Symbols,
}

impl LayoutMode {
    /// All layout modes, in table order.
    pub const ALL: [LayoutMode; 3] =
        [LayoutMode::Letters, LayoutMode::Numbers, LayoutMode::Symbols];
}

impl fmt::Display for LayoutMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LayoutMode::Letters => write!(f, "letters"),
            LayoutMode::Numbers => write!(f, "numbers"),
            LayoutMode::Symbols => write!(f, "symbols"),
        }
    }
}

// ============================================================================
// Key Identifier
// ============================================================================

/// Names a key position in a layout table.
///
/// Character keys carry the literal character they commit (in lowercase for
/// letters). All other variants are control keys with fixed behaviour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyId {
    /// A key that commits a literal character.
    Char(char),
    /// Cycles shift: off, one-shot shift, caps lock.
    Shift,
    /// Deletes one character before the cursor. Repeats when held.
    Backspace,
    /// Newline or the host field's editor action.
    Enter,
    /// Commits a single space.
    Space,
    /// Switches to the numbers table ("123").
    ModeNumbers,
    /// Switches to the letters table ("ABC").
    ModeLetters,
    /// Switches to the symbols table ("#+=").
    ModeSymbols,
}

impl KeyId {
    /// Parses a row token as used in the textual layout tables.
    ///
    /// Control tokens are `⇧`, `⌫`, `↵`, `SPACE`, `123`, `ABC` and `#+=`.
    /// Any other token consisting of exactly one character is a character key.
    ///
    /// # Returns
    ///
    /// `None` for empty tokens and unknown multi-character tokens.
    ///
    /// # Example
    ///
    /// ```rust,ignore
    /// use fastboard::layout::KeyId;
    ///
    /// assert_eq!(KeyId::from_token("⌫"), Some(KeyId::Backspace));
    /// assert_eq!(KeyId::from_token("q"), Some(KeyId::Char('q')));
    /// assert_eq!(KeyId::from_token("qq"), None);
    /// ```
    pub fn from_token(token: &str) -> Option<Self> {
        match token {
            "⇧" => Some(KeyId::Shift),
            "⌫" => Some(KeyId::Backspace),
            "↵" => Some(KeyId::Enter),
            "SPACE" => Some(KeyId::Space),
            "123" => Some(KeyId::ModeNumbers),
            "ABC" => Some(KeyId::ModeLetters),
            "#+=" => Some(KeyId::ModeSymbols),
            _ => {
                let mut chars = token.chars();
                match (chars.next(), chars.next()) {
                    (Some(c), None) => Some(KeyId::Char(c)),
                    _ => None,
                }
            }
        }
    }

    /// Returns the row token for this key (inverse of [`KeyId::from_token`]).
    pub fn token(&self) -> String {
        match self {
            KeyId::Char(c) => c.to_string(),
            KeyId::Shift => "⇧".into(),
            KeyId::Backspace => "⌫".into(),
            KeyId::Enter => "↵".into(),
            KeyId::Space => "SPACE".into(),
            KeyId::ModeNumbers => "123".into(),
            KeyId::ModeLetters => "ABC".into(),
            KeyId::ModeSymbols => "#+=".into(),
        }
    }

    /// Returns the layout mode this key switches to, if it is a mode-switch key.
    pub fn target_mode(&self) -> Option<LayoutMode> {
        match self {
            KeyId::ModeNumbers => Some(LayoutMode::Numbers),
            KeyId::ModeLetters => Some(LayoutMode::Letters),
            KeyId::ModeSymbols => Some(LayoutMode::Symbols),
            _ => None,
        }
    }

    /// Returns `true` for every key except character keys.
    pub fn is_control(&self) -> bool {
        !matches!(self, KeyId::Char(_))
    }
}

impl fmt::Display for KeyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.token())
    }
}

// ============================================================================
// Validation Types
// ============================================================================

/// Severity level for layout table issues.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// The table cannot be used as-is.
    Error,
    /// The table works but deviates from the expected shape.
    Warning,
}

/// A problem discovered while checking a layout table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationIssue {
    /// Severity level (Error or Warning)
    pub severity: Severity,
    /// Human-readable description of the issue
    pub message: String,
    /// Path to the offending position (e.g., "numbers.rows[3].keys[0]")
    pub field_path: String,
    /// Optional suggestion for how to fix the issue
    pub suggestion: Option<String>,
}

impl ValidationIssue {
    /// Creates a new validation issue.
    pub fn new(
        severity: Severity,
        message: impl Into<String>,
        field_path: impl Into<String>,
    ) -> Self {
        Self {
            severity,
            message: message.into(),
            field_path: field_path.into(),
            suggestion: None,
        }
    }

    /// Adds a suggestion to the validation issue.
    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }
}

impl fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let level = match self.severity {
            Severity::Error => "Error",
            Severity::Warning => "Warning",
        };
        write!(f, "{} at '{}': {}", level, self.field_path, self.message)?;
        if let Some(hint) = &self.suggestion {
            write!(f, " (suggestion: {})", hint)?;
        }
        Ok(())
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    /// Test 1: Control tokens parse to their dedicated variants
    #[test]
    fn test_control_tokens_parse() {
        assert_eq!(KeyId::from_token("⇧"), Some(KeyId::Shift));
        assert_eq!(KeyId::from_token("⌫"), Some(KeyId::Backspace));
        assert_eq!(KeyId::from_token("↵"), Some(KeyId::Enter));
        assert_eq!(KeyId::from_token("SPACE"), Some(KeyId::Space));
        assert_eq!(KeyId::from_token("123"), Some(KeyId::ModeNumbers));
        assert_eq!(KeyId::from_token("ABC"), Some(KeyId::ModeLetters));
        assert_eq!(KeyId::from_token("#+="), Some(KeyId::ModeSymbols));
    }

    /// Test 2: Single characters (including multi-byte ones) are character keys
    #[test]
    fn test_single_character_tokens() {
        assert_eq!(KeyId::from_token("q"), Some(KeyId::Char('q')));
        assert_eq!(KeyId::from_token("π"), Some(KeyId::Char('π')));
        assert_eq!(KeyId::from_token("\\"), Some(KeyId::Char('\\')));
    }

    /// Test 3: Empty and unknown multi-character tokens are rejected
    #[test]
    fn test_invalid_tokens() {
        assert_eq!(KeyId::from_token(""), None);
        assert_eq!(KeyId::from_token("space"), None, "tokens are case-sensitive");
        assert_eq!(KeyId::from_token("ab"), None);
    }

    /// Test 4: token() is the inverse of from_token()
    #[test]
    fn test_token_inverse() {
        for key in [
            KeyId::Char('x'),
            KeyId::Shift,
            KeyId::Backspace,
            KeyId::Enter,
            KeyId::Space,
            KeyId::ModeNumbers,
            KeyId::ModeLetters,
            KeyId::ModeSymbols,
        ] {
            assert_eq!(KeyId::from_token(&key.token()), Some(key), "round trip for {:?}", key);
        }
    }

    /// Test 5: Mode-switch keys report their target mode
    #[test]
    fn test_target_mode() {
        assert_eq!(KeyId::ModeNumbers.target_mode(), Some(LayoutMode::Numbers));
        assert_eq!(KeyId::ModeLetters.target_mode(), Some(LayoutMode::Letters));
        assert_eq!(KeyId::ModeSymbols.target_mode(), Some(LayoutMode::Symbols));
        assert_eq!(KeyId::Shift.target_mode(), None);
        assert!(!KeyId::Char('a').is_control());
        assert!(KeyId::Space.is_control());
    }

    #[test]
    fn test_validation_issue_display() {
        let issue = ValidationIssue::new(Severity::Warning, "Row is empty", "letters.rows[2]")
            .with_suggestion("Add at least one key");
        let text = issue.to_string();
        assert!(text.contains("Warning"));
        assert!(text.contains("letters.rows[2]"));
        assert!(text.contains("Add at least one key"));
    }
}
