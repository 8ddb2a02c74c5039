// SPDX-License-Identifier: GPL-3.0-only

//! Translates key presses into edits on the host surface.
//!
//! [`commit`] takes the current [`ModeState`] by value and returns the next
//! state together with a description of what happened. It never fails: with
//! no surface attached every key, mode keys included, is a no-op reported as
//! [`SideEffect::NoSurface`].

use crate::input::classifier::{self, KeyRole};
use crate::input::mode::ModeState;
use crate::input::surface::{CursorDirection, EditorAction, HostTextSurface};
use crate::layout::KeyId;

/// What a key press did to the outside world.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SideEffect {
    /// Text was inserted.
    Committed(String),
    /// Backspace ran; carries the number of characters the surface removed.
    Deleted(usize),
    /// Enter triggered the field's editor action instead of a newline.
    EditorAction(EditorAction),
    /// Only the mode state changed.
    ModeChanged,
    /// The cursor was asked to move; `moved` is `false` at either end.
    CursorMoved {
        direction: CursorDirection,
        moved: bool,
    },
    /// All text in the field was removed.
    Cleared,
    /// A haptic pulse was requested. The field is untouched.
    Pulsed,
    /// A text edit was requested but no surface is attached.
    NoSurface,
}

impl SideEffect {
    /// Returns `true` if the press had a visible effect worth a haptic pulse.
    pub fn is_key_action(&self) -> bool {
        !matches!(self, SideEffect::NoSurface)
    }
}

/// Result of committing one key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitOutcome {
    /// Mode state after the press.
    pub state: ModeState,
    /// What happened.
    pub effect: SideEffect,
}

/// Commits `key` against `surface` in the given state.
///
/// # Arguments
///
/// * `key` - The pressed key
/// * `state` - Mode state at the time of the press
/// * `surface` - The focused field, or `None` when nothing is editable
///
/// # Returns
///
/// The next mode state and the side effect of the press.
///
/// # Example
///
/// ```rust,ignore
/// use fastboard::input::{commit, ModeState, TextBuffer};
/// use fastboard::layout::KeyId;
///
/// let mut field = TextBuffer::new();
/// let shifted = ModeState::new().toggle_shift();
/// let outcome = commit(KeyId::Char('i'), shifted, Some(&mut field));
/// assert_eq!(field.text(), "I");
/// assert!(!outcome.state.shift);
/// ```
pub fn commit(
    key: KeyId,
    state: ModeState,
    surface: Option<&mut (dyn HostTextSurface + '_)>,
) -> CommitOutcome {
    let Some(surface) = surface else {
        tracing::trace!("No surface attached, ignoring {}", key);
        return CommitOutcome {
            state,
            effect: SideEffect::NoSurface,
        };
    };

    match classifier::classify(key).role {
        KeyRole::Character | KeyRole::Space => {
            let text = classifier::commit_text(key, &state).unwrap_or_default();
            surface.commit_text(&text);
            CommitOutcome {
                state: state.after_commit(),
                effect: SideEffect::Committed(text),
            }
        }
        KeyRole::Backspace => {
            let removed = surface.delete_backward(1);
            CommitOutcome {
                state,
                effect: SideEffect::Deleted(removed),
            }
        }
        KeyRole::Enter => CommitOutcome {
            state,
            effect: perform_enter(surface),
        },
        KeyRole::Shift | KeyRole::ModeSwitch => {
            let next = state.on_key(key);
            tracing::debug!("Mode transition on {}: {} -> {}", key, state, next);
            CommitOutcome {
                state: next,
                effect: SideEffect::ModeChanged,
            }
        }
    }
}

/// Runs the Enter policy against `surface`.
///
/// A field that requests no action (or leaves it unspecified) receives a
/// literal newline. Any other action is performed and no text is inserted.
pub fn perform_enter(surface: &mut (dyn HostTextSurface + '_)) -> SideEffect {
    let action = surface.requested_editor_action();
    if action.inserts_newline() {
        surface.commit_text("\n");
        SideEffect::Committed("\n".into())
    } else {
        tracing::debug!("Enter performs editor action '{}'", action);
        surface.perform_editor_action(action);
        SideEffect::EditorAction(action)
    }
}

/// Inserts `text` verbatim, bypassing key classification and mode state.
pub fn inject_text(text: &str, surface: Option<&mut (dyn HostTextSurface + '_)>) -> SideEffect {
    match surface {
        Some(surface) => {
            surface.commit_text(text);
            SideEffect::Committed(text.to_string())
        }
        None => {
            tracing::trace!("No surface attached, dropping injected text");
            SideEffect::NoSurface
        }
    }
}

/// Deletes `count` characters before the cursor.
pub fn delete_backward(
    count: usize,
    surface: Option<&mut (dyn HostTextSurface + '_)>,
) -> SideEffect {
    match surface {
        Some(surface) => SideEffect::Deleted(surface.delete_backward(count)),
        None => SideEffect::NoSurface,
    }
}

/// Moves the cursor one character in `direction`.
pub fn move_cursor(
    direction: CursorDirection,
    surface: Option<&mut (dyn HostTextSurface + '_)>,
) -> SideEffect {
    match surface {
        Some(surface) => SideEffect::CursorMoved {
            direction,
            moved: surface.move_cursor(direction),
        },
        None => SideEffect::NoSurface,
    }
}

/// Empties the field.
pub fn clear_all(surface: Option<&mut (dyn HostTextSurface + '_)>) -> SideEffect {
    match surface {
        Some(surface) => {
            surface.clear_all();
            SideEffect::Cleared
        }
        None => SideEffect::NoSurface,
    }
}

// ============================================================================
// Tests
// ============================================================================
