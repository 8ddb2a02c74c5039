// SPDX-License-Identifier: GPL-3.0-only

//! Key input pipeline.
//!
//! A touch on a key travels through three stages before it reaches the
//! focused text field:
//!
//! 1. **classifier**: decides what the key is (character, Shift, Enter, ...),
//!    how wide it renders and what it would commit
//! 2. **mode**: [`ModeState`] tracks the active layout plus shift and caps
//! 3. **committer**: applies the key to a [`HostTextSurface`] and returns
//!    the next state with a [`SideEffect`]
//!
//! Held keys are driven by [`RepeatScheduler`], which owns the long-press
//! deadline and the repeat cadence.
//!
//! # Surfaces
//!
//! - [`TextBuffer`]: in-memory field
//! - [`VirtualKeyboard`]: XKB key events for a compositor
//!
//! # Example
//!
//! ```rust,ignore
//! use fastboard::input::{commit, ModeState, TextBuffer};
//! use fastboard::layout::KeyId;
//!
//! let mut field = TextBuffer::new();
//! let state = ModeState::new();
//! let outcome = commit(KeyId::Shift, state, Some(&mut field));
//! let outcome = commit(KeyId::Char('a'), outcome.state, Some(&mut field));
//! assert_eq!(field.text(), "A");
//! ```

pub mod classifier;
pub mod committer;
pub mod mode;
pub mod repeat;
pub mod surface;
pub mod virtual_keyboard;

pub use classifier::{classify, ColorClass, KeyClass, KeyRole};
pub use committer::{commit, CommitOutcome, SideEffect};
pub use mode::{FieldClass, ModeState};
pub use repeat::{RepeatScheduler, RepeatSession, RepeatTicket, RepeatTiming};
pub use surface::{CursorDirection, EditorAction, HostTextSurface, TextBuffer};
pub use virtual_keyboard::{
    keycodes, KeyEvent, KeyPosition, KeyState, VirtualKeyboard, VirtualKeyboardError,
};
