// SPDX-License-Identifier: GPL-3.0-only

//! Host text surface abstraction.
//!
//! The keyboard never edits text directly. It talks to whatever editable
//! field currently has focus through [`HostTextSurface`]. Two
//! implementations ship with the crate:
//!
//! - [`TextBuffer`]: an in-memory field, used by tests and the script driver
//! - [`VirtualKeyboard`](crate::input::VirtualKeyboard): turns edits into
//!   XKB key events for a compositor

use serde::{Deserialize, Serialize};
use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;
use std::str::FromStr;

/// Semantic intent the host field declares for its Enter key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EditorAction {
    /// The field wants a line break.
    #[default]
    None,
    /// The field did not declare an action; treated as a line break.
    Unspecified,
    Submit,
    Search,
    Go,
    Send,
    Next,
    Done,
}

impl EditorAction {
    /// Returns `true` if Enter should insert a newline for this action.
    pub fn inserts_newline(self) -> bool {
        matches!(self, EditorAction::None | EditorAction::Unspecified)
    }
}

impl fmt::Display for EditorAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            EditorAction::None => "none",
            EditorAction::Unspecified => "unspecified",
            EditorAction::Submit => "submit",
            EditorAction::Search => "search",
            EditorAction::Go => "go",
            EditorAction::Send => "send",
            EditorAction::Next => "next",
            EditorAction::Done => "done",
        };
        write!(f, "{}", name)
    }
}

impl FromStr for EditorAction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "none" => Ok(EditorAction::None),
            "unspecified" => Ok(EditorAction::Unspecified),
            "submit" => Ok(EditorAction::Submit),
            "search" => Ok(EditorAction::Search),
            "go" => Ok(EditorAction::Go),
            "send" => Ok(EditorAction::Send),
            "next" => Ok(EditorAction::Next),
            "done" => Ok(EditorAction::Done),
            other => Err(format!("unknown editor action '{}'", other)),
        }
    }
}

/// Direction of a single-character cursor move.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CursorDirection {
    Left,
    Right,
}

impl fmt::Display for CursorDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CursorDirection::Left => write!(f, "left"),
            CursorDirection::Right => write!(f, "right"),
        }
    }
}

/// An editable target the keyboard commits text into.
///
/// Implementations must tolerate every call at any time. Deleting from an
/// empty field is not an error.
pub trait HostTextSurface {
    /// Inserts `text` at the cursor.
    fn commit_text(&mut self, text: &str);

    /// Deletes up to `count` characters before the cursor.
    ///
    /// Returns how many characters were actually removed, when known.
    fn delete_backward(&mut self, count: usize) -> usize;

    /// The action the field wants Enter to perform.
    fn requested_editor_action(&self) -> EditorAction;

    /// Performs an editor action instead of inserting a newline.
    fn perform_editor_action(&mut self, action: EditorAction);

    /// Moves the cursor one character. Returns `false` if it did not move.
    ///
    /// Surfaces without a cursor leave this as a no-op.
    fn move_cursor(&mut self, _direction: CursorDirection) -> bool {
        false
    }

    /// Removes all text from the field. A no-op unless overridden.
    fn clear_all(&mut self) {}
}

/// Shares a surface between the keyboard session and its owner.
impl<S: HostTextSurface + ?Sized> HostTextSurface for Rc<RefCell<S>> {
    fn commit_text(&mut self, text: &str) {
        self.borrow_mut().commit_text(text);
    }

    fn delete_backward(&mut self, count: usize) -> usize {
        self.borrow_mut().delete_backward(count)
    }

    fn requested_editor_action(&self) -> EditorAction {
        self.borrow().requested_editor_action()
    }

    fn perform_editor_action(&mut self, action: EditorAction) {
        self.borrow_mut().perform_editor_action(action);
    }

    fn move_cursor(&mut self, direction: CursorDirection) -> bool {
        self.borrow_mut().move_cursor(direction)
    }

    fn clear_all(&mut self) {
        self.borrow_mut().clear_all();
    }
}

// ============================================================================
// In-memory surface
// ============================================================================

/// A plain text field with a movable cursor.
///
/// Text is inserted and deleted at the cursor, which starts at the end.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TextBuffer {
    text: String,
    /// Byte offset of the cursor, always on a char boundary.
    cursor: usize,
    action: EditorAction,
    performed: Vec<EditorAction>,
}

impl TextBuffer {
    /// Creates an empty buffer that requests a newline on Enter.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty buffer that requests `action` on Enter.
    pub fn with_action(action: EditorAction) -> Self {
        Self {
            action,
            ..Self::default()
        }
    }

    /// Current contents.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Cursor position in characters from the start.
    pub fn cursor(&self) -> usize {
        self.text[..self.cursor].chars().count()
    }

    /// Editor actions performed so far, oldest first.
    pub fn performed_actions(&self) -> &[EditorAction] {
        &self.performed
    }

    /// Changes the action requested for Enter.
    pub fn set_requested_action(&mut self, action: EditorAction) {
        self.action = action;
    }

    /// Empties the buffer.
    pub fn clear(&mut self) {
        self.text.clear();
        self.cursor = 0;
    }
}

impl HostTextSurface for TextBuffer {
    fn commit_text(&mut self, text: &str) {
        self.text.insert_str(self.cursor, text);
        self.cursor += text.len();
    }

    fn delete_backward(&mut self, count: usize) -> usize {
        let mut removed = 0;
        while removed < count {
            let Some(c) = self.text[..self.cursor].chars().next_back() else {
                break;
            };
            self.cursor -= c.len_utf8();
            self.text.remove(self.cursor);
            removed += 1;
        }
        removed
    }

    fn requested_editor_action(&self) -> EditorAction {
        self.action
    }

    fn perform_editor_action(&mut self, action: EditorAction) {
        self.performed.push(action);
    }

    fn move_cursor(&mut self, direction: CursorDirection) -> bool {
        let step = match direction {
            CursorDirection::Left => self.text[..self.cursor].chars().next_back(),
            CursorDirection::Right => self.text[self.cursor..].chars().next(),
        };
        let Some(c) = step else {
            return false;
        };
        match direction {
            CursorDirection::Left => self.cursor -= c.len_utf8(),
            CursorDirection::Right => self.cursor += c.len_utf8(),
        }
        true
    }

    fn clear_all(&mut self) {
        self.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Test 1: Deleting counts characters, not bytes
    #[test]
    fn test_delete_multibyte() {
        let mut buf = TextBuffer::new();
        buf.commit_text("aπ€");
        assert_eq!(buf.delete_backward(2), 2);
        assert_eq!(buf.text(), "a");
    }

    /// Test 2: Deleting past the start removes what is there and stops
    #[test]
    fn test_delete_past_start() {
        let mut buf = TextBuffer::new();
        buf.commit_text("ab");
        assert_eq!(buf.delete_backward(5), 2);
        assert_eq!(buf.delete_backward(1), 0, "empty buffer deletes nothing");
        assert_eq!(buf.text(), "");
    }

    /// Test 3: Shared surfaces observe edits made through the handle
    #[test]
    fn test_shared_surface() {
        let shared = Rc::new(RefCell::new(TextBuffer::with_action(EditorAction::Search)));
        let mut handle = Rc::clone(&shared);
        handle.commit_text("hi");
        handle.perform_editor_action(handle.requested_editor_action());

        assert_eq!(shared.borrow().text(), "hi");
        assert_eq!(shared.borrow().performed_actions(), &[EditorAction::Search]);
    }

    /// Test 4: Edits land at the cursor after it moves
    #[test]
    fn test_edit_at_cursor() {
        let mut buf = TextBuffer::new();
        buf.commit_text("hllo");
        assert!(buf.move_cursor(CursorDirection::Left));
        assert!(buf.move_cursor(CursorDirection::Left));
        assert!(buf.move_cursor(CursorDirection::Left));
        buf.commit_text("e");
        assert_eq!(buf.text(), "hello");
        assert_eq!(buf.cursor(), 2);

        assert!(buf.move_cursor(CursorDirection::Right));
        assert_eq!(buf.delete_backward(1), 1);
        assert_eq!(buf.text(), "helo");
        assert_eq!(buf.cursor(), 2);
    }

    /// Test 5: The cursor stops at both ends and steps over whole characters
    #[test]
    fn test_cursor_bounds() {
        let mut buf = TextBuffer::new();
        buf.commit_text("é👋");
        assert!(!buf.move_cursor(CursorDirection::Right), "already at the end");
        assert!(buf.move_cursor(CursorDirection::Left));
        assert!(buf.move_cursor(CursorDirection::Left));
        assert!(!buf.move_cursor(CursorDirection::Left), "already at the start");
        assert_eq!(buf.delete_backward(1), 0);

        buf.clear_all();
        assert_eq!(buf.text(), "");
        assert_eq!(buf.cursor(), 0);
    }

    #[test]
    fn test_newline_actions() {
        assert!(EditorAction::None.inserts_newline());
        assert!(EditorAction::Unspecified.inserts_newline());
        for action in [
            EditorAction::Submit,
            EditorAction::Search,
            EditorAction::Go,
            EditorAction::Send,
            EditorAction::Next,
            EditorAction::Done,
        ] {
            assert!(!action.inserts_newline(), "{} must not insert a newline", action);
            assert_eq!(action.to_string().parse::<EditorAction>(), Ok(action));
        }
    }
}
