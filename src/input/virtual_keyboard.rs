// SPDX-License-Identifier: GPL-3.0-only

//! XKB-backed text surface.
//!
//! [`VirtualKeyboard`] turns committed text into hardware key events that a
//! compositor can replay through a virtual keyboard protocol. It resolves
//! every character against the system XKB keymap:
//!
//! - Characters on level 0 of some key are a plain press and release
//! - Characters on level 1 are wrapped in Left Shift
//! - Everything else goes through the Ctrl+Shift+U hex input fallback
//!
//! Events are queued rather than sent. The owner drains them with
//! [`VirtualKeyboard::take_pending_events`] and forwards them to whatever
//! transport it has.
//!
//! # Unicode Fallback
//!
//! 1. Press Ctrl+Shift+U
//! 2. Type the hex codepoint (e.g. "3C0" for pi)
//! 3. Press Space to commit
//!
//! # Example
//!
//! ```rust,ignore
//! use fastboard::input::{HostTextSurface, VirtualKeyboard};
//!
//! let mut vk = VirtualKeyboard::new();
//! vk.initialize()?;
//! vk.commit_text("Hi π");
//! for event in vk.take_pending_events() {
//!     // forward to the compositor
//! }
//! ```

use crate::input::surface::{CursorDirection, EditorAction, HostTextSurface};
use std::fmt;
use xkbcommon::xkb;
use xkbcommon::xkb::keysyms::KEY_NoSymbol;
use xkbcommon::xkb::Keysym;

/// Offset between XKB keycodes and evdev keycodes.
const EVDEV_OFFSET: u32 = 8;

/// Errors raised while preparing the XKB keymap.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VirtualKeyboardError {
    /// No keymap could be compiled from the environment.
    KeymapUnavailable {
        /// Layout name the keymap was requested for, empty for the default.
        layout: String,
    },
}

impl fmt::Display for VirtualKeyboardError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VirtualKeyboardError::KeymapUnavailable { layout } => {
                let layout = if layout.is_empty() { "system default" } else { layout };
                write!(f, "Failed to compile an XKB keymap for layout '{}'", layout)?;
                write!(f, "\n  Suggestion: Install xkeyboard-config or set XKB_DEFAULT_LAYOUT")
            }
        }
    }
}

impl std::error::Error for VirtualKeyboardError {}

/// Key event state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyState {
    /// Key was pressed down.
    Pressed,
    /// Key was released.
    Released,
}

/// A queued hardware key event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyEvent {
    /// The evdev keycode.
    pub keycode: u32,
    /// Whether the key was pressed or released.
    pub state: KeyState,
    /// Timestamp in milliseconds.
    pub time: u32,
}

impl KeyEvent {
    /// Creates a new key press event.
    #[must_use]
    pub fn press(keycode: u32, time: u32) -> Self {
        Self {
            keycode,
            state: KeyState::Pressed,
            time,
        }
    }

    /// Creates a new key release event.
    #[must_use]
    pub fn release(keycode: u32, time: u32) -> Self {
        Self {
            keycode,
            state: KeyState::Released,
            time,
        }
    }
}

/// Where a character lives in the keymap.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyPosition {
    /// The evdev keycode.
    pub keycode: u32,
    /// Shift level within the first layout that produces the character.
    pub level: u32,
}

/// Host text surface that emits XKB key events.
///
/// # Lifecycle
///
/// 1. **Creation**: `VirtualKeyboard::new()` creates an uninitialized instance
/// 2. **Initialization**: `initialize()` compiles the system keymap
/// 3. **Usage**: the [`HostTextSurface`] methods queue key events
/// 4. **Cleanup**: `cleanup()` or drop releases the keymap
///
/// Before initialization every edit is ignored with a warning.
pub struct VirtualKeyboard {
    initialized: bool,

    /// Events not yet drained by the owner.
    pending_events: Vec<KeyEvent>,

    /// Action reported to the keyboard when Enter is pressed.
    requested_action: EditorAction,

    /// Actions performed instead of a newline, most recent last.
    performed_actions: Vec<EditorAction>,

    xkb_context: Option<xkb::Context>,
    xkb_keymap: Option<xkb::Keymap>,

    /// Tracks which keys are held so modifier state stays consistent.
    xkb_state: Option<xkb::State>,
}

impl fmt::Debug for VirtualKeyboard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VirtualKeyboard")
            .field("initialized", &self.initialized)
            .field("pending_events", &self.pending_events.len())
            .field("requested_action", &self.requested_action)
            .field("xkb_keymap", &self.xkb_keymap.is_some())
            .finish()
    }
}

impl Default for VirtualKeyboard {
    fn default() -> Self {
        Self::new()
    }
}

impl VirtualKeyboard {
    /// Creates an uninitialized instance that requests a newline on Enter.
    #[must_use]
    pub fn new() -> Self {
        Self {
            initialized: false,
            pending_events: Vec::new(),
            requested_action: EditorAction::None,
            performed_actions: Vec::new(),
            xkb_context: None,
            xkb_keymap: None,
            xkb_state: None,
        }
    }

    /// Compiles the default keymap from the environment (`XKB_DEFAULT_*`)
    /// or system defaults.
    ///
    /// Calling this twice is harmless.
    ///
    /// # Errors
    ///
    /// [`VirtualKeyboardError::KeymapUnavailable`] when xkbcommon cannot
    /// build a keymap, which is common in minimal containers.
    pub fn initialize(&mut self) -> Result<(), VirtualKeyboardError> {
        if self.initialized {
            return Ok(());
        }

        let context = xkb::Context::new(xkb::CONTEXT_NO_FLAGS);
        let keymap = xkb::Keymap::new_from_names(
            &context,
            "",
            "",
            "",
            "",
            None,
            xkb::KEYMAP_COMPILE_NO_FLAGS,
        )
        .ok_or_else(|| VirtualKeyboardError::KeymapUnavailable {
            layout: std::env::var("XKB_DEFAULT_LAYOUT").unwrap_or_default(),
        })?;
        let state = xkb::State::new(&keymap);

        self.xkb_context = Some(context);
        self.xkb_keymap = Some(keymap);
        self.xkb_state = Some(state);
        self.initialized = true;

        tracing::info!("Virtual keyboard initialized with system XKB keymap");
        Ok(())
    }

    #[must_use]
    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    /// Sets the action reported to the keyboard for Enter.
    pub fn set_requested_action(&mut self, action: EditorAction) {
        self.requested_action = action;
    }

    /// Editor actions performed so far.
    #[must_use]
    pub fn performed_actions(&self) -> &[EditorAction] {
        &self.performed_actions
    }

    /// Queues a key press.
    pub fn press_key(&mut self, keycode: u32) {
        self.queue(keycode, KeyState::Pressed);
    }

    /// Queues a key release.
    pub fn release_key(&mut self, keycode: u32) {
        self.queue(keycode, KeyState::Released);
    }

    /// Queues a press immediately followed by a release.
    pub fn tap_key(&mut self, keycode: u32) {
        self.press_key(keycode);
        self.release_key(keycode);
    }

    fn queue(&mut self, keycode: u32, state: KeyState) {
        if !self.initialized {
            tracing::warn!("Virtual keyboard not initialized, ignoring key {:?}", state);
            return;
        }

        let event = match state {
            KeyState::Pressed => KeyEvent::press(keycode, timestamp()),
            KeyState::Released => KeyEvent::release(keycode, timestamp()),
        };
        self.pending_events.push(event);

        if let Some(ref mut xkb_state) = self.xkb_state {
            let direction = match state {
                KeyState::Pressed => xkb::KeyDirection::Down,
                KeyState::Released => xkb::KeyDirection::Up,
            };
            xkb_state.update_key(xkb::Keycode::new(keycode + EVDEV_OFFSET), direction);
        }

        tracing::trace!("Queued {:?}: keycode={}", state, keycode);
    }

    /// Returns the pending key events and clears the queue.
    #[must_use]
    pub fn take_pending_events(&mut self) -> Vec<KeyEvent> {
        std::mem::take(&mut self.pending_events)
    }

    #[must_use]
    pub fn pending_events(&self) -> &[KeyEvent] {
        &self.pending_events
    }

    pub fn clear_pending_events(&mut self) {
        self.pending_events.clear();
    }

    /// Looks up an XKB keysym name (e.g. "BackSpace", "Shift_L").
    ///
    /// Falls back to a case-insensitive lookup before giving up.
    #[must_use]
    pub fn keysym_to_keycode(&self, keysym_name: &str) -> Option<u32> {
        let keymap = self.xkb_keymap.as_ref()?;
        let no_symbol: Keysym = KEY_NoSymbol.into();

        let mut keysym = xkb::keysym_from_name(keysym_name, xkb::KEYSYM_NO_FLAGS);
        if keysym == no_symbol {
            keysym = xkb::keysym_from_name(keysym_name, xkb::KEYSYM_CASE_INSENSITIVE);
        }
        if keysym == no_symbol {
            return None;
        }

        find_key(keymap, keysym).map(|pos| pos.keycode)
    }

    /// Finds the key and shift level that produce `c`.
    #[must_use]
    pub fn char_to_key(&self, c: char) -> Option<KeyPosition> {
        let keymap = self.xkb_keymap.as_ref()?;
        let keysym = char_keysym(c)?;
        find_key(keymap, keysym)
    }

    /// Types one character.
    ///
    /// Level 0 and level 1 characters are typed directly. Anything else,
    /// including characters missing from the keymap, uses the hex fallback.
    pub fn type_char(&mut self, c: char) {
        match self.char_to_key(c) {
            Some(KeyPosition { keycode, level: 0 }) => self.tap_key(keycode),
            Some(KeyPosition { keycode, level: 1 }) => {
                self.press_key(keycodes::KEY_LEFTSHIFT);
                self.tap_key(keycode);
                self.release_key(keycodes::KEY_LEFTSHIFT);
            }
            _ => self.emit_unicode_codepoint(c as u32),
        }
    }

    /// Emits a codepoint with the Ctrl+Shift+U hex input sequence.
    pub fn emit_unicode_codepoint(&mut self, codepoint: u32) {
        if !self.initialized {
            tracing::warn!(
                "Virtual keyboard not initialized, ignoring Unicode codepoint U+{:04X}",
                codepoint
            );
            return;
        }

        tracing::debug!("Using Ctrl+Shift+U fallback for U+{:04X}", codepoint);

        self.press_key(keycodes::KEY_LEFTCTRL);
        self.press_key(keycodes::KEY_LEFTSHIFT);
        self.tap_key(keycodes::KEY_U);

        for digit in format!("{:X}", codepoint).chars() {
            if let Some(keycode) = hex_digit_keycode(digit) {
                self.tap_key(keycode);
            }
        }

        self.tap_key(keycodes::KEY_SPACE);
        self.release_key(keycodes::KEY_LEFTSHIFT);
        self.release_key(keycodes::KEY_LEFTCTRL);
    }

    /// Clears pending events and releases XKB resources.
    pub fn cleanup(&mut self) {
        self.pending_events.clear();
        self.xkb_state = None;
        self.xkb_keymap = None;
        self.xkb_context = None;
        self.initialized = false;

        tracing::info!("Virtual keyboard cleaned up");
    }
}

impl HostTextSurface for VirtualKeyboard {
    fn commit_text(&mut self, text: &str) {
        for c in text.chars() {
            match c {
                '\n' => self.tap_key(keycodes::KEY_ENTER),
                '\t' => self.tap_key(keycodes::KEY_TAB),
                c => self.type_char(c),
            }
        }
    }

    fn delete_backward(&mut self, count: usize) -> usize {
        if !self.initialized {
            tracing::warn!("Virtual keyboard not initialized, ignoring delete");
            return 0;
        }
        for _ in 0..count {
            self.tap_key(keycodes::KEY_BACKSPACE);
        }
        count
    }

    fn requested_editor_action(&self) -> EditorAction {
        self.requested_action
    }

    fn perform_editor_action(&mut self, action: EditorAction) {
        // Key events carry no IME action, Return stands in for all of them.
        self.tap_key(keycodes::KEY_ENTER);
        self.performed_actions.push(action);
    }

    fn move_cursor(&mut self, direction: CursorDirection) -> bool {
        if !self.initialized {
            return false;
        }
        match direction {
            CursorDirection::Left => self.tap_key(keycodes::KEY_LEFT),
            CursorDirection::Right => self.tap_key(keycodes::KEY_RIGHT),
        }
        true
    }

    /// Select-all followed by Backspace.
    fn clear_all(&mut self) {
        if !self.initialized {
            return;
        }
        self.press_key(keycodes::KEY_LEFTCTRL);
        self.tap_key(keycodes::KEY_A);
        self.release_key(keycodes::KEY_LEFTCTRL);
        self.tap_key(keycodes::KEY_BACKSPACE);
    }
}

impl Drop for VirtualKeyboard {
    fn drop(&mut self) {
        if self.initialized {
            self.cleanup();
        }
    }
}

/// Keysym for a character: Latin-1 maps directly, the rest uses the
/// Unicode keysym range.
fn char_keysym(c: char) -> Option<Keysym> {
    let code = c as u32;
    let raw = match code {
        0x20..=0x7E | 0xA0..=0xFF => code,
        0x00..=0x1F | 0x7F..=0x9F => return None,
        _ => 0x0100_0000 | code,
    };
    Some(raw.into())
}

/// Scans the first layout of every key for `target`, lowest level first.
fn find_key(keymap: &xkb::Keymap, target: Keysym) -> Option<KeyPosition> {
    let min = keymap.min_keycode().raw();
    let max = keymap.max_keycode().raw();

    let mut best: Option<KeyPosition> = None;
    for raw in min..=max {
        if raw < EVDEV_OFFSET {
            continue;
        }
        let keycode = xkb::Keycode::new(raw);
        if keymap.num_layouts_for_key(keycode) == 0 {
            continue;
        }
        for level in 0..keymap.num_levels_for_key(keycode, 0) {
            if keymap.key_get_syms_by_level(keycode, 0, level).contains(&target) {
                let candidate = KeyPosition {
                    keycode: raw - EVDEV_OFFSET,
                    level,
                };
                if level == 0 {
                    return Some(candidate);
                }
                if best.is_none_or(|b| level < b.level) {
                    best = Some(candidate);
                }
            }
        }
    }
    best
}

fn hex_digit_keycode(digit: char) -> Option<u32> {
    let keycode = match digit.to_ascii_uppercase() {
        '0' => 11,
        '1'..='9' => digit as u32 - '1' as u32 + 2,
        'A' => 30,
        'B' => 48,
        'C' => 46,
        'D' => 32,
        'E' => 18,
        'F' => 33,
        _ => return None,
    };
    Some(keycode)
}

/// Milliseconds since the epoch, wrapped to `u32`.
fn timestamp() -> u32 {
    use std::time::{SystemTime, UNIX_EPOCH};

    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| (d.as_millis() % u128::from(u32::MAX)) as u32)
        .unwrap_or(0)
}

// ============================================================================
// Common Keycodes (evdev)
// ============================================================================

/// Evdev keycodes the surface emits directly.
pub mod keycodes {
    pub const KEY_BACKSPACE: u32 = 14;
    pub const KEY_TAB: u32 = 15;
    pub const KEY_U: u32 = 22;
    pub const KEY_ENTER: u32 = 28;
    pub const KEY_LEFTCTRL: u32 = 29;
    pub const KEY_A: u32 = 30;
    pub const KEY_LEFTSHIFT: u32 = 42;
    pub const KEY_SPACE: u32 = 57;
    pub const KEY_LEFT: u32 = 105;
    pub const KEY_RIGHT: u32 = 106;
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn keyboard() -> Option<VirtualKeyboard> {
        let mut vk = VirtualKeyboard::new();
        match vk.initialize() {
            Ok(()) => Some(vk),
            Err(e) => {
                eprintln!("Skipping test: {}", e);
                None
            }
        }
    }

    /// Test 1: Uninitialized keyboards ignore every edit
    #[test]
    fn test_uninitialized_ignores_edits() {
        let mut vk = VirtualKeyboard::new();
        assert!(!vk.is_initialized());
        vk.commit_text("abc");
        assert_eq!(vk.delete_backward(3), 0);
        assert!(!vk.move_cursor(CursorDirection::Left));
        vk.clear_all();
        assert!(vk.pending_events().is_empty());
    }

    /// Test 2: Lowercase letters are a single tap
    #[test]
    fn test_lowercase_tap() {
        let Some(mut vk) = keyboard() else { return };
        let Some(pos) = vk.char_to_key('a') else { return };
        assert_eq!(pos.level, 0);

        vk.commit_text("a");
        let events = vk.take_pending_events();
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].keycode, pos.keycode);
        assert_eq!(events[0].state, KeyState::Pressed);
        assert_eq!(events[1].state, KeyState::Released);
    }

    /// Test 3: Uppercase letters are wrapped in Shift
    #[test]
    fn test_uppercase_wraps_shift() {
        let Some(mut vk) = keyboard() else { return };
        if vk.char_to_key('A').map(|p| p.level) != Some(1) {
            return;
        }

        vk.commit_text("A");
        let events = vk.take_pending_events();
        assert_eq!(events.len(), 4);
        assert_eq!(events[0], KeyEvent::press(keycodes::KEY_LEFTSHIFT, events[0].time));
        assert_eq!(events[3].keycode, keycodes::KEY_LEFTSHIFT);
        assert_eq!(events[3].state, KeyState::Released);
    }

    /// Test 4: Characters outside the keymap use the hex fallback
    #[test]
    fn test_unicode_fallback() {
        let Some(mut vk) = keyboard() else { return };
        if vk.char_to_key('π').is_some() {
            return;
        }

        vk.commit_text("π");
        let events = vk.take_pending_events();
        // Ctrl, Shift, U tap, 3 hex taps, Space tap, Shift, Ctrl
        assert_eq!(events.len(), 2 + 2 + 6 + 2 + 2);
        assert_eq!(events[0].keycode, keycodes::KEY_LEFTCTRL);
        assert_eq!(events[1].keycode, keycodes::KEY_LEFTSHIFT);
        let last = events.len() - 1;
        assert_eq!(events[last].keycode, keycodes::KEY_LEFTCTRL);
        assert_eq!(events[last].state, KeyState::Released);
    }

    /// Test 5: Backspace taps once per character and reports the count
    #[test]
    fn test_delete_backward() {
        let Some(mut vk) = keyboard() else { return };
        assert_eq!(vk.delete_backward(3), 3);
        let events = vk.take_pending_events();
        assert_eq!(events.len(), 6);
        assert!(events.iter().all(|e| e.keycode == keycodes::KEY_BACKSPACE));
    }

    /// Test 6: Editor actions press Return and are recorded
    #[test]
    fn test_editor_action() {
        let Some(mut vk) = keyboard() else { return };
        vk.set_requested_action(EditorAction::Send);
        assert_eq!(vk.requested_editor_action(), EditorAction::Send);

        vk.perform_editor_action(EditorAction::Send);
        assert_eq!(vk.performed_actions(), &[EditorAction::Send]);
        let events = vk.take_pending_events();
        assert_eq!(events[0].keycode, keycodes::KEY_ENTER);
    }

    /// Test 7: Cursor moves tap the arrow keys
    #[test]
    fn test_move_cursor() {
        let Some(mut vk) = keyboard() else { return };
        assert!(vk.move_cursor(CursorDirection::Left));
        assert!(vk.move_cursor(CursorDirection::Right));
        let codes: Vec<u32> = vk.take_pending_events().iter().map(|e| e.keycode).collect();
        assert_eq!(
            codes,
            vec![keycodes::KEY_LEFT, keycodes::KEY_LEFT, keycodes::KEY_RIGHT, keycodes::KEY_RIGHT]
        );
    }

    /// Test 8: Clearing selects everything and deletes it
    #[test]
    fn test_clear_all() {
        let Some(mut vk) = keyboard() else { return };
        vk.clear_all();
        let events = vk.take_pending_events();
        let codes: Vec<u32> = events.iter().map(|e| e.keycode).collect();
        assert_eq!(
            codes,
            vec![
                keycodes::KEY_LEFTCTRL,
                keycodes::KEY_A,
                keycodes::KEY_A,
                keycodes::KEY_LEFTCTRL,
                keycodes::KEY_BACKSPACE,
                keycodes::KEY_BACKSPACE,
            ]
        );
        assert_eq!(events[3].state, KeyState::Released);
    }

    /// Test 9: Common keysyms resolve, bogus names do not
    #[test]
    fn test_keysym_lookup() {
        let Some(vk) = keyboard() else { return };
        assert!(vk.keysym_to_keycode("Return").is_some());
        assert!(vk.keysym_to_keycode("BackSpace").is_some());
        assert!(vk.keysym_to_keycode("InvalidKeysymThatDoesNotExist123").is_none());
    }

    #[test]
    fn test_cleanup() {
        let Some(mut vk) = keyboard() else { return };
        vk.press_key(keycodes::KEY_SPACE);
        vk.cleanup();
        assert!(!vk.is_initialized());
        assert!(vk.pending_events().is_empty());
    }

    #[test]
    fn test_hex_digit_keycodes() {
        assert_eq!(hex_digit_keycode('0'), Some(11));
        assert_eq!(hex_digit_keycode('1'), Some(2));
        assert_eq!(hex_digit_keycode('9'), Some(10));
        assert_eq!(hex_digit_keycode('c'), Some(46));
        assert_eq!(hex_digit_keycode('g'), None);
    }

    #[test]
    fn test_control_chars_have_no_keysym() {
        assert!(char_keysym('\u{7}').is_none());
        assert!(char_keysym('a').is_some());
    }
}
