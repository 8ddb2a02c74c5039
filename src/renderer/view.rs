// SPDX-License-Identifier: GPL-3.0-only

//! The keyboard view.
//!
//! [`KeyboardView`] turns the active layout table and [`ModeState`] into a
//! [`RenderedKeyboard`] that a toolkit can paint directly, and routes raw
//! touches into the [`KeyboardSession`]. It holds only presentation state:
//! the palette, the geometry settings, the pressed key and the key preview.
//! Mode state is always read fresh from the session.

use crate::app_settings::{DEFAULT_WIDTH, EMOJI_ROW_HEIGHT, HIT_SLOP};
use crate::config::{Color, Config};
use crate::input::classifier::{self, ColorClass, KeyRole};
use crate::input::committer::SideEffect;
use crate::input::ModeState;
use crate::layout::{self, KeyId};
use crate::renderer::message::{TouchEvent, TouchPhase};
use crate::renderer::sizing::{self, PlacedKey, Rect};
use crate::renderer::theme::Palette;
use crate::session::KeyboardSession;
use tokio::time::Instant;

/// What a touch point landed on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HitTarget {
    Key(KeyId),
    Emoji(String),
}

/// One key, ready to paint.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderedKey {
    pub key: KeyId,
    pub label: String,
    pub role: KeyRole,
    pub weight: f32,
    pub color_class: ColorClass,
    pub background: Color,
    pub text_color: Color,
    pub text_size: f32,
    pub rect: Rect,
    pub pressed: bool,
}

/// One cell of the quick-emoji strip.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderedEmoji {
    pub emoji: String,
    pub rect: Rect,
}

/// Enlarged label shown above a held character key.
#[derive(Debug, Clone, PartialEq)]
pub struct KeyPreview {
    pub text: String,
    pub rect: Rect,
}

/// A full frame of the keyboard.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderedKeyboard {
    pub state: ModeState,
    pub background: Color,
    pub width: f32,
    pub height: f32,
    pub corner_radius: f32,
    pub rows: Vec<Vec<RenderedKey>>,
    pub emoji_row: Vec<RenderedEmoji>,
    pub preview: Option<KeyPreview>,
}

impl RenderedKeyboard {
    /// Finds a rendered key by identifier.
    pub fn key(&self, key: KeyId) -> Option<&RenderedKey> {
        self.rows.iter().flatten().find(|k| k.key == key)
    }
}

/// Presentation state and touch routing for the keyboard.
#[derive(Debug, Clone)]
pub struct KeyboardView {
    width: f32,
    palette: Palette,
    keyboard_height: f32,
    key_radius: f32,
    key_gap: f32,
    key_text_size: f32,
    emojis: Vec<String>,
    show_emoji_row: bool,
    pressed: Option<KeyId>,
    preview: Option<KeyPreview>,
}

impl Default for KeyboardView {
    fn default() -> Self {
        Self::new(DEFAULT_WIDTH, &Config::default())
    }
}

impl KeyboardView {
    /// Creates a view of the given width using `config` for appearance.
    pub fn new(width: f32, config: &Config) -> Self {
        let mut view = Self {
            width,
            palette: Palette::default(),
            keyboard_height: 0.0,
            key_radius: 0.0,
            key_gap: 0.0,
            key_text_size: 0.0,
            emojis: Vec::new(),
            show_emoji_row: false,
            pressed: None,
            preview: None,
        };
        view.apply_settings(config);
        view
    }

    /// Re-reads appearance settings. Unparsable colours keep their
    /// previous value.
    pub fn apply_settings(&mut self, config: &Config) {
        self.palette = Palette::resolve(config, &self.palette);
        self.keyboard_height = config.keyboard_height.max(0.0);
        self.key_radius = config.key_radius.max(0.0);
        self.key_gap = config.key_gap.max(0.0);
        self.key_text_size = config.key_text_size.max(1.0);
        self.emojis = config.quick_emoji_list();
        self.show_emoji_row = config.show_emoji_row && !self.emojis.is_empty();
    }

    /// Changes the available width.
    pub fn resize(&mut self, width: f32) {
        self.width = width.max(0.0);
    }

    pub fn palette(&self) -> &Palette {
        &self.palette
    }

    pub fn pressed_key(&self) -> Option<KeyId> {
        self.pressed
    }

    /// Height of the emoji strip, zero when hidden.
    fn emoji_strip_height(&self) -> f32 {
        if self.show_emoji_row {
            EMOJI_ROW_HEIGHT
        } else {
            0.0
        }
    }

    /// Total height including the emoji strip.
    pub fn total_height(&self) -> f32 {
        self.keyboard_height + self.emoji_strip_height()
    }

    fn key_area(&self) -> Rect {
        Rect::new(0.0, self.emoji_strip_height(), self.width, self.keyboard_height)
    }

    fn emoji_cells(&self) -> Vec<Rect> {
        if !self.show_emoji_row {
            return Vec::new();
        }
        let strip = Rect::new(0.0, 0.0, self.width, EMOJI_ROW_HEIGHT);
        sizing::split_strip(strip, self.emojis.len())
    }

    /// Places the keys of the table active in `state`.
    pub fn placed_keys(&self, state: &ModeState) -> Vec<PlacedKey> {
        sizing::place_keys(layout::rows(state.layout), self.key_area(), self.key_gap)
    }

    /// Resolves a touch point to a key or emoji.
    pub fn hit(&self, state: &ModeState, x: f32, y: f32) -> Option<HitTarget> {
        if self.show_emoji_row && y < EMOJI_ROW_HEIGHT {
            return self
                .emoji_cells()
                .iter()
                .position(|cell| cell.contains(x, y))
                .and_then(|idx| self.emojis.get(idx).cloned())
                .map(HitTarget::Emoji);
        }

        let keys = self.placed_keys(state);
        sizing::hit_test(&keys, x, y, HIT_SLOP).map(|idx| HitTarget::Key(keys[idx].key))
    }

    /// Builds a frame for `state`.
    pub fn render(&self, state: &ModeState) -> RenderedKeyboard {
        let mut rows: Vec<Vec<RenderedKey>> = Vec::new();

        for placed in self.placed_keys(state) {
            let class = classifier::classify(placed.key);
            let color_class = classifier::color_class(placed.key, state);
            let pressed = self.pressed == Some(placed.key);
            let base = self.palette.color_for(color_class);

            let rendered = RenderedKey {
                key: placed.key,
                label: classifier::display_text(placed.key, state),
                role: class.role,
                weight: class.weight,
                color_class,
                background: if pressed { self.palette.pressed(base) } else { base },
                text_color: self.palette.text_for(color_class),
                text_size: classifier::text_size(placed.key, self.key_text_size),
                rect: placed.rect,
                pressed,
            };

            if rows.len() <= placed.row {
                rows.resize_with(placed.row + 1, Vec::new);
            }
            rows[placed.row].push(rendered);
        }

        let emoji_row = self
            .emoji_cells()
            .into_iter()
            .zip(self.emojis.iter())
            .map(|(rect, emoji)| RenderedEmoji {
                emoji: emoji.clone(),
                rect,
            })
            .collect();

        RenderedKeyboard {
            state: *state,
            background: self.palette.background,
            width: self.width,
            height: self.total_height(),
            corner_radius: self.key_radius,
            rows,
            emoji_row,
            preview: self.preview.clone(),
        }
    }

    /// Routes a touch into the session.
    ///
    /// - `Down` on a key presses it; on an emoji injects the emoji
    /// - `Move` onto a different key while held presses the new key
    /// - `Up` and `Cancel` release
    ///
    /// # Returns
    ///
    /// The side effect of any key press or injection the touch caused.
    pub fn handle_touch(
        &mut self,
        event: TouchEvent,
        session: &mut KeyboardSession,
        now: Instant,
    ) -> Option<SideEffect> {
        match event.phase {
            TouchPhase::Down => {
                let state = session.state();
                match self.hit(&state, event.x, event.y)? {
                    HitTarget::Key(key) => {
                        self.press(key, &state);
                        Some(session.key_down(key, now).effect)
                    }
                    HitTarget::Emoji(emoji) => Some(session.inject_text(&emoji)),
                }
            }
            TouchPhase::Move => {
                if self.pressed.is_none() {
                    return None;
                }
                let state = session.state();
                let Some(HitTarget::Key(key)) = self.hit(&state, event.x, event.y) else {
                    return None;
                };
                if self.pressed == Some(key) {
                    return None;
                }
                self.press(key, &state);
                session.key_move(key, now).map(|outcome| outcome.effect)
            }
            TouchPhase::Up | TouchPhase::Cancel => {
                self.pressed = None;
                self.preview = None;
                session.key_up();
                None
            }
        }
    }

    fn press(&mut self, key: KeyId, state: &ModeState) {
        self.pressed = Some(key);
        self.preview = match key {
            KeyId::Char(_) => self
                .placed_keys(state)
                .into_iter()
                .find(|p| p.key == key)
                .map(|p| KeyPreview {
                    text: classifier::display_text(key, state),
                    rect: Rect::new(
                        p.rect.x,
                        p.rect.y - p.rect.height,
                        p.rect.width,
                        p.rect.height,
                    ),
                }),
            _ => None,
        };
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::{FieldClass, HostTextSurface, TextBuffer};
    use crate::layout::LayoutMode;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn setup(config: &Config) -> (KeyboardView, KeyboardSession, Rc<RefCell<TextBuffer>>) {
        let buffer = Rc::new(RefCell::new(TextBuffer::new()));
        let mut session = KeyboardSession::new(config.clone(), Default::default());
        session.attach_surface(Box::new(Rc::clone(&buffer)));
        session.start_session(FieldClass::Text);
        (KeyboardView::new(406.0, config), session, buffer)
    }

    fn center_of(view: &KeyboardView, session: &KeyboardSession, key: KeyId) -> (f32, f32) {
        view.placed_keys(&session.state())
            .into_iter()
            .find(|p| p.key == key)
            .map(|p| p.rect.center())
            .expect("key is on the active table")
    }

    /// Test 1: Rendering reflects mode state
    #[test]
    fn test_render_reflects_state() {
        let view = KeyboardView::default();
        let shifted = ModeState::new().toggle_shift();
        let frame = view.render(&shifted);

        assert_eq!(frame.rows.len(), 4);
        let a = frame.key(KeyId::Char('a')).expect("a on letters");
        assert_eq!(a.label, "A");
        let shift = frame.key(KeyId::Shift).expect("shift on letters");
        assert_eq!(shift.color_class, ColorClass::AccentDim);
        assert_eq!(shift.background.to_hex(), "#3b82f6");
        assert_eq!(frame.key(KeyId::Space).map(|k| k.weight), Some(5.0));
    }

    /// Test 2: Numbers table renders after a mode switch
    #[test]
    fn test_render_numbers() {
        let view = KeyboardView::default();
        let frame = view.render(&ModeState::new().switch_layout(LayoutMode::Numbers));
        assert!(frame.key(KeyId::Char('1')).is_some());
        assert!(frame.key(KeyId::ModeSymbols).is_some());
        assert!(frame.key(KeyId::Shift).is_none());
    }

    /// Test 3: Tapping keys commits text and shows a preview while held
    #[test]
    fn test_tap_commits() {
        let (mut view, mut session, buffer) = setup(&Config::default());
        let now = Instant::now();

        let (x, y) = center_of(&view, &session, KeyId::Char('h'));
        let effect = view.handle_touch(TouchEvent::down(x, y), &mut session, now);
        assert_eq!(effect, Some(SideEffect::Committed("h".into())));

        let frame = view.render(&session.state());
        assert_eq!(frame.preview.as_ref().map(|p| p.text.as_str()), Some("h"));
        assert!(frame.key(KeyId::Char('h')).map(|k| k.pressed).unwrap_or(false));

        view.handle_touch(TouchEvent::up(x, y), &mut session, now);
        assert!(view.render(&session.state()).preview.is_none());
        assert_eq!(buffer.borrow().text(), "h");
    }

    /// Test 4: Special keys get no preview
    #[test]
    fn test_no_preview_for_special_keys() {
        let (mut view, mut session, _buffer) = setup(&Config::default());
        let (x, y) = center_of(&view, &session, KeyId::Space);
        view.handle_touch(TouchEvent::down(x, y), &mut session, Instant::now());
        assert!(view.render(&session.state()).preview.is_none());
    }

    /// Test 5: Sliding from backspace onto a letter cancels the repeat
    #[test]
    fn test_slide_cancels_repeat() {
        let (mut view, mut session, buffer) = setup(&Config::default());
        buffer.borrow_mut().commit_text("abc");
        let now = Instant::now();

        let (bx, by) = center_of(&view, &session, KeyId::Backspace);
        view.handle_touch(TouchEvent::down(bx, by), &mut session, now);
        assert!(session.next_repeat().is_some());

        let (mx, my) = center_of(&view, &session, KeyId::Char('m'));
        let effect = view.handle_touch(TouchEvent::moved(mx, my), &mut session, now);
        assert_eq!(effect, Some(SideEffect::Committed("m".into())));
        assert!(session.next_repeat().is_none());
        assert_eq!(buffer.borrow().text(), "abm");

        assert_eq!(
            view.handle_touch(TouchEvent::moved(mx + 1.0, my), &mut session, now),
            None,
            "moving within a key does nothing"
        );
    }

    /// Test 6: Emoji strip injects its emoji
    #[test]
    fn test_emoji_strip() {
        let mut config = Config::default();
        config.show_emoji_row = true;
        config.quick_emojis = "👍,🔥".into();
        let (mut view, mut session, buffer) = setup(&config);

        assert_eq!(view.total_height(), 245.0 + EMOJI_ROW_HEIGHT);
        let frame = view.render(&session.state());
        assert_eq!(frame.emoji_row.len(), 2);

        let (x, y) = frame.emoji_row[1].rect.center();
        view.handle_touch(TouchEvent::down(x, y), &mut session, Instant::now());
        assert_eq!(buffer.borrow().text(), "🔥");
        assert!(!session.state().shift);
    }

    /// Test 7: Theme changes re-colour without touching mode state
    #[test]
    fn test_settings_recolor() {
        let (mut view, mut session, _buffer) = setup(&Config::default());
        let (x, y) = center_of(&view, &session, KeyId::ModeNumbers);
        view.handle_touch(TouchEvent::down(x, y), &mut session, Instant::now());
        view.handle_touch(TouchEvent::up(x, y), &mut session, Instant::now());
        let before = session.state();

        let mut config = Config::default();
        config.apply_theme("light").expect("light exists");
        config.color_key_enter = "bogus".into();
        view.apply_settings(&config);
        session.apply_settings(config);

        assert_eq!(session.state(), before);
        let frame = view.render(&session.state());
        assert_eq!(frame.background.to_hex(), "#f0f0f5");
        assert_eq!(
            frame.key(KeyId::Enter).map(|k| k.background.to_hex()),
            Some("#2563eb".to_string()),
            "bad enter colour keeps the previous one"
        );
    }
}
