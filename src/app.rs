// SPDX-License-Identifier: GPL-3.0-only

//! Keyboard event loop.
//!
//! [`KeyboardApp`] owns the session and the view and is driven by
//! [`Message`]s arriving on a futures mpsc channel. Repeat firings come from
//! a single `sleep_until` on the next repeat deadline. Both are multiplexed
//! with a biased `tokio::select!`, so a release that is already queued always
//! wins over a repeat that became due at the same moment.

use crate::api::{ApiCommand, InjectionHandle};
use crate::app_settings::{DEFAULT_WIDTH, EFFECT_HISTORY_CAPACITY, MESSAGE_CHANNEL_CAPACITY};
use crate::config::Config;
use crate::haptics::Haptics;
use crate::input::{FieldClass, HostTextSurface, SideEffect};
use crate::layout::KeyId;
use crate::renderer::{KeyboardView, RenderedKeyboard, TouchEvent};
use crate::session::KeyboardSession;
use futures::channel::mpsc;
use futures::StreamExt;
use std::collections::VecDeque;
use tokio::time::Instant;

/// Messages the keyboard loop reacts to.
#[derive(Debug, Clone, PartialEq)]
pub enum Message {
    /// A touch on the keyboard surface.
    Touch(TouchEvent),
    /// A key pressed without going through hit testing.
    KeyDown(KeyId),
    /// The held key was released.
    KeyUp,
    /// A new field gained focus.
    SessionStarted(FieldClass),
    /// The focused field went away.
    SessionFinished,
    /// Settings were changed and saved.
    SettingsChanged(Config),
    /// The available width changed.
    Resize(f32),
    /// A side-channel command from a tool panel.
    Api(ApiCommand),
    /// Stop the loop.
    Shutdown,
}

/// The keyboard application model.
#[derive(Debug)]
pub struct KeyboardApp {
    session: KeyboardSession,
    view: KeyboardView,
    /// The most recent side effects, oldest first. Capped at
    /// [`EFFECT_HISTORY_CAPACITY`]; older entries are dropped.
    effects: VecDeque<SideEffect>,
}

impl Default for KeyboardApp {
    fn default() -> Self {
        Self::new(Config::default(), Haptics::default())
    }
}

impl KeyboardApp {
    /// Creates an app at the default width.
    pub fn new(config: Config, haptics: Haptics) -> Self {
        let view = KeyboardView::new(DEFAULT_WIDTH, &config);
        Self {
            session: KeyboardSession::new(config, haptics),
            view,
            effects: VecDeque::with_capacity(EFFECT_HISTORY_CAPACITY),
        }
    }

    /// Creates the message channel the loop reads from.
    pub fn channel() -> (mpsc::Sender<Message>, mpsc::Receiver<Message>) {
        mpsc::channel(MESSAGE_CHANNEL_CAPACITY)
    }

    /// Wraps a sender as a side-channel handle for tool panels.
    pub fn injection_handle(tx: &mpsc::Sender<Message>) -> InjectionHandle {
        InjectionHandle::new(tx.clone())
    }

    pub fn session(&self) -> &KeyboardSession {
        &self.session
    }

    pub fn view(&self) -> &KeyboardView {
        &self.view
    }

    /// Attaches the editable target.
    pub fn attach_surface(&mut self, surface: Box<dyn HostTextSurface>) {
        self.session.attach_surface(surface);
    }

    /// Builds a frame for the current state.
    pub fn render(&self) -> RenderedKeyboard {
        self.view.render(&self.session.state())
    }

    /// Drains the recent side effects, oldest first.
    pub fn take_effects(&mut self) -> Vec<SideEffect> {
        self.effects.drain(..).collect()
    }

    /// Handles one message.
    ///
    /// # Returns
    ///
    /// `false` once the loop should stop.
    pub fn update(&mut self, message: Message, now: Instant) -> bool {
        match message {
            Message::Touch(event) => {
                if let Some(effect) = self.view.handle_touch(event, &mut self.session, now) {
                    self.record(effect);
                }
            }
            Message::KeyDown(key) => {
                let outcome = self.session.key_down(key, now);
                self.record(outcome.effect);
            }
            Message::KeyUp => {
                self.session.key_up();
            }
            Message::SessionStarted(field) => {
                self.session.start_session(field);
            }
            Message::SessionFinished => {
                self.session.finish_session();
            }
            Message::SettingsChanged(config) => {
                self.view.apply_settings(&config);
                self.session.apply_settings(config);
            }
            Message::Resize(width) => {
                tracing::debug!("Keyboard resized to width {}", width);
                self.view.resize(width);
            }
            Message::Api(command) => {
                let effect = self.session.execute(&command);
                self.record(effect);
            }
            Message::Shutdown => {
                tracing::info!("Shutting down keyboard loop");
                self.session.finish_session();
                return false;
            }
        }
        true
    }

    /// Fires the pending repeat if it is due.
    fn fire_due_repeat(&mut self, now: Instant) {
        let Some((_, ticket)) = self.session.next_repeat() else {
            return;
        };
        if let Some(outcome) = self.session.fire_repeat(ticket, now) {
            self.record(outcome.effect);
        }
    }

    fn record(&mut self, effect: SideEffect) {
        tracing::debug!("Side effect: {:?}", effect);
        if self.effects.len() == EFFECT_HISTORY_CAPACITY {
            self.effects.pop_front();
        }
        self.effects.push_back(effect);
    }

    /// Runs until [`Message::Shutdown`] arrives or every sender is dropped.
    ///
    /// Returns the app so the caller can inspect the final state.
    pub async fn run(mut self, mut rx: mpsc::Receiver<Message>) -> Self {
        tracing::info!("Keyboard loop started");

        loop {
            let deadline = self.session.next_repeat().map(|(deadline, _)| deadline);
            let timer = async move {
                match deadline {
                    Some(deadline) => tokio::time::sleep_until(deadline).await,
                    None => std::future::pending::<()>().await,
                }
            };

            tokio::select! {
                biased;

                message = rx.next() => {
                    let Some(message) = message else {
                        tracing::info!("Message channel closed");
                        break;
                    };
                    if !self.update(message, Instant::now()) {
                        break;
                    }
                }
                () = timer => {
                    self.fire_due_repeat(Instant::now());
                }
            }
        }

        self
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::{EditorAction, TextBuffer};
    use crate::layout::LayoutMode;
    use futures::SinkExt;
    use std::cell::RefCell;
    use std::rc::Rc;
    use std::time::Duration;

    fn app_with_text(text: &str) -> (KeyboardApp, Rc<RefCell<TextBuffer>>) {
        let buffer = Rc::new(RefCell::new(TextBuffer::new()));
        buffer.borrow_mut().commit_text(text);
        let mut app = KeyboardApp::default();
        app.attach_surface(Box::new(Rc::clone(&buffer)));
        app.update(Message::SessionStarted(FieldClass::Text), Instant::now());
        (app, buffer)
    }

    /// Test 1: Holding Backspace past the long-press delay repeats
    #[tokio::test(start_paused = true)]
    async fn test_hold_backspace_repeats() {
        let (app, buffer) = app_with_text("abcdefghij");
        let (mut tx, rx) = KeyboardApp::channel();

        let driver = async move {
            tx.send(Message::KeyDown(KeyId::Backspace)).await.expect("send down");
            // Firings at 400, 450 and 500 ms
            tokio::time::sleep(Duration::from_millis(525)).await;
            tx.send(Message::KeyUp).await.expect("send up");
            tokio::time::sleep(Duration::from_millis(500)).await;
            tx.send(Message::Shutdown).await.expect("send shutdown");
        };

        let (app, ()) = tokio::join!(app.run(rx), driver);
        assert_eq!(buffer.borrow().text(), "abcdef");
        assert!(app.session().pressed_key().is_none());
    }

    /// Test 2: Releasing before the delay produces no repeats
    #[tokio::test(start_paused = true)]
    async fn test_short_press_does_not_repeat() {
        let (app, buffer) = app_with_text("abc");
        let (mut tx, rx) = KeyboardApp::channel();

        let driver = async move {
            tx.send(Message::KeyDown(KeyId::Backspace)).await.expect("send down");
            tokio::time::sleep(Duration::from_millis(200)).await;
            tx.send(Message::KeyUp).await.expect("send up");
            tokio::time::sleep(Duration::from_millis(1000)).await;
            tx.send(Message::Shutdown).await.expect("send shutdown");
        };

        let (mut app, ()) = tokio::join!(app.run(rx), driver);
        assert_eq!(buffer.borrow().text(), "ab");
        assert_eq!(app.take_effects(), vec![SideEffect::Deleted(1)]);
    }

    /// Test 3: Character keys never repeat
    #[tokio::test(start_paused = true)]
    async fn test_held_character_commits_once() {
        let (app, buffer) = app_with_text("");
        let (mut tx, rx) = KeyboardApp::channel();

        let driver = async move {
            tx.send(Message::KeyDown(KeyId::Char('x'))).await.expect("send down");
            tokio::time::sleep(Duration::from_millis(2000)).await;
            tx.send(Message::KeyUp).await.expect("send up");
        };

        // Dropping the sender ends the loop.
        let (_app, ()) = tokio::join!(app.run(rx), driver);
        assert_eq!(buffer.borrow().text(), "x");
    }

    /// Test 4: Side-channel commands reach the surface through the loop
    #[tokio::test]
    async fn test_api_commands_through_loop() {
        let buffer = Rc::new(RefCell::new(TextBuffer::with_action(EditorAction::Send)));
        let mut app = KeyboardApp::default();
        app.attach_surface(Box::new(Rc::clone(&buffer)));

        let (tx, rx) = KeyboardApp::channel();
        let mut handle = KeyboardApp::injection_handle(&tx);
        drop(tx);

        let driver = async move {
            handle.type_text("hi 👋").await.expect("type");
            handle.send(ApiCommand::Backspace { count: 1 }).await.expect("backspace");
            handle.send(ApiCommand::Enter).await.expect("enter");
        };

        let (_app, ()) = tokio::join!(app.run(rx), driver);
        assert_eq!(buffer.borrow().text(), "hi ");
        assert_eq!(buffer.borrow().performed_actions(), &[EditorAction::Send]);
    }

    /// Test 5: Session start picks the table from the field class
    #[test]
    fn test_session_messages() {
        let mut app = KeyboardApp::default();
        let now = Instant::now();

        assert!(app.update(Message::SessionStarted(FieldClass::Phone), now));
        assert_eq!(app.session().state().layout, LayoutMode::Numbers);

        assert!(app.update(Message::KeyDown(KeyId::ModeLetters), now));
        assert!(app.update(Message::SessionFinished, now));
        assert!(app.update(Message::SessionStarted(FieldClass::Text), now));
        assert_eq!(app.session().state().layout, LayoutMode::Letters);

        assert!(!app.update(Message::Shutdown, now));
    }

    /// Test 6: Settings changes reach both the view and the session
    #[test]
    fn test_settings_changed() {
        let mut app = KeyboardApp::default();
        let mut config = Config::default();
        config.keyboard_height = 300.0;
        config.show_emoji_row = false;
        config.long_press_delay = 600;

        app.update(Message::SettingsChanged(config), Instant::now());
        assert_eq!(app.view().total_height(), 300.0);
        assert_eq!(
            app.session().scheduler().timing().initial_delay,
            Duration::from_millis(600)
        );
    }

    /// Test 7: The effect history stays bounded on a long-lived loop
    #[test]
    fn test_effect_history_is_bounded() {
        let (mut app, buffer) = app_with_text("");
        let now = Instant::now();
        for _ in 0..EFFECT_HISTORY_CAPACITY * 4 {
            app.update(Message::KeyDown(KeyId::Char('a')), now);
            app.update(Message::KeyUp, now);
        }
        app.update(Message::KeyDown(KeyId::Backspace), now);

        let effects = app.take_effects();
        assert_eq!(effects.len(), EFFECT_HISTORY_CAPACITY);
        assert_eq!(effects.last(), Some(&SideEffect::Deleted(1)), "newest effect is kept");
        assert!(app.take_effects().is_empty());
        assert_eq!(buffer.borrow().text().len(), EFFECT_HISTORY_CAPACITY * 4 - 1);
    }

    #[test]
    fn test_resize_updates_frame_width() {
        let mut app = KeyboardApp::default();
        app.update(Message::Resize(720.0), Instant::now());
        assert_eq!(app.render().width, 720.0);
    }
}
