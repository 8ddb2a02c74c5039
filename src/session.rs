// SPDX-License-Identifier: GPL-3.0-only

//! One keyboard session.
//!
//! [`KeyboardSession`] exclusively owns the [`ModeState`], the repeat
//! scheduler and the attached host surface. Everything runs on a single
//! event loop, so there is no locking; the session is driven by calls from
//! the view (touches), the host (session start, settings) and the loop's
//! timer (repeat firings).

use crate::api::ApiCommand;
use crate::config::Config;
use crate::haptics::Haptics;
use crate::input::committer::{self, CommitOutcome, SideEffect};
use crate::input::{
    CursorDirection, FieldClass, HostTextSurface, ModeState, RepeatScheduler, RepeatTicket,
};
use crate::layout::KeyId;
use std::time::Duration;
use tokio::time::Instant;

/// Key-input state for the focused field.
pub struct KeyboardSession {
    state: ModeState,
    scheduler: RepeatScheduler,
    surface: Option<Box<dyn HostTextSurface>>,
    haptics: Haptics,
    config: Config,
    pressed: Option<KeyId>,
}

impl std::fmt::Debug for KeyboardSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KeyboardSession")
            .field("state", &self.state)
            .field("pressed", &self.pressed)
            .field("surface_attached", &self.surface.is_some())
            .field("haptics", &self.haptics)
            .finish_non_exhaustive()
    }
}

impl Default for KeyboardSession {
    fn default() -> Self {
        Self::new(Config::default(), Haptics::default())
    }
}

impl KeyboardSession {
    /// Creates a session with no surface attached.
    pub fn new(config: Config, haptics: Haptics) -> Self {
        Self {
            state: ModeState::new(),
            scheduler: RepeatScheduler::new(config.repeat_timing()),
            surface: None,
            haptics,
            config,
            pressed: None,
        }
    }

    pub fn state(&self) -> ModeState {
        self.state
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// The key currently held down, if any.
    pub fn pressed_key(&self) -> Option<KeyId> {
        self.pressed
    }

    pub fn scheduler(&self) -> &RepeatScheduler {
        &self.scheduler
    }

    pub fn has_surface(&self) -> bool {
        self.surface.is_some()
    }

    // ========================================================================
    // Host events
    // ========================================================================

    /// Starts a session on a new field. Resets shift and caps and picks the
    /// table from the field class.
    pub fn start_session(&mut self, field: FieldClass) {
        self.release_all();
        self.state = ModeState::for_session(field);
        tracing::info!("Session started on {:?} field: {}", field, self.state);
    }

    /// Ends the current session. Any held key is released.
    pub fn finish_session(&mut self) {
        self.release_all();
        tracing::debug!("Session finished");
    }

    /// Attaches the editable target.
    pub fn attach_surface(&mut self, surface: Box<dyn HostTextSurface>) {
        self.surface = Some(surface);
    }

    /// Detaches and returns the editable target.
    pub fn detach_surface(&mut self) -> Option<Box<dyn HostTextSurface>> {
        self.surface.take()
    }

    /// Picks up new settings. Mode state is not touched.
    pub fn apply_settings(&mut self, config: Config) {
        self.scheduler.set_timing(config.repeat_timing());
        self.haptics.configure(&config);
        self.config = config;
        tracing::debug!("Settings applied");
    }

    // ========================================================================
    // Key events
    // ========================================================================

    /// Handles a press. The key is committed immediately; a repeat is
    /// scheduled afterwards if the key repeats.
    pub fn key_down(&mut self, key: KeyId, now: Instant) -> CommitOutcome {
        let outcome = self.commit_key(key);
        self.pressed = Some(key);
        self.scheduler.start(key, now);
        outcome
    }

    /// Handles a release. Cancels any pending repeat.
    pub fn key_up(&mut self) {
        self.release_all();
    }

    /// Handles a finger sliding onto `key` while held.
    ///
    /// Moving onto a different key cancels the running repeat and presses
    /// the new key. Moving within the same key does nothing.
    pub fn key_move(&mut self, key: KeyId, now: Instant) -> Option<CommitOutcome> {
        if self.pressed == Some(key) {
            return None;
        }
        self.scheduler.cancel();
        Some(self.key_down(key, now))
    }

    /// Deadline of the next repeat firing, if a repeat is live.
    pub fn next_repeat(&self) -> Option<(Instant, RepeatTicket)> {
        self.scheduler.next_deadline()
    }

    /// Fires a repeat ticket. Stale tickets are ignored.
    ///
    /// The key is committed against the current mode state, not the state
    /// at the time of the press.
    pub fn fire_repeat(&mut self, ticket: RepeatTicket, now: Instant) -> Option<CommitOutcome> {
        let key = self.scheduler.fire(ticket, now)?;
        tracing::trace!("Repeat firing for {}", key);
        Some(self.commit_key(key))
    }

    // ========================================================================
    // Side channel
    // ========================================================================

    /// Commits text verbatim without classification or mode changes.
    pub fn inject_text(&mut self, text: &str) -> SideEffect {
        committer::inject_text(text, self.surface.as_deref_mut())
    }

    /// Executes a command from the side channel.
    pub fn execute(&mut self, command: &ApiCommand) -> SideEffect {
        tracing::debug!("API: executing {}", command.name());
        match command {
            ApiCommand::TypeText(text) => self.inject_text(text),
            ApiCommand::Backspace { count } => {
                committer::delete_backward(*count, self.surface.as_deref_mut())
            }
            ApiCommand::Enter => match self.surface.as_deref_mut() {
                Some(surface) => committer::perform_enter(surface),
                None => SideEffect::NoSurface,
            },
            ApiCommand::CursorLeft => {
                committer::move_cursor(CursorDirection::Left, self.surface.as_deref_mut())
            }
            ApiCommand::CursorRight => {
                committer::move_cursor(CursorDirection::Right, self.surface.as_deref_mut())
            }
            ApiCommand::ClearAll => committer::clear_all(self.surface.as_deref_mut()),
            ApiCommand::Vibrate { ms } => {
                self.haptics.pulse_for(Duration::from_millis(*ms));
                SideEffect::Pulsed
            }
        }
    }

    fn commit_key(&mut self, key: KeyId) -> CommitOutcome {
        let outcome = committer::commit(key, self.state, self.surface.as_deref_mut());
        if outcome.state.layout != self.state.layout {
            tracing::info!("Layout mode: {} -> {}", self.state.layout, outcome.state.layout);
        }
        self.state = outcome.state;
        if outcome.effect.is_key_action() {
            self.haptics.key_pulse();
        }
        outcome
    }

    fn release_all(&mut self) {
        self.scheduler.cancel();
        self.pressed = None;
    }
}

// ============================================================================
// Tests
// ============================================================================
