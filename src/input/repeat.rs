// SPDX-License-Identifier: GPL-3.0-only

//! Long-press key repeat.
//!
//! The scheduler owns no timer. It records when the next repeat is due and
//! hands out a [`RepeatTicket`] for it; the event loop sleeps until the
//! deadline and then calls [`RepeatScheduler::fire`] with the ticket. A
//! ticket only fires while the session it was issued for is still live, so
//! a wake-up that races with a release or a newer press does nothing.
//!
//! # Timing
//!
//! ```text
//! press      first repeat        second repeat
//!   |<-- initial_delay -->|<-- interval -->|<-- interval --> ...
//! ```

use crate::app_settings::{
    LONG_PRESS_DELAY_MS, MIN_LONG_PRESS_DELAY_MS, MIN_REPEAT_INTERVAL_MS, REPEAT_INTERVAL_MS,
};
use crate::layout::KeyId;
use std::collections::HashSet;
use std::time::Duration;
use tokio::time::Instant;

/// Delay before the first repeat and cadence of the following ones.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RepeatTiming {
    /// Hold time before the first repeat fires.
    pub initial_delay: Duration,
    /// Time between subsequent repeats.
    pub interval: Duration,
}

impl RepeatTiming {
    /// Creates a timing from milliseconds, clamped to sane bounds.
    ///
    /// The delay is at least 50 ms, the interval at least 10 ms, and the
    /// interval is kept strictly shorter than the delay.
    pub fn from_millis(initial_delay_ms: u64, interval_ms: u64) -> Self {
        let delay = initial_delay_ms.max(MIN_LONG_PRESS_DELAY_MS);
        let mut interval = interval_ms.max(MIN_REPEAT_INTERVAL_MS);
        if interval >= delay {
            tracing::warn!(
                "Repeat interval {}ms is not shorter than delay {}ms, clamping",
                interval,
                delay
            );
            interval = (delay / 2).max(MIN_REPEAT_INTERVAL_MS).min(delay - 1);
        }
        Self {
            initial_delay: Duration::from_millis(delay),
            interval: Duration::from_millis(interval),
        }
    }
}

impl Default for RepeatTiming {
    fn default() -> Self {
        Self::from_millis(LONG_PRESS_DELAY_MS, REPEAT_INTERVAL_MS)
    }
}

/// Identifies one scheduled firing of one repeat session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RepeatTicket {
    generation: u64,
}

/// The press currently being repeated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepeatSession {
    /// Key being held.
    pub key: KeyId,
    /// Liveness flag checked on every firing.
    pub active: bool,
    /// When the next repeat is due.
    pub deadline: Instant,
    /// Repeats fired so far.
    pub fired: u32,
    generation: u64,
}

/// Tracks at most one repeating key press.
#[derive(Debug, Clone)]
pub struct RepeatScheduler {
    timing: RepeatTiming,
    repeatable: HashSet<KeyId>,
    session: Option<RepeatSession>,
    next_generation: u64,
}

impl Default for RepeatScheduler {
    fn default() -> Self {
        Self::new(RepeatTiming::default())
    }
}

impl RepeatScheduler {
    /// Creates a scheduler where only Backspace repeats.
    pub fn new(timing: RepeatTiming) -> Self {
        Self::with_repeatable(timing, [KeyId::Backspace])
    }

    /// Creates a scheduler with a custom set of repeatable keys.
    pub fn with_repeatable(timing: RepeatTiming, keys: impl IntoIterator<Item = KeyId>) -> Self {
        Self {
            timing,
            repeatable: keys.into_iter().collect(),
            session: None,
            next_generation: 0,
        }
    }

    pub fn timing(&self) -> RepeatTiming {
        self.timing
    }

    /// Replaces the timing. A running session keeps its current deadline
    /// and picks up the new interval on its next firing.
    pub fn set_timing(&mut self, timing: RepeatTiming) {
        self.timing = timing;
    }

    /// Returns `true` if holding `key` repeats it.
    pub fn is_repeatable(&self, key: KeyId) -> bool {
        self.repeatable.contains(&key)
    }

    /// The current session, live or not.
    pub fn session(&self) -> Option<&RepeatSession> {
        self.session.as_ref()
    }

    /// The key currently being repeated, if the session is live.
    pub fn active_key(&self) -> Option<KeyId> {
        self.session.as_ref().filter(|s| s.active).map(|s| s.key)
    }

    /// Starts a session for a key pressed at `now`.
    ///
    /// Any previous session is cancelled first, whether or not `key`
    /// repeats.
    ///
    /// # Returns
    ///
    /// A ticket for the first firing, or `None` if `key` does not repeat.
    pub fn start(&mut self, key: KeyId, now: Instant) -> Option<RepeatTicket> {
        self.cancel();

        if !self.is_repeatable(key) {
            return None;
        }

        self.next_generation += 1;
        let generation = self.next_generation;
        self.session = Some(RepeatSession {
            key,
            active: true,
            deadline: now + self.timing.initial_delay,
            fired: 0,
            generation,
        });
        tracing::debug!("Repeat started for {} (generation {})", key, generation);
        Some(RepeatTicket { generation })
    }

    /// Marks the current session inactive. Outstanding tickets stop firing.
    pub fn cancel(&mut self) {
        if let Some(session) = self.session.as_mut() {
            if session.active {
                tracing::debug!(
                    "Repeat cancelled for {} after {} firing(s)",
                    session.key,
                    session.fired
                );
            }
            session.active = false;
        }
    }

    /// Deadline and ticket of the next firing, if a session is live.
    pub fn next_deadline(&self) -> Option<(Instant, RepeatTicket)> {
        self.session.as_ref().filter(|s| s.active).map(|s| {
            (
                s.deadline,
                RepeatTicket {
                    generation: s.generation,
                },
            )
        })
    }

    /// Fires `ticket` at `now`.
    ///
    /// The firing is ignored if the session was cancelled or superseded, or
    /// if its deadline has not been reached yet. On success the next firing
    /// is scheduled one interval after `now`.
    ///
    /// # Returns
    ///
    /// The key to commit again, or `None` if the ticket is stale.
    pub fn fire(&mut self, ticket: RepeatTicket, now: Instant) -> Option<KeyId> {
        let interval = self.timing.interval;
        let session = self.session.as_mut()?;

        if !session.active || session.generation != ticket.generation {
            tracing::trace!("Ignoring stale repeat ticket {:?}", ticket);
            return None;
        }
        if now < session.deadline {
            return None;
        }

        session.fired += 1;
        session.deadline = now + interval;
        Some(session.key)
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn timing() -> RepeatTiming {
        RepeatTiming::from_millis(400, 50)
    }

    /// Test 1: Only repeatable keys start a session
    #[test]
    fn test_only_backspace_repeats_by_default() {
        let mut scheduler = RepeatScheduler::new(timing());
        let now = Instant::now();
        assert!(scheduler.start(KeyId::Char('a'), now).is_none());
        assert!(scheduler.next_deadline().is_none());
        assert!(scheduler.start(KeyId::Backspace, now).is_some());
        assert_eq!(scheduler.active_key(), Some(KeyId::Backspace));
    }

    /// Test 2: The first firing waits for the initial delay, later ones for the interval
    #[test]
    fn test_deadlines() {
        let mut scheduler = RepeatScheduler::new(timing());
        let t0 = Instant::now();
        let ticket = scheduler.start(KeyId::Backspace, t0).expect("backspace repeats");

        let (deadline, _) = scheduler.next_deadline().expect("live session");
        assert_eq!(deadline, t0 + Duration::from_millis(400));

        assert_eq!(
            scheduler.fire(ticket, t0 + Duration::from_millis(100)),
            None,
            "early firing is ignored"
        );

        let t1 = t0 + Duration::from_millis(400);
        assert_eq!(scheduler.fire(ticket, t1), Some(KeyId::Backspace));
        let (next, _) = scheduler.next_deadline().expect("still live");
        assert_eq!(next, t1 + Duration::from_millis(50));
    }

    /// Test 3: A ticket fired right after cancellation has no effect
    #[test]
    fn test_stale_ticket_after_cancel() {
        let mut scheduler = RepeatScheduler::new(timing());
        let t0 = Instant::now();
        let ticket = scheduler.start(KeyId::Backspace, t0).expect("backspace repeats");

        scheduler.cancel();

        let late = t0 + Duration::from_secs(5);
        assert_eq!(scheduler.fire(ticket, late), None, "cancelled session must not fire");
        assert!(scheduler.next_deadline().is_none());
        assert_eq!(scheduler.session().map(|s| s.fired), Some(0));
    }

    /// Test 4: A new press supersedes the previous session's tickets
    #[test]
    fn test_new_press_supersedes() {
        let mut scheduler = RepeatScheduler::new(timing());
        let t0 = Instant::now();
        let old = scheduler.start(KeyId::Backspace, t0).expect("first press");
        let new = scheduler.start(KeyId::Backspace, t0).expect("second press");
        assert_ne!(old, new);

        let late = t0 + Duration::from_secs(1);
        assert_eq!(scheduler.fire(old, late), None, "superseded ticket is stale");
        assert_eq!(scheduler.fire(new, late), Some(KeyId::Backspace));
    }

    /// Test 5: Pressing a non-repeatable key cancels a running repeat
    #[test]
    fn test_other_key_cancels() {
        let mut scheduler = RepeatScheduler::new(timing());
        let t0 = Instant::now();
        let ticket = scheduler.start(KeyId::Backspace, t0).expect("backspace repeats");
        assert!(scheduler.start(KeyId::Char('x'), t0).is_none());
        assert_eq!(scheduler.fire(ticket, t0 + Duration::from_secs(1)), None);
    }

    /// Test 6: The repeatable set can be extended
    #[test]
    fn test_custom_repeatable_set() {
        let mut scheduler =
            RepeatScheduler::with_repeatable(timing(), [KeyId::Backspace, KeyId::Space]);
        assert!(scheduler.is_repeatable(KeyId::Space));
        assert!(scheduler.start(KeyId::Space, Instant::now()).is_some());
    }

    #[test]
    fn test_timing_clamps() {
        let t = RepeatTiming::from_millis(0, 0);
        assert_eq!(t.initial_delay, Duration::from_millis(MIN_LONG_PRESS_DELAY_MS));
        assert!(t.interval < t.initial_delay);

        let t = RepeatTiming::from_millis(100, 500);
        assert!(t.interval < t.initial_delay, "interval must stay below the delay");

        let t = RepeatTiming::default();
        assert_eq!(t.initial_delay, Duration::from_millis(400));
        assert_eq!(t.interval, Duration::from_millis(50));
    }
}
