// SPDX-License-Identifier: GPL-3.0-only

//! Touch input types consumed by the keyboard view.

/// Phase of a single-finger touch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TouchPhase {
    /// Finger went down.
    Down,
    /// Finger moved while down.
    Move,
    /// Finger lifted.
    Up,
    /// The system took the touch away (e.g. a gesture or window change).
    Cancel,
}

/// A touch event in keyboard-local logical pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TouchEvent {
    pub phase: TouchPhase,
    pub x: f32,
    pub y: f32,
}

impl TouchEvent {
    pub fn down(x: f32, y: f32) -> Self {
        Self {
            phase: TouchPhase::Down,
            x,
            y,
        }
    }

    pub fn moved(x: f32, y: f32) -> Self {
        Self {
            phase: TouchPhase::Move,
            x,
            y,
        }
    }

    pub fn up(x: f32, y: f32) -> Self {
        Self {
            phase: TouchPhase::Up,
            x,
            y,
        }
    }

    pub fn cancel() -> Self {
        Self {
            phase: TouchPhase::Cancel,
            x: 0.0,
            y: 0.0,
        }
    }
}
