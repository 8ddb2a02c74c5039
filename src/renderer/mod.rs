// SPDX-License-Identifier: GPL-3.0-only

//! Keyboard renderer.
//!
//! Produces toolkit-neutral frames from the layout tables and the current
//! mode state, and maps touches back onto keys.
//!
//! # Architecture
//!
//! - **view**: [`KeyboardView`], the render model and touch router
//! - **sizing**: key geometry from layout weights and hit testing
//! - **theme**: [`Palette`] colour resolution with fallback
//! - **message**: touch event types
//!
//! # Usage
//!
//! ```rust,ignore
//! use fastboard::config::Config;
//! use fastboard::renderer::{KeyboardView, TouchEvent};
//! use fastboard::session::KeyboardSession;
//!
//! let config = Config::default();
//! let mut view = KeyboardView::new(400.0, &config);
//! let mut session = KeyboardSession::default();
//!
//! let frame = view.render(&session.state());
//! let (x, y) = frame.rows[0][0].rect.center();
//! view.handle_touch(TouchEvent::down(x, y), &mut session, tokio::time::Instant::now());
//! ```

pub mod message;
pub mod sizing;
pub mod theme;
pub mod view;

pub use message::{TouchEvent, TouchPhase};
pub use sizing::{hit_test, place_keys, PlacedKey, Rect};
pub use theme::Palette;
pub use view::{HitTarget, KeyPreview, KeyboardView, RenderedEmoji, RenderedKey, RenderedKeyboard};
