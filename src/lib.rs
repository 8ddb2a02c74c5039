// SPDX-License-Identifier: GPL-3.0-only

//! Fastboard - an on-screen touch keyboard core
//!
//! This crate holds everything a soft keyboard needs short of the windowing
//! toolkit: the key tables, the shift/caps/layout state machine, long-press
//! repeat, commit rules for the focused field, a toolkit-neutral render
//! model and a text-injection side channel for tool panels.
//!
//! # Architecture
//!
//! ```text
//!  touches ──► renderer::KeyboardView ──► session::KeyboardSession ──► HostTextSurface
//!                                              ▲        │
//!  tool panels ──► api::InjectionHandle ───────┘        └─► haptics
//! ```
//!
//! The `fastboard` binary drives [`app::KeyboardApp`] from a script so the
//! whole pipeline can be exercised without a display.
//!
//! # Modules
//!
//! - `api`: side-channel commands for tool panels (text, delete, cursor, vibrate)
//! - `app`: the message loop and repeat timer
//! - `app_settings`: centralized application constants
//! - `config`: persisted settings, colours and theme presets
//! - `haptics`: vibration feedback
//! - `input`: key classification, mode state, repeat and commit
//! - `layout`: static key tables and their validation
//! - `renderer`: geometry, palette and touch routing
//! - `script`: touch scripts for the `fastboard` binary
//! - `session`: the per-field keyboard session

pub mod api;
pub mod app;
pub mod app_settings;
pub mod config;
pub mod haptics;
pub mod input;
pub mod layout;
pub mod renderer;
pub mod script;
pub mod session;

// ============================================================================
// Integration Tests
// ============================================================================
