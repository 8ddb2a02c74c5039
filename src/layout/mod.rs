// SPDX-License-Identifier: GPL-3.0-only

//! Keyboard layout tables.
//!
//! This module holds the static key-row tables for each [`LayoutMode`] and
//! the [`KeyId`] enumeration that names every key position.
//!
//! # Module Structure
//!
//! - `types`: [`LayoutMode`], [`KeyId`] and validation issue types
//! - `tables`: the three built-in tables (letters, numbers, symbols)
//! - `validation`: consistency checks over the tables
//!
//! # Example
//!
//! ```rust,ignore
//! use fastboard::layout::{self, LayoutMode};
//!
//! for row in layout::rows(LayoutMode::Numbers) {
//!     let tokens: Vec<String> = row.iter().map(|k| k.token()).collect();
//!     println!("{}", tokens.join(" "));
//! }
//! ```

pub mod tables;
pub mod types;
pub mod validation;

pub use tables::{contains, keys, rows, Row};
pub use types::{KeyId, LayoutMode, Severity, ValidationIssue};
pub use validation::{validate_table, validate_tables};
