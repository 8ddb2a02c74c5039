// SPDX-License-Identifier: GPL-3.0-only

//! Consistency checks for layout tables.
//!
//! The built-in tables are static, so a malformed table is a programming
//! defect rather than a runtime condition. These checks collect every issue
//! at once so tests can report them together.

use crate::layout::tables::{self, Row};
use crate::layout::types::{KeyId, LayoutMode, Severity, ValidationIssue};
use std::collections::HashSet;

/// Expected number of rows per table.
const EXPECTED_ROWS: usize = 4;

/// Validates all built-in tables.
///
/// # Returns
///
/// Every issue found, in table order. An empty vector means the tables are
/// consistent.
pub fn validate_tables() -> Vec<ValidationIssue> {
    LayoutMode::ALL
        .iter()
        .flat_map(|&mode| validate_table(mode, tables::rows(mode)))
        .collect()
}

/// Validates a single table that is displayed in `mode`.
pub fn validate_table(mode: LayoutMode, rows: &[Row]) -> Vec<ValidationIssue> {
    let mut issues = Vec::new();

    if rows.len() != EXPECTED_ROWS {
        issues.push(
            ValidationIssue::new(
                Severity::Warning,
                format!("Table has {} rows, expected {}", rows.len(), EXPECTED_ROWS),
                format!("{}.rows", mode),
            )
            .with_suggestion("Keep the four-row phone keyboard shape"),
        );
    }

    for (row_idx, row) in rows.iter().enumerate() {
        if row.is_empty() {
            issues.push(ValidationIssue::new(
                Severity::Error,
                "Row is empty",
                format!("{}.rows[{}]", mode, row_idx),
            ));
        }
    }

    validate_mode_keys(mode, rows, &mut issues);
    validate_required_keys(mode, rows, &mut issues);
    validate_bottom_row(mode, rows, &mut issues);
    validate_duplicates(mode, rows, &mut issues);

    issues
}

/// Checks that mode-switch keys lead somewhere else and that the table can be left.
fn validate_mode_keys(mode: LayoutMode, rows: &[Row], issues: &mut Vec<ValidationIssue>) {
    let mut has_exit = false;

    for (row_idx, row) in rows.iter().enumerate() {
        for (key_idx, key) in row.iter().enumerate() {
            let Some(target) = key.target_mode() else {
                continue;
            };
            let path = format!("{}.rows[{}].keys[{}]", mode, row_idx, key_idx);

            if target == mode {
                issues.push(
                    ValidationIssue::new(
                        Severity::Error,
                        format!("Mode key '{}' switches to the table it is on", key),
                        path,
                    )
                    .with_suggestion("Point the key at a different layout mode"),
                );
                continue;
            }
            has_exit = true;

            if *key == KeyId::ModeSymbols && mode != LayoutMode::Numbers {
                issues.push(ValidationIssue::new(
                    Severity::Warning,
                    "Symbols key outside the numbers table",
                    path,
                ));
            }
        }
    }

    if !has_exit {
        issues.push(
            ValidationIssue::new(
                Severity::Error,
                "Table has no mode-switch key leading out of it",
                format!("{}.rows", mode),
            )
            .with_suggestion("Add a mode-switch key to the bottom row"),
        );
    }
}

/// Checks that Backspace, Enter and Space are reachable from every table.
fn validate_required_keys(mode: LayoutMode, rows: &[Row], issues: &mut Vec<ValidationIssue>) {
    for required in [KeyId::Backspace, KeyId::Enter, KeyId::Space] {
        let present = rows.iter().any(|row| row.contains(&required));
        if !present {
            issues.push(ValidationIssue::new(
                Severity::Error,
                format!("Missing required key '{}'", required),
                format!("{}.rows", mode),
            ));
        }
    }
}

fn validate_bottom_row(mode: LayoutMode, rows: &[Row], issues: &mut Vec<ValidationIssue>) {
    let Some(bottom) = rows.last() else {
        return;
    };

    let shaped = bottom.len() == 5
        && bottom[0].target_mode().is_some()
        && bottom[1..] == [KeyId::Char(','), KeyId::Space, KeyId::Char('.'), KeyId::Enter];

    if !shaped {
        issues.push(
            ValidationIssue::new(
                Severity::Warning,
                "Bottom row is not 'mode , SPACE . ↵'",
                format!("{}.rows[{}]", mode, rows.len() - 1),
            )
            .with_suggestion("Keep the bottom row identical across tables"),
        );
    }
}

fn validate_duplicates(mode: LayoutMode, rows: &[Row], issues: &mut Vec<ValidationIssue>) {
    let mut seen = HashSet::new();
    for (row_idx, row) in rows.iter().enumerate() {
        for (key_idx, key) in row.iter().enumerate() {
            if !seen.insert(*key) {
                issues.push(ValidationIssue::new(
                    Severity::Warning,
                    format!("Duplicate key '{}'", key),
                    format!("{}.rows[{}].keys[{}]", mode, row_idx, key_idx),
                ));
            }
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
