// SPDX-License-Identifier: GPL-3.0-only

//! Sizing calculations for the keyboard renderer.
//!
//! Rows share the key area height evenly. Within a row each key gets a share
//! of the row width proportional to its layout weight, then gives up
//! `key_gap` on every side as margin.
//!
//! ```text
//! +-- padding ------------------------------------------------+
//! | [q][w][e][r][t][y][u][i][o][p]                            |
//! |   [a][s][d][f][g][h][j][k][l]     <- second row inset     |
//! | [⇧ ][z][x][c][v][b][n][m][⌫ ]                             |
//! | [123][,][      space      ][.][↵ ]                        |
//! +-----------------------------------------------------------+
//! ```

use crate::app_settings::{HOME_ROW_INSET, PADDING_HORIZONTAL, PADDING_VERTICAL};
use crate::input::classifier;
use crate::layout::{KeyId, Row};

/// An axis-aligned rectangle in logical pixels.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Returns `true` if the point lies inside (edges inclusive).
    pub fn contains(&self, x: f32, y: f32) -> bool {
        x >= self.x && x <= self.x + self.width && y >= self.y && y <= self.y + self.height
    }

    pub fn center(&self) -> (f32, f32) {
        (self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    /// Distance from the point to the centre.
    pub fn center_distance(&self, x: f32, y: f32) -> f32 {
        let (cx, cy) = self.center();
        ((cx - x).powi(2) + (cy - y).powi(2)).sqrt()
    }

    /// Shrinks the rectangle by `margin` on every side, never below zero size.
    pub fn inset(&self, margin: f32) -> Self {
        let width = (self.width - 2.0 * margin).max(0.0);
        let height = (self.height - 2.0 * margin).max(0.0);
        Self::new(
            self.x + (self.width - width) / 2.0,
            self.y + (self.height - height) / 2.0,
            width,
            height,
        )
    }
}

/// A key with its on-screen rectangle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlacedKey {
    pub key: KeyId,
    pub row: usize,
    pub rect: Rect,
}

/// Places every key of `rows` inside `area`.
///
/// # Arguments
///
/// * `rows` - The active layout table
/// * `area` - The key area, including padding
/// * `gap` - Margin on every side of each key
///
/// # Returns
///
/// Keys in table order. An empty table or a zero-sized area yields keys
/// with zero-sized rectangles rather than an error.
pub fn place_keys(rows: &[Row], area: Rect, gap: f32) -> Vec<PlacedKey> {
    if rows.is_empty() {
        return Vec::new();
    }

    let content = Rect::new(
        area.x + PADDING_HORIZONTAL,
        area.y + PADDING_VERTICAL,
        (area.width - 2.0 * PADDING_HORIZONTAL).max(0.0),
        (area.height - 2.0 * PADDING_VERTICAL).max(0.0),
    );
    let row_height = content.height / rows.len() as f32;

    let mut placed = Vec::with_capacity(rows.iter().map(|r| r.len()).sum());
    for (row_idx, row) in rows.iter().enumerate() {
        let inset = if row_idx == 1 { HOME_ROW_INSET } else { 0.0 };
        let row_x = content.x + inset;
        let row_width = (content.width - 2.0 * inset).max(0.0);
        let row_y = content.y + row_height * row_idx as f32;

        let total_weight: f32 = row.iter().map(|k| classifier::classify(*k).weight).sum();
        if total_weight <= 0.0 {
            continue;
        }

        let mut x = row_x;
        for key in row.iter() {
            let width = row_width * classifier::classify(*key).weight / total_weight;
            placed.push(PlacedKey {
                key: *key,
                row: row_idx,
                rect: Rect::new(x, row_y, width, row_height).inset(gap),
            });
            x += width;
        }
    }
    placed
}

/// Splits a strip evenly into `count` cells.
pub fn split_strip(strip: Rect, count: usize) -> Vec<Rect> {
    if count == 0 {
        return Vec::new();
    }
    let width = strip.width / count as f32;
    (0..count)
        .map(|i| Rect::new(strip.x + width * i as f32, strip.y, width, strip.height))
        .collect()
}

/// Finds the key under a touch point.
///
/// A direct hit wins. Otherwise the key whose centre is nearest to the
/// point is chosen, as long as it lies within `slop`.
///
/// # Returns
///
/// The index into `keys`, or `None` if nothing is close enough.
pub fn hit_test(keys: &[PlacedKey], x: f32, y: f32, slop: f32) -> Option<usize> {
    if let Some(idx) = keys.iter().position(|k| k.rect.contains(x, y)) {
        return Some(idx);
    }

    keys.iter()
        .enumerate()
        .map(|(idx, k)| (idx, k.rect.center_distance(x, y)))
        .filter(|(_, distance)| *distance <= slop)
        .min_by(|a, b| a.1.total_cmp(&b.1))
        .map(|(idx, _)| idx)
}

// ============================================================================
// Tests
// ============================================================================
