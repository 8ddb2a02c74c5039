// SPDX-License-Identifier: GPL-3.0-only

//! Built-in key-row tables.
//!
//! Each table has four rows shaped like a conventional phone keyboard. The
//! last row is always `mode-switch , SPACE . ↵`.

use crate::layout::types::{KeyId, LayoutMode};
use KeyId::{Backspace, Char, Enter, ModeLetters, ModeNumbers, ModeSymbols, Shift, Space};

/// A row of keys, left to right.
pub type Row = &'static [KeyId];

static LETTERS: &[Row] = &[
    &[
        Char('q'), Char('w'), Char('e'), Char('r'), Char('t'),
        Char('y'), Char('u'), Char('i'), Char('o'), Char('p'),
    ],
    &[
        Char('a'), Char('s'), Char('d'), Char('f'), Char('g'),
        Char('h'), Char('j'), Char('k'), Char('l'),
    ],
    &[
        Shift, Char('z'), Char('x'), Char('c'), Char('v'),
        Char('b'), Char('n'), Char('m'), Backspace,
    ],
    &[ModeNumbers, Char(','), Space, Char('.'), Enter],
];

static NUMBERS: &[Row] = &[
    &[
        Char('1'), Char('2'), Char('3'), Char('4'), Char('5'),
        Char('6'), Char('7'), Char('8'), Char('9'), Char('0'),
    ],
    &[
        Char('@'), Char('#'), Char('$'), Char('%'), Char('&'),
        Char('-'), Char('+'), Char('('), Char(')'),
    ],
    &[
        ModeSymbols, Char('*'), Char('"'), Char('\''), Char(':'),
        Char(';'), Char('!'), Char('?'), Backspace,
    ],
    &[ModeLetters, Char(','), Space, Char('.'), Enter],
];

static SYMBOLS: &[Row] = &[
    &[
        Char('~'), Char('`'), Char('|'), Char('•'), Char('√'),
        Char('π'), Char('÷'), Char('×'), Char('¶'), Char('∆'),
    ],
    &[
        Char('£'), Char('€'), Char('¥'), Char('^'), Char('°'),
        Char('='), Char('{'), Char('}'), Char('\\'),
    ],
    &[
        ModeNumbers, Char('©'), Char('®'), Char('™'), Char('✓'),
        Char('['), Char(']'), Char('<'), Backspace,
    ],
    &[ModeLetters, Char(','), Space, Char('.'), Enter],
];

/// Returns the rows of the table for `mode`.
///
/// # Example
///
/// ```rust,ignore
/// use fastboard::layout::{rows, KeyId, LayoutMode};
///
/// let letters = rows(LayoutMode::Letters);
/// assert_eq!(letters[0][0], KeyId::Char('q'));
/// ```
pub fn rows(mode: LayoutMode) -> &'static [Row] {
    match mode {
        LayoutMode::Letters => LETTERS,
        LayoutMode::Numbers => NUMBERS,
        LayoutMode::Symbols => SYMBOLS,
    }
}

/// Iterates over every key of the table for `mode`, row by row.
pub fn keys(mode: LayoutMode) -> impl Iterator<Item = KeyId> {
    rows(mode).iter().flat_map(|row| row.iter().copied())
}

/// Returns `true` if `key` appears anywhere in the table for `mode`.
pub fn contains(mode: LayoutMode, key: KeyId) -> bool {
    keys(mode).any(|k| k == key)
}
