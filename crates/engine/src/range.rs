//! A1-style cell references and rectangular ranges.
//!
//! Coordinates here are 1-based, matching the row numbers a user sees in
//! Excel. The xlsx writer converts to 0-based at the boundary.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Last row addressable in an xlsx worksheet.
pub const MAX_ROW: u32 = 1_048_576;

/// Last column addressable in an xlsx worksheet (XFD).
pub const MAX_COL: u16 = 16_384;

/// A single cell position (1-based row and column).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CellRef {
    pub row: u32,
    pub col: u16,
}

impl CellRef {
    pub fn new(row: u32, col: u16) -> Self {
        Self { row, col }
    }

    /// Parse "B5" or "$B$5". Sheet-qualified references are rejected.
    pub fn parse(s: &str) -> Option<Self> {
        let s = s.trim();
        let mut letters = String::new();
        let mut digits = String::new();
        for ch in s.chars() {
            match ch {
                '$' => {}
                c if c.is_ascii_alphabetic() && digits.is_empty() => letters.push(c),
                c if c.is_ascii_digit() && !letters.is_empty() => digits.push(c),
                _ => return None,
            }
        }
        let col = col_from_letters(&letters)?;
        let row: u32 = digits.parse().ok()?;
        if row == 0 || row > MAX_ROW {
            return None;
        }
        Some(Self { row, col })
    }
}

impl fmt::Display for CellRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", col_to_letters(self.col), self.row)
    }
}

/// An inclusive rectangular range (1-based).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CellRange {
    pub first_row: u32,
    pub first_col: u16,
    pub last_row: u32,
    pub last_col: u16,
}

impl CellRange {
    /// Create a range; corners are normalized so first <= last.
    pub fn new(first_row: u32, first_col: u16, last_row: u32, last_col: u16) -> Self {
        Self {
            first_row: first_row.min(last_row),
            first_col: first_col.min(last_col),
            last_row: first_row.max(last_row),
            last_col: first_col.max(last_col),
        }
    }

    /// Parse one sqref token: "A1", "A1:B10", "$A$1:$B$10", "C:C" or "3:5".
    pub fn parse(s: &str) -> Option<Self> {
        let s = s.trim();
        match s.split_once(':') {
            None => {
                let cell = CellRef::parse(s)?;
                Some(Self::new(cell.row, cell.col, cell.row, cell.col))
            }
            Some((start, end)) => {
                if let (Some(a), Some(b)) = (CellRef::parse(start), CellRef::parse(end)) {
                    return Some(Self::new(a.row, a.col, b.row, b.col));
                }
                let start = start.replace('$', "");
                let end = end.replace('$', "");
                // Whole columns: "C:E"
                if let (Some(a), Some(b)) = (col_from_letters(&start), col_from_letters(&end)) {
                    return Some(Self::new(1, a, MAX_ROW, b));
                }
                // Whole rows: "3:5"
                let a: u32 = start.parse().ok()?;
                let b: u32 = end.parse().ok()?;
                if a == 0 || b == 0 {
                    return None;
                }
                Some(Self::new(a, 1, b, MAX_COL))
            }
        }
    }

    /// Parse a space-separated sqref list, skipping tokens that don't parse.
    pub fn parse_sqref(sqref: &str) -> Vec<Self> {
        sqref.split_whitespace().filter_map(Self::parse).collect()
    }

    pub fn row_count(&self) -> u32 {
        self.last_row - self.first_row + 1
    }

    pub fn contains_row(&self, row: u32) -> bool {
        row >= self.first_row && row <= self.last_row
    }

    /// Same columns, rows clipped to `[first, last]`. None if disjoint.
    pub fn clip_rows(&self, first: u32, last: u32) -> Option<Self> {
        let lo = self.first_row.max(first);
        let hi = self.last_row.min(last);
        if lo > hi {
            return None;
        }
        Some(Self { first_row: lo, last_row: hi, ..*self })
    }
}

impl fmt::Display for CellRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let start = CellRef::new(self.first_row, self.first_col);
        if self.first_row == self.last_row && self.first_col == self.last_col {
            write!(f, "{}", start)
        } else {
            write!(f, "{}:{}", start, CellRef::new(self.last_row, self.last_col))
        }
    }
}

/// Convert a 1-based column number to letters (1 = A, 27 = AA).
pub fn col_to_letters(col: u16) -> String {
    let mut out = Vec::new();
    let mut n = u32::from(col);
    while n > 0 {
        let rem = (n - 1) % 26;
        out.push(b'A' + rem as u8);
        n = (n - 1) / 26;
    }
    out.reverse();
    String::from_utf8(out).unwrap_or_default()
}

/// Convert column letters to a 1-based column number (A = 1, AA = 27).
pub fn col_from_letters(letters: &str) -> Option<u16> {
    if letters.is_empty() || letters.len() > 3 {
        return None;
    }
    let mut col: u32 = 0;
    for c in letters.chars() {
        if !c.is_ascii_alphabetic() {
            return None;
        }
        col = col * 26 + (c.to_ascii_uppercase() as u32 - 'A' as u32 + 1);
    }
    if col == 0 || col > u32::from(MAX_COL) {
        return None;
    }
    Some(col as u16)
}
