//! Cell reference parsing and formatting.
//!
//! Provides bidirectional conversion between spreadsheet-style cell references
//! (e.g., "A1", "B2", "AA100") and zero-indexed row/column coordinates.
//!
//! # Examples
//!
//! ```
//! use gridcalc_engine::engine::CellRef;
//!
//! let cell = CellRef::decode("B3").unwrap();
//! assert_eq!(cell.row, 2); // 0-indexed
//! assert_eq!(cell.col, 1);
//! assert_eq!(cell.to_string(), "B3");
//! ```

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::OnceLock;

use super::error::CellError;

/// A reference to a cell by row and column indices (0-indexed).
///
/// Ordering is row-major: `(row, col)`.
#[derive(
    Clone, Copy, Debug, Hash, Eq, PartialEq, Ord, PartialOrd, Serialize, Deserialize,
)]
pub struct CellRef {
    pub row: usize,
    pub col: usize,
}

fn label_re() -> &'static Regex {
    static LABEL_RE: OnceLock<Regex> = OnceLock::new();
    LABEL_RE.get_or_init(|| {
        Regex::new(r"^(?<letters>[A-Z]+)(?<numbers>[0-9]+)$")
            .expect("cell label regex must compile")
    })
}

impl CellRef {
    pub const fn new(row: usize, col: usize) -> CellRef {
        CellRef { row, col }
    }

    /// Parse a label like "A1" or "AB12". Only uppercase letters are accepted.
    pub fn decode(label: &str) -> Result<CellRef, CellError> {
        Self::parse_a1(label).ok_or(CellError::InvalidReference)
    }

    fn parse_a1(name: &str) -> Option<CellRef> {
        let caps = label_re().captures(name)?;
        let letters = &caps["letters"];
        let numbers = &caps["numbers"];

        let mut col_acc = 0usize;
        for c in letters.bytes() {
            let digit = (c - b'A') as usize + 1;
            col_acc = col_acc.checked_mul(26)?.checked_add(digit)?;
        }
        let col = col_acc.checked_sub(1)?;

        let row = numbers.parse::<usize>().ok()?.checked_sub(1)?;

        Some(CellRef::new(row, col))
    }

    /// The "A1" label for this coordinate.
    pub fn label(&self) -> String {
        self.to_string()
    }

    /// Convert column index to spreadsheet-style letters (0 -> A, 25 -> Z, 26 -> AA).
    pub fn col_to_letters(col: usize) -> String {
        let mut result = String::new();
        let mut n = col as u128 + 1;
        while n > 0 {
            n -= 1;
            result.insert(0, (b'A' + (n % 26) as u8) as char);
            n /= 26;
        }
        result
    }

    /// Offset by a (row, col) delta, `None` on underflow or overflow.
    pub fn offset(&self, rows: isize, cols: isize) -> Option<CellRef> {
        Some(CellRef::new(
            self.row.checked_add_signed(rows)?,
            self.col.checked_add_signed(cols)?,
        ))
    }
}

impl std::str::FromStr for CellRef {
    type Err = CellError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        CellRef::decode(s)
    }
}

impl fmt::Display for CellRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", CellRef::col_to_letters(self.col), self.row as u128 + 1)
    }
}

/// A rectangular block of cells, inclusive on both corners.
#[derive(Clone, Copy, Debug, Hash, Eq, PartialEq, Serialize, Deserialize)]
pub struct CellRange {
    pub start: CellRef,
    pub end: CellRef,
}

impl CellRange {
    /// Build a range from any two corners.
    pub fn new(a: CellRef, b: CellRef) -> CellRange {
        CellRange {
            start: CellRef::new(a.row.min(b.row), a.col.min(b.col)),
            end: CellRef::new(a.row.max(b.row), a.col.max(b.col)),
        }
    }

    pub fn single(cell: CellRef) -> CellRange {
        CellRange::new(cell, cell)
    }

    /// Parse "A1:B5" (or a lone "A1").
    pub fn parse(range: &str) -> Result<CellRange, CellError> {
        match range.split_once(':') {
            Some((a, b)) => Ok(CellRange::new(CellRef::decode(a)?, CellRef::decode(b)?)),
            None => Ok(CellRange::single(CellRef::decode(range)?)),
        }
    }

    pub fn rows(&self) -> usize {
        self.end.row - self.start.row + 1
    }

    pub fn cols(&self) -> usize {
        self.end.col - self.start.col + 1
    }

    pub fn contains(&self, cell: &CellRef) -> bool {
        cell.row >= self.start.row
            && cell.row <= self.end.row
            && cell.col >= self.start.col
            && cell.col <= self.end.col
    }

    /// All cells of the range in row-major order.
    pub fn iter(&self) -> impl Iterator<Item = CellRef> + '_ {
        (self.start.row..=self.end.row)
            .flat_map(move |row| (self.start.col..=self.end.col).map(move |col| CellRef::new(row, col)))
    }
}

impl fmt::Display for CellRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.start == self.end {
            write!(f, "{}", self.start)
        } else {
            write!(f, "{}:{}", self.start, self.end)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{CellRange, CellRef};
    use proptest::prelude::*;

    #[test]
    fn test_parse_a1_overflow_is_invalid() {
        let huge = format!("{}1", "Z".repeat(40));
        assert!(CellRef::decode(&huge).is_err());
    }

    #[test]
    fn test_col_to_letters_handles_max_usize() {
        let letters = CellRef::col_to_letters(usize::MAX);
        assert!(!letters.is_empty());
        assert!(letters.chars().all(|c| c.is_ascii_uppercase()));
    }

    #[test]
    fn test_decode_rejects_lowercase_and_zero_row() {
        assert!(CellRef::decode("a1").is_err());
        assert!(CellRef::decode("A0").is_err());
        assert!(CellRef::decode("A-1").is_err());
        assert!(CellRef::decode("1A").is_err());
    }

    #[test]
    fn test_range_normalises_corners() {
        let range = CellRange::new(CellRef::new(3, 3), CellRef::new(1, 0));
        assert_eq!(range.start, CellRef::new(1, 0));
        assert_eq!(range.end, CellRef::new(3, 3));
        assert_eq!(range.rows(), 3);
        assert_eq!(range.cols(), 4);
        assert_eq!(range.to_string(), "A2:D4");
    }

    #[test]
    fn test_range_iterates_row_major() {
        let range = CellRange::parse("C3:D4").unwrap();
        let labels: Vec<String> = range.iter().map(|c| c.label()).collect();
        assert_eq!(labels, vec!["C3", "D3", "C4", "D4"]);
    }

    #[test]
    fn test_offset_underflow() {
        assert_eq!(CellRef::new(0, 0).offset(-1, 0), None);
        assert_eq!(CellRef::new(2, 2).offset(-1, 1), Some(CellRef::new(1, 3)));
    }

    proptest! {
        #[test]
        fn decode_inverts_encode(row in 0usize..1_000_000, col in 0usize..100_000) {
            let cell = CellRef::new(row, col);
            prop_assert_eq!(CellRef::decode(&cell.label()).unwrap(), cell);
        }

        #[test]
        fn encode_is_injective(a in (0usize..500, 0usize..500), b in (0usize..500, 0usize..500)) {
            let x = CellRef::new(a.0, a.1);
            let y = CellRef::new(b.0, b.1);
            prop_assert_eq!(x == y, x.label() == y.label());
        }
    }
}
