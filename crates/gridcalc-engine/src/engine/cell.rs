//! Cell data structures for the spreadsheet grid.
//!
//! This module provides the core data types for representing cells:
//! - [`CellValue`] - A computed value (empty, text, number, or error)
//! - [`Cell`] - Raw input, parsed formula, cached value and style

use serde::{Deserialize, Serialize};

use super::error::{CellError, ErrorCode};
use super::parser::Expr;

/// Leading character that marks raw input as a formula.
pub const FORMULA_MARKER: char = '=';

/// The computed content of a cell.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, Default)]
pub enum CellValue {
    #[default]
    Empty,
    Number(f64),
    Text(String),
    Error(CellError),
}

impl CellValue {
    /// Interpret non-formula raw input.
    /// - Empty string or whitespace -> Empty
    /// - Quoted string -> Text (without quotes)
    /// - Valid number -> Number
    /// - Otherwise -> Text
    pub fn from_literal(input: &str) -> CellValue {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return CellValue::Empty;
        }

        if trimmed.starts_with('"') && trimmed.ends_with('"') && trimmed.len() >= 2 {
            return CellValue::Text(trimmed[1..trimmed.len() - 1].to_string());
        }

        // f64::from_str also accepts "inf" and "NaN"; those stay text.
        let numeric = trimmed
            .bytes()
            .all(|b| b.is_ascii_digit() || matches!(b, b'.' | b'e' | b'E' | b'+' | b'-'));
        if numeric {
            if let Ok(n) = trimmed.parse::<f64>()
                && n.is_finite()
            {
                return CellValue::Number(n);
            }
        }

        CellValue::Text(trimmed.to_string())
    }

    pub fn error_code(&self) -> Option<ErrorCode> {
        match self {
            CellValue::Error(e) => Some((*e).into()),
            _ => None,
        }
    }
}

impl From<f64> for CellValue {
    fn from(n: f64) -> Self {
        CellValue::Number(n)
    }
}

impl From<CellError> for CellValue {
    fn from(e: CellError) -> Self {
        CellValue::Error(e)
    }
}

/// Returns the formula body when `input` carries the formula marker.
pub fn formula_body(input: &str) -> Option<&str> {
    input.trim_start().strip_prefix(FORMULA_MARKER)
}

/// A cell in the spreadsheet grid.
#[derive(Clone, Debug, PartialEq, Default)]
pub struct Cell {
    /// Text as last entered, formula marker included.
    pub raw_input: String,
    /// Parsed formula, present iff `raw_input` is formula-marked.
    pub formula: Option<Expr>,
    /// Cached computed value.
    pub value: CellValue,
    /// Opaque presentation tag, never read by the engine.
    pub style: Option<String>,
}

impl Cell {
    pub const fn new_empty() -> Cell {
        Cell {
            raw_input: String::new(),
            formula: None,
            value: CellValue::Empty,
            style: None,
        }
    }

    pub fn is_formula(&self) -> bool {
        self.formula.is_some()
    }

    /// True when nothing distinguishes this cell from a never-addressed one.
    pub fn is_blank(&self) -> bool {
        self.raw_input.is_empty() && self.formula.is_none() && self.style.is_none()
    }
}
