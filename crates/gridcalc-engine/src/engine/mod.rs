//! Spreadsheet engine API.
//!
//! This module provides the core computation engine for the spreadsheet:
//!
//! - [`CellRef`], [`CellRange`] - Cell reference parsing (A1 notation ↔ row/col indices)
//! - [`Cell`], [`CellValue`], [`CellStore`] - Data structures for cell storage
//! - [`parse_formula`], [`Expr`] - Formula parsing
//! - [`DependencyGraph`] - Reads-from edges, cycle detection, dirty closures
//! - [`evaluate`] - Formula evaluation
//! - [`Sheet`] - Edit commits with automatic recalculation
//! - [`format_value`] - Format values for display

mod cell;
mod cell_ref;
mod error;
mod eval;
mod format;
mod graph;
mod parser;
mod sheet;
mod store;

pub use cell::{Cell, CellValue, FORMULA_MARKER, formula_body};
pub use cell_ref::{CellRange, CellRef};
pub use error::{CellError, CommitError, ErrorCode, ParseError, StoreError};
pub use eval::{ValueSource, evaluate};
pub use format::{format_number, format_value};
pub use graph::DependencyGraph;
pub use parser::{BinaryOp, Expr, parse_formula, parse_input};
pub use sheet::{Recalculation, Sheet};
pub use store::CellStore;
