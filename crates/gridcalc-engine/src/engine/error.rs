//! Error types for the engine.
//!
//! Two families exist:
//! - [`CellError`] values live inside cells and propagate to dependents.
//! - [`CommitError`] rejections are returned by [`Sheet::commit_edit`](super::Sheet::commit_edit)
//!   and never reach the store.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::cell_ref::CellRef;

/// Value-level evaluation errors stored as a cell's computed value.
#[derive(Error, Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CellError {
    #[error("division by zero")]
    DivideByZero,

    #[error("invalid cell reference")]
    InvalidReference,

    #[error("text used where a number is required")]
    TypeError,
}

/// Formula text that does not match the grammar.
#[derive(Error, Clone, Debug, PartialEq, Eq)]
#[error("syntax error at position {position}: {reason}")]
pub struct ParseError {
    /// Zero-based character offset into the formula body.
    pub position: usize,
    pub reason: String,
}

impl ParseError {
    pub(crate) fn new(position: usize, reason: impl Into<String>) -> Self {
        ParseError {
            position,
            reason: reason.into(),
        }
    }
}

/// Addressing a coordinate outside the grid.
#[derive(Error, Clone, Copy, Debug, PartialEq, Eq)]
#[error("{cell} is outside the {rows}x{cols} grid")]
pub struct StoreError {
    pub cell: CellRef,
    pub rows: usize,
    pub cols: usize,
}

/// Reasons an edit is rejected before touching any state.
#[derive(Error, Clone, Debug, PartialEq, Eq)]
pub enum CommitError {
    #[error(transparent)]
    Syntax(#[from] ParseError),

    #[error("circular reference: {}", format_path(.path))]
    Cycle { path: Vec<CellRef> },

    #[error(transparent)]
    OutOfBounds(#[from] StoreError),
}

fn format_path(path: &[CellRef]) -> String {
    path.iter()
        .map(|c| c.to_string())
        .collect::<Vec<_>>()
        .join(" -> ")
}

/// Short display codes shared by stored values and rejected edits.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    Cycle,
    DivideByZero,
    InvalidReference,
    Syntax,
    Type,
}

impl ErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::Cycle => "#CYCLE!",
            ErrorCode::DivideByZero => "#DIV0!",
            ErrorCode::InvalidReference => "#REF!",
            ErrorCode::Syntax => "#SYNTAX!",
            ErrorCode::Type => "#TYPE!",
        }
    }
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<CellError> for ErrorCode {
    fn from(err: CellError) -> Self {
        match err {
            CellError::DivideByZero => ErrorCode::DivideByZero,
            CellError::InvalidReference => ErrorCode::InvalidReference,
            CellError::TypeError => ErrorCode::Type,
        }
    }
}

impl CommitError {
    pub fn code(&self) -> ErrorCode {
        match self {
            CommitError::Syntax(_) => ErrorCode::Syntax,
            CommitError::Cycle { .. } => ErrorCode::Cycle,
            CommitError::OutOfBounds(_) => ErrorCode::InvalidReference,
        }
    }

    /// Cells named by a cycle rejection, empty for other kinds.
    pub fn cycle_cells(&self) -> &[CellRef] {
        match self {
            CommitError::Cycle { path } => path,
            _ => &[],
        }
    }
}
