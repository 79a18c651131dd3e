//! Error types for Gridcalc core.

use thiserror::Error;

use gridcalc_engine::engine::{CommitError, StoreError};

/// Errors that can occur in the Gridcalc document layer
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GridcalcError {
    #[error(transparent)]
    Commit(#[from] CommitError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("Nothing to undo")]
    NothingToUndo,

    #[error("Nothing to redo")]
    NothingToRedo,

    #[error("No cell selected")]
    NoSelection,
}

pub type Result<T> = std::result::Result<T, GridcalcError>;
