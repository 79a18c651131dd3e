//! Document state and logic (UI-agnostic).

mod ops;
mod state;

pub use ops::PasteOutcome;
pub use state::{CellObserver, DEFAULT_COLS, DEFAULT_ROWS, Document, UndoAction, UndoEntry};
