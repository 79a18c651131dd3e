//! gridcalc-core - UI-agnostic document, edit session and clipboard handling.

pub mod actions;
pub mod clipboard;
pub mod document;
pub mod error;
pub mod session;
pub mod shared;

pub use actions::{Action, ActionOutcome, Workspace};
pub use clipboard::{ClipboardProvider, MemoryClipboard};
pub use document::{CellObserver, Document, PasteOutcome, UndoAction};
pub use error::{GridcalcError, Result};
pub use session::{Direction, EditSession, SessionState};
pub use shared::SharedDocument;

pub use gridcalc_engine::engine::{CellRange, CellRef};
