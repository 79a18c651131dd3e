//! Presentation-layer actions and their dispatch onto a document.

use gridcalc_engine::engine::{CellRange, CellRef, Recalculation, StoreError};

use crate::document::{Document, PasteOutcome};
use crate::error::{GridcalcError, Result};
use crate::session::{Direction, EditSession};

/// Input events a front end feeds to a [`Workspace`].
#[derive(Clone, Debug, PartialEq)]
pub enum Action {
    SelectCell(CellRef),
    BeginEdit(CellRef, String),
    UpdateEditBuffer(String),
    /// Enter
    Commit,
    /// Tab
    CommitRight,
    /// Escape
    Cancel,
    MoveSelection { direction: Direction, extend: bool },
    Copy,
    Paste(String),
    Cut,
    Undo,
    Redo,
    Clear,
}

/// What an accepted action did.
#[derive(Clone, Debug, PartialEq)]
pub enum ActionOutcome {
    /// Not applicable in the current state.
    Ignored,
    Selected(CellRef),
    Editing(CellRef),
    Committed(Recalculation),
    Cancelled,
    /// Clipboard text for the selected block.
    Copied(String),
    Pasted(Vec<PasteOutcome>),
    Undone,
    Redone,
    Cleared,
}

/// A document plus the navigation state of whoever is driving it.
pub struct Workspace {
    pub document: Document,
    pub session: EditSession,
}

impl Workspace {
    pub fn new(document: Document) -> Self {
        let session = EditSession::new(document.rows(), document.cols());
        Workspace { document, session }
    }

    pub fn apply(&mut self, action: Action) -> Result<ActionOutcome> {
        log::trace!("action: {:?}", action);
        match action {
            Action::SelectCell(cell) => Ok(self.select_cell(cell)),
            Action::BeginEdit(cell, initial) => Ok(self.begin_edit(cell, &initial)),
            Action::UpdateEditBuffer(text) => Ok(self.update_edit_buffer(&text)),
            Action::Commit => self.commit(Direction::Down),
            Action::CommitRight => self.commit(Direction::Right),
            Action::Cancel => Ok(self.cancel()),
            Action::MoveSelection { direction, extend } => {
                Ok(self.move_selection(direction, extend))
            }
            Action::Copy => self.copy_request().map(ActionOutcome::Copied),
            Action::Paste(text) => self.paste_request(&text).map(ActionOutcome::Pasted),
            Action::Cut => self.cut_request().map(ActionOutcome::Copied),
            Action::Undo if !self.document.can_undo() => Ok(ActionOutcome::Ignored),
            Action::Undo => self.document.undo().map(|_| ActionOutcome::Undone),
            Action::Redo if !self.document.can_redo() => Ok(ActionOutcome::Ignored),
            Action::Redo => self.document.redo().map(|_| ActionOutcome::Redone),
            Action::Clear => {
                let range = self.require_selection()?;
                self.document.clear_range(range)?;
                Ok(ActionOutcome::Cleared)
            }
        }
    }

    pub fn select_cell(&mut self, cell: CellRef) -> ActionOutcome {
        if self.session.select(cell) {
            ActionOutcome::Selected(cell)
        } else {
            ActionOutcome::Ignored
        }
    }

    pub fn begin_edit(&mut self, cell: CellRef, initial: &str) -> ActionOutcome {
        if self.session.begin_edit(cell, initial) {
            ActionOutcome::Editing(cell)
        } else {
            ActionOutcome::Ignored
        }
    }

    pub fn update_edit_buffer(&mut self, text: &str) -> ActionOutcome {
        self.session.update_buffer(text);
        match self.session.pending_commit() {
            Some((cell, _)) => ActionOutcome::Editing(cell),
            None => ActionOutcome::Ignored,
        }
    }

    /// Commit the edit buffer and advance in `advance`. A rejected commit
    /// leaves the buffer in place.
    pub fn commit(&mut self, advance: Direction) -> Result<ActionOutcome> {
        let Some((cell, buffer)) = self.session.pending_commit() else {
            return Ok(ActionOutcome::Ignored);
        };
        let buffer = buffer.to_string();
        let recalc = self.document.commit_edit(cell, &buffer)?;
        self.session.finish_commit(advance);
        Ok(ActionOutcome::Committed(recalc))
    }

    pub fn cancel(&mut self) -> ActionOutcome {
        if !self.session.is_editing() {
            return ActionOutcome::Ignored;
        }
        self.session.cancel();
        ActionOutcome::Cancelled
    }

    pub fn move_selection(&mut self, direction: Direction, extend: bool) -> ActionOutcome {
        match self.session.move_selection(direction, extend) {
            Some(cell) => ActionOutcome::Selected(cell),
            None => ActionOutcome::Ignored,
        }
    }

    pub fn copy_request(&self) -> Result<String> {
        let range = self.require_selection()?;
        self.document.copy_range(range)
    }

    /// Paste with the block's top-left field at the selection's top-left cell.
    pub fn paste_request(&mut self, text: &str) -> Result<Vec<PasteOutcome>> {
        let range = self.require_selection()?;
        Ok(self.document.paste(text, range.start))
    }

    pub fn cut_request(&mut self) -> Result<String> {
        let range = self.require_selection()?;
        self.document.cut_range(range)
    }

    pub fn current_selection(&self) -> Option<CellRange> {
        self.session.selection()
    }

    pub fn display_value(&self, cell: CellRef) -> std::result::Result<String, StoreError> {
        self.document.display_value(cell)
    }

    fn require_selection(&self) -> Result<CellRange> {
        self.session.selection().ok_or(GridcalcError::NoSelection)
    }
}

impl Default for Workspace {
    fn default() -> Self {
        Self::new(Document::default())
    }
}
