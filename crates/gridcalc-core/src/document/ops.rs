use super::state::MAX_UNDO_STACK;
use super::{Document, UndoAction, UndoEntry};
use crate::clipboard;
use crate::error::{GridcalcError, Result};
use gridcalc_engine::engine::{CellRange, CellRef, CommitError, Recalculation};

/// Per-cell result of a paste.
#[derive(Clone, Debug, PartialEq)]
pub struct PasteOutcome {
    pub cell_ref: CellRef,
    pub result: std::result::Result<Recalculation, CommitError>,
}

impl Document {
    /// Commit without recording history. Observers are notified.
    fn apply_edit(
        &mut self,
        cell_ref: CellRef,
        input: &str,
    ) -> std::result::Result<(Recalculation, String), CommitError> {
        let old_input = self.sheet.raw_input(cell_ref)?.to_string();
        let recalc = self.sheet.commit_edit(cell_ref, input)?;
        self.notify(&recalc.touched);
        self.modified = true;
        Ok((recalc, old_input))
    }

    fn push_undo(&mut self, entry: UndoEntry) {
        self.undo_stack.push(entry);
        self.redo_stack.clear();
        if self.undo_stack.len() > MAX_UNDO_STACK {
            self.undo_stack.remove(0);
        }
    }

    /// Set cell contents from input string, recalculating dependents.
    pub fn commit_edit(&mut self, cell_ref: CellRef, input: &str) -> Result<Recalculation> {
        let (recalc, old_input) = self.apply_edit(cell_ref, input)?;
        if old_input != input {
            self.push_undo(UndoEntry::Single(UndoAction {
                cell_ref,
                old_input,
                new_input: input.to_string(),
            }));
        }
        Ok(recalc)
    }

    /// Reset the specified cell to empty
    pub fn clear_cell(&mut self, cell_ref: CellRef) -> Result<Recalculation> {
        self.commit_edit(cell_ref, "")
    }

    /// Reset every cell of `range` to empty as one undoable step.
    pub fn clear_range(&mut self, range: CellRange) -> Result<()> {
        self.sheet.store().check(range.end)?;
        let mut actions = Vec::new();
        for cell_ref in range.iter() {
            if self.sheet.raw_input(cell_ref)?.is_empty() {
                continue;
            }
            let (_, old_input) = self.apply_edit(cell_ref, "")?;
            actions.push(UndoAction {
                cell_ref,
                old_input,
                new_input: String::new(),
            });
        }
        self.push_undo_batch(actions);
        Ok(())
    }

    /// Push a batch of undo actions (e.g., from a paste)
    pub fn push_undo_batch(&mut self, actions: Vec<UndoAction>) {
        if actions.is_empty() {
            return;
        }
        self.push_undo(UndoEntry::Batch(actions));
    }

    /// Raw inputs of `range` as clipboard text.
    pub fn copy_range(&self, range: CellRange) -> Result<String> {
        Ok(clipboard::serialize(&self.sheet, range)?)
    }

    /// Copy `range`, then clear it.
    pub fn cut_range(&mut self, range: CellRange) -> Result<String> {
        let text = self.copy_range(range)?;
        self.clear_range(range)?;
        Ok(text)
    }

    /// Paste clipboard text with its top-left field at `anchor`.
    ///
    /// Cells are committed one by one in row-major order; a rejected cell
    /// does not stop the rest. Successful cells form one undo step.
    pub fn paste(&mut self, text: &str, anchor: CellRef) -> Vec<PasteOutcome> {
        let pairs = clipboard::deserialize(text, anchor, self.rows(), self.cols());
        let mut outcomes = Vec::with_capacity(pairs.len());
        let mut actions = Vec::new();

        for (cell_ref, input) in pairs {
            let result = match self.apply_edit(cell_ref, &input) {
                Ok((recalc, old_input)) => {
                    if old_input != input {
                        actions.push(UndoAction {
                            cell_ref,
                            old_input,
                            new_input: input,
                        });
                    }
                    Ok(recalc)
                }
                Err(err) => {
                    log::warn!("paste: {} rejected: {}", cell_ref, err);
                    Err(err)
                }
            };
            outcomes.push(PasteOutcome { cell_ref, result });
        }

        log::debug!(
            "paste at {}: {} cell(s), {} rejected",
            anchor,
            outcomes.len(),
            outcomes.iter().filter(|o| o.result.is_err()).count()
        );
        self.push_undo_batch(actions);
        outcomes
    }

    /// Undo the last action
    pub fn undo(&mut self) -> Result<()> {
        let entry = self.undo_stack.pop().ok_or(GridcalcError::NothingToUndo)?;
        let actions = match &entry {
            UndoEntry::Single(action) => std::slice::from_ref(action),
            UndoEntry::Batch(actions) => actions.as_slice(),
        };
        // Replaying backwards revisits states that were all acyclic.
        for action in actions.iter().rev() {
            self.apply_edit(action.cell_ref, &action.old_input)?;
        }
        log::debug!("undo: {} cell(s)", actions.len());
        self.redo_stack.push(entry);
        Ok(())
    }

    /// Redo the last undone action
    pub fn redo(&mut self) -> Result<()> {
        let entry = self.redo_stack.pop().ok_or(GridcalcError::NothingToRedo)?;
        let actions = match &entry {
            UndoEntry::Single(action) => std::slice::from_ref(action),
            UndoEntry::Batch(actions) => actions.as_slice(),
        };
        for action in actions {
            self.apply_edit(action.cell_ref, &action.new_input)?;
        }
        log::debug!("redo: {} cell(s)", actions.len());
        self.undo_stack.push(entry);
        Ok(())
    }
}
