//! Bounded sparse cell storage.
//!
//! Only cells that differ from the default empty cell are kept. Writes are
//! crate-private so that [`Sheet`](super::Sheet) stays the only mutation path.

use std::collections::HashMap;

use super::cell::{Cell, CellValue};
use super::cell_ref::CellRef;
use super::error::StoreError;
use super::parser::Expr;

static EMPTY_CELL: Cell = Cell::new_empty();

/// Grid of `rows x cols` cells, lazily created.
#[derive(Clone, Debug)]
pub struct CellStore {
    rows: usize,
    cols: usize,
    cells: HashMap<CellRef, Cell>,
}

impl CellStore {
    pub fn new(rows: usize, cols: usize) -> Self {
        CellStore {
            rows,
            cols,
            cells: HashMap::new(),
        }
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn contains(&self, cell: &CellRef) -> bool {
        cell.row < self.rows && cell.col < self.cols
    }

    pub fn check(&self, cell: CellRef) -> Result<(), StoreError> {
        if self.contains(&cell) {
            Ok(())
        } else {
            Err(StoreError {
                cell,
                rows: self.rows,
                cols: self.cols,
            })
        }
    }

    /// The cell at `cell`, or the shared empty cell if it was never written.
    pub fn get(&self, cell: CellRef) -> Result<&Cell, StoreError> {
        self.check(cell)?;
        Ok(self.cells.get(&cell).unwrap_or(&EMPTY_CELL))
    }

    pub fn value(&self, cell: CellRef) -> Result<&CellValue, StoreError> {
        self.get(cell).map(|c| &c.value)
    }

    /// Non-default cells in row-major order.
    pub fn iter(&self) -> impl Iterator<Item = (CellRef, &Cell)> {
        let mut keys: Vec<&CellRef> = self.cells.keys().collect();
        keys.sort();
        keys.into_iter().map(|k| (*k, &self.cells[k]))
    }

    /// Number of stored (non-default) cells.
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Replace a cell's content in one step. Style is kept.
    pub(crate) fn set(
        &mut self,
        cell: CellRef,
        raw_input: String,
        formula: Option<Expr>,
        value: CellValue,
    ) -> Result<(), StoreError> {
        self.check(cell)?;
        let entry = self.cells.entry(cell).or_default();
        entry.raw_input = raw_input;
        entry.formula = formula;
        entry.value = value;
        if entry.is_blank() {
            self.cells.remove(&cell);
        }
        Ok(())
    }

    /// Overwrite only the computed value; used when publishing a pass.
    pub(crate) fn set_value(&mut self, cell: CellRef, value: CellValue) {
        if !self.contains(&cell) {
            return;
        }
        match self.cells.get_mut(&cell) {
            Some(entry) => entry.value = value,
            None if value != CellValue::Empty => {
                self.cells.insert(
                    cell,
                    Cell {
                        value,
                        ..Cell::default()
                    },
                );
            }
            None => {}
        }
    }

    /// Attach or remove a presentation tag.
    pub fn set_style(&mut self, cell: CellRef, style: Option<String>) -> Result<(), StoreError> {
        self.check(cell)?;
        let entry = self.cells.entry(cell).or_default();
        entry.style = style;
        if entry.is_blank() {
            self.cells.remove(&cell);
        }
        Ok(())
    }
}
