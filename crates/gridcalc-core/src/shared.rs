//! A document shared between threads.
//!
//! Writers hold the exclusive lock for a whole recalculation pass, so readers
//! only ever see fully published states.

use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use gridcalc_engine::engine::{CellRef, Recalculation, StoreError};

use crate::document::{Document, PasteOutcome};
use crate::error::Result;

#[derive(Clone)]
pub struct SharedDocument {
    inner: Arc<RwLock<Document>>,
}

impl SharedDocument {
    pub fn new(document: Document) -> Self {
        SharedDocument {
            inner: Arc::new(RwLock::new(document)),
        }
    }

    /// Shared read access. A poisoned lock is recovered; the engine publishes
    /// a pass in a single step, so the state behind it is consistent.
    pub fn read(&self) -> RwLockReadGuard<'_, Document> {
        self.inner.read().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn write(&self) -> RwLockWriteGuard<'_, Document> {
        self.inner.write().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn commit_edit(&self, cell_ref: CellRef, input: &str) -> Result<Recalculation> {
        self.write().commit_edit(cell_ref, input)
    }

    pub fn paste(&self, text: &str, anchor: CellRef) -> Vec<PasteOutcome> {
        self.write().paste(text, anchor)
    }

    pub fn undo(&self) -> Result<()> {
        self.write().undo()
    }

    pub fn redo(&self) -> Result<()> {
        self.write().redo()
    }

    pub fn display_value(&self, cell_ref: CellRef) -> std::result::Result<String, StoreError> {
        self.read().display_value(cell_ref)
    }
}

impl From<Document> for SharedDocument {
    fn from(document: Document) -> Self {
        Self::new(document)
    }
}
