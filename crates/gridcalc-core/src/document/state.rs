use gridcalc_engine::engine::{CellRef, CellValue, Sheet, StoreError};

/// Maximum number of undo entries to keep
pub(crate) const MAX_UNDO_STACK: usize = 100;

/// Default grid height for [`Document::default`].
pub const DEFAULT_ROWS: usize = 100;
/// Default grid width for [`Document::default`] (A..Z).
pub const DEFAULT_COLS: usize = 26;

/// Represents an undoable edit of a single cell
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UndoAction {
    pub cell_ref: CellRef,
    pub old_input: String,
    pub new_input: String,
}

/// Represents an undo entry (single edit or a batch from paste/cut)
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum UndoEntry {
    /// A single cell modification
    Single(UndoAction),
    /// Several modifications applied as one user action
    Batch(Vec<UndoAction>),
}

/// Receives the display text of every cell a recalculation pass touched.
pub trait CellObserver: Send + Sync {
    fn cell_changed(&mut self, cell: CellRef, display: &str);
}

impl<F> CellObserver for F
where
    F: FnMut(CellRef, &str) + Send + Sync,
{
    fn cell_changed(&mut self, cell: CellRef, display: &str) {
        self(cell, display)
    }
}

/// UI-agnostic document state for the spreadsheet.
pub struct Document {
    /// The grid and its recalculation engine
    pub(crate) sheet: Sheet,
    /// Subscribers to cell changes
    pub(crate) observers: Vec<Box<dyn CellObserver>>,
    /// Whether the grid has been modified
    pub modified: bool,
    /// Undo stack
    pub(crate) undo_stack: Vec<UndoEntry>,
    /// Redo stack
    pub(crate) redo_stack: Vec<UndoEntry>,
}

impl Document {
    /// Create an empty `rows x cols` document.
    pub fn new(rows: usize, cols: usize) -> Self {
        Document {
            sheet: Sheet::new(rows, cols),
            observers: Vec::new(),
            modified: false,
            undo_stack: Vec::new(),
            redo_stack: Vec::new(),
        }
    }

    pub fn sheet(&self) -> &Sheet {
        &self.sheet
    }

    pub fn rows(&self) -> usize {
        self.sheet.rows()
    }

    pub fn cols(&self) -> usize {
        self.sheet.cols()
    }

    /// Register a change observer; it sees every cell touched from now on.
    pub fn subscribe(&mut self, observer: Box<dyn CellObserver>) {
        self.observers.push(observer);
    }

    /// Display value for a cell, errors as short codes.
    pub fn display_value(&self, cell_ref: CellRef) -> Result<String, StoreError> {
        self.sheet.display_value(cell_ref)
    }

    pub fn value(&self, cell_ref: CellRef) -> Result<&CellValue, StoreError> {
        self.sheet.value(cell_ref)
    }

    /// Text as last entered (formula marker included).
    pub fn raw_input(&self, cell_ref: CellRef) -> Result<&str, StoreError> {
        self.sheet.raw_input(cell_ref)
    }

    pub fn set_style(&mut self, cell_ref: CellRef, style: Option<String>) -> Result<(), StoreError> {
        self.sheet.set_style(cell_ref, style)
    }

    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    pub(crate) fn notify(&mut self, touched: &[CellRef]) {
        if self.observers.is_empty() {
            return;
        }
        for &cell in touched {
            let display = self.sheet.display_value(cell).unwrap_or_default();
            for observer in &mut self.observers {
                observer.cell_changed(cell, &display);
            }
        }
    }
}

impl Default for Document {
    fn default() -> Self {
        Self::new(DEFAULT_ROWS, DEFAULT_COLS)
    }
}
