//! Active-cell and edit-buffer state machine.
//!
//! The session never writes cells. A commit hands the pending
//! `(cell, buffer)` to the caller, which runs it through the document and
//! reports back with [`EditSession::finish_commit`].

use gridcalc_engine::engine::{CellRange, CellRef};

/// Cursor movement directions.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SessionState {
    /// No active cell.
    Idle,
    /// Active cell, nothing typed.
    Selected(CellRef),
    /// Active cell with an uncommitted buffer.
    Editing { cell: CellRef, buffer: String },
}

/// Navigation and edit state for one grid.
#[derive(Clone, Debug)]
pub struct EditSession {
    state: SessionState,
    /// Fixed corner of a Shift-extended range.
    anchor: Option<CellRef>,
    rows: usize,
    cols: usize,
}

impl EditSession {
    pub fn new(rows: usize, cols: usize) -> Self {
        EditSession {
            state: SessionState::Idle,
            anchor: None,
            rows,
            cols,
        }
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn active(&self) -> Option<CellRef> {
        match &self.state {
            SessionState::Idle => None,
            SessionState::Selected(cell) | SessionState::Editing { cell, .. } => Some(*cell),
        }
    }

    pub fn buffer(&self) -> Option<&str> {
        match &self.state {
            SessionState::Editing { buffer, .. } => Some(buffer),
            _ => None,
        }
    }

    pub fn is_editing(&self) -> bool {
        matches!(self.state, SessionState::Editing { .. })
    }

    /// The selected block: the active cell, or the range it spans with the anchor.
    pub fn selection(&self) -> Option<CellRange> {
        let active = self.active()?;
        Some(match self.anchor {
            Some(anchor) => CellRange::new(anchor, active),
            None => CellRange::single(active),
        })
    }

    fn in_bounds(&self, cell: &CellRef) -> bool {
        cell.row < self.rows && cell.col < self.cols
    }

    /// Make `cell` active, discarding any uncommitted buffer. Out-of-grid
    /// coordinates are ignored.
    pub fn select(&mut self, cell: CellRef) -> bool {
        if !self.in_bounds(&cell) {
            return false;
        }
        if let SessionState::Editing { cell: editing, .. } = &self.state {
            log::debug!("discarding uncommitted edit of {}", editing);
        }
        self.state = SessionState::Selected(cell);
        self.anchor = None;
        true
    }

    /// Select `cell` and start editing it with `initial` in the buffer.
    pub fn begin_edit(&mut self, cell: CellRef, initial: &str) -> bool {
        if !self.select(cell) {
            return false;
        }
        self.state = SessionState::Editing {
            cell,
            buffer: initial.to_string(),
        };
        true
    }

    /// Replace the buffer. Typing while merely selected starts an edit.
    pub fn update_buffer(&mut self, text: &str) {
        match &mut self.state {
            SessionState::Idle => {}
            SessionState::Selected(cell) => {
                let cell = *cell;
                self.anchor = None;
                self.state = SessionState::Editing {
                    cell,
                    buffer: text.to_string(),
                };
            }
            SessionState::Editing { buffer, .. } => {
                buffer.clear();
                buffer.push_str(text);
            }
        }
    }

    /// The edit awaiting commit, if any.
    pub fn pending_commit(&self) -> Option<(CellRef, &str)> {
        match &self.state {
            SessionState::Editing { cell, buffer } => Some((*cell, buffer)),
            _ => None,
        }
    }

    /// After a successful commit, move to the neighbour in `advance`.
    pub fn finish_commit(&mut self, advance: Direction) {
        if let SessionState::Editing { cell, .. } = self.state {
            self.state = SessionState::Selected(self.step(cell, advance));
            self.anchor = None;
        }
    }

    /// Drop the buffer and go back to plain selection.
    pub fn cancel(&mut self) {
        if let SessionState::Editing { cell, .. } = self.state {
            self.state = SessionState::Selected(cell);
        }
    }

    /// Move the active cell one step, clamped to the grid. With `extend` the
    /// range anchor stays put. Ignored unless a cell is selected and not
    /// being edited.
    pub fn move_selection(&mut self, direction: Direction, extend: bool) -> Option<CellRef> {
        let SessionState::Selected(cell) = self.state else {
            return None;
        };
        if extend {
            self.anchor.get_or_insert(cell);
        } else {
            self.anchor = None;
        }
        let next = self.step(cell, direction);
        self.state = SessionState::Selected(next);
        Some(next)
    }

    fn step(&self, cell: CellRef, direction: Direction) -> CellRef {
        let last_row = self.rows.saturating_sub(1);
        let last_col = self.cols.saturating_sub(1);
        match direction {
            Direction::Up => CellRef::new(cell.row.saturating_sub(1), cell.col),
            Direction::Down => CellRef::new((cell.row + 1).min(last_row), cell.col),
            Direction::Left => CellRef::new(cell.row, cell.col.saturating_sub(1)),
            Direction::Right => CellRef::new(cell.row, (cell.col + 1).min(last_col)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn c(label: &str) -> CellRef {
        CellRef::decode(label).unwrap()
    }

    #[test]
    fn test_starts_idle_and_ignores_moves() {
        let mut session = EditSession::new(5, 5);
        assert_eq!(session.state(), &SessionState::Idle);
        assert_eq!(session.move_selection(Direction::Down, false), None);
        session.update_buffer("x");
        assert_eq!(session.state(), &SessionState::Idle);
    }

    #[test]
    fn test_typing_starts_edit_and_escape_discards() {
        let mut session = EditSession::new(5, 5);
        session.select(c("B2"));
        session.update_buffer("=1");
        assert_eq!(session.pending_commit(), Some((c("B2"), "=1")));
        session.update_buffer("=12");
        assert_eq!(session.buffer(), Some("=12"));

        session.cancel();
        assert_eq!(session.state(), &SessionState::Selected(c("B2")));
        assert_eq!(session.buffer(), None);
    }

    #[test]
    fn test_select_discards_buffer() {
        let mut session = EditSession::new(5, 5);
        session.begin_edit(c("A1"), "draft");
        assert!(session.select(c("C3")));
        assert_eq!(session.state(), &SessionState::Selected(c("C3")));
        assert!(!session.select(c("Z9")));
        assert_eq!(session.active(), Some(c("C3")));
    }

    #[test]
    fn test_finish_commit_advances() {
        let mut session = EditSession::new(5, 5);
        session.begin_edit(c("A1"), "1");
        session.finish_commit(Direction::Down);
        assert_eq!(session.state(), &SessionState::Selected(c("A2")));

        session.begin_edit(c("A2"), "2");
        session.finish_commit(Direction::Right);
        assert_eq!(session.state(), &SessionState::Selected(c("B2")));
    }

    #[test]
    fn test_commit_on_last_row_stays_put() {
        let mut session = EditSession::new(2, 2);
        session.begin_edit(c("B2"), "1");
        session.finish_commit(Direction::Down);
        assert_eq!(session.active(), Some(c("B2")));
    }

    #[test]
    fn test_right_arrow_clamps_at_last_column() {
        let mut session = EditSession::new(3, 4);
        session.select(c("D1"));
        for _ in 0..10 {
            session.move_selection(Direction::Right, false);
        }
        assert_eq!(session.active(), Some(c("D1")));

        session.select(c("A1"));
        session.move_selection(Direction::Up, false);
        session.move_selection(Direction::Left, false);
        assert_eq!(session.active(), Some(c("A1")));
    }

    #[test]
    fn test_moves_ignored_while_editing() {
        let mut session = EditSession::new(5, 5);
        session.begin_edit(c("B2"), "x");
        assert_eq!(session.move_selection(Direction::Right, false), None);
        assert_eq!(session.pending_commit(), Some((c("B2"), "x")));
    }

    #[test]
    fn test_extend_builds_range() {
        let mut session = EditSession::new(10, 10);
        session.select(c("B2"));
        session.move_selection(Direction::Right, true);
        session.move_selection(Direction::Down, true);
        assert_eq!(session.selection(), Some(CellRange::parse("B2:C3").unwrap()));

        session.move_selection(Direction::Down, false);
        assert_eq!(session.selection(), Some(CellRange::single(c("C4"))));
    }
}
