//! The recalculation coordinator.
//!
//! [`Sheet::commit_edit`] is the only way cell content changes:
//!
//! 1. parse the input (literals are not parsed);
//! 2. collect the formula's in-grid references;
//! 3. reject the edit if those references would close a cycle;
//! 4. rewrite the cell's graph edges and store the new content;
//! 5. walk the dirty closure in dependency order, evaluating each formula
//!    against values already recomputed in this pass;
//! 6. publish all recomputed values to the store together.
//!
//! Rejected edits leave the store and the graph exactly as they were.

use std::collections::HashMap;

use super::cell::{Cell, CellValue};
use super::cell_ref::CellRef;
use super::error::{CellError, CommitError, StoreError};
use super::eval::evaluate;
use super::format::format_value;
use super::graph::DependencyGraph;
use super::parser::parse_input;
use super::store::CellStore;

/// Result of a successful commit.
#[derive(Clone, Debug, PartialEq)]
pub struct Recalculation {
    /// The edited cell.
    pub cell: CellRef,
    /// Its value after the pass.
    pub value: CellValue,
    /// Every cell evaluated by the pass, edited cell first, in evaluation order.
    pub touched: Vec<CellRef>,
}

/// A fixed-size grid with automatic recalculation.
#[derive(Clone, Debug)]
pub struct Sheet {
    store: CellStore,
    graph: DependencyGraph,
}

impl Sheet {
    pub fn new(rows: usize, cols: usize) -> Self {
        Sheet {
            store: CellStore::new(rows, cols),
            graph: DependencyGraph::new(),
        }
    }

    pub fn rows(&self) -> usize {
        self.store.rows()
    }

    pub fn cols(&self) -> usize {
        self.store.cols()
    }

    pub fn store(&self) -> &CellStore {
        &self.store
    }

    pub fn graph(&self) -> &DependencyGraph {
        &self.graph
    }

    pub fn cell(&self, at: CellRef) -> Result<&Cell, StoreError> {
        self.store.get(at)
    }

    pub fn value(&self, at: CellRef) -> Result<&CellValue, StoreError> {
        self.store.value(at)
    }

    pub fn raw_input(&self, at: CellRef) -> Result<&str, StoreError> {
        self.store.get(at).map(|c| c.raw_input.as_str())
    }

    /// Display text for a cell, with errors as short codes.
    pub fn display_value(&self, at: CellRef) -> Result<String, StoreError> {
        self.store.value(at).map(format_value)
    }

    pub fn set_style(&mut self, at: CellRef, style: Option<String>) -> Result<(), StoreError> {
        self.store.set_style(at, style)
    }

    /// Replace the content of `at` with `raw_input` and recompute everything
    /// that depends on it.
    pub fn commit_edit(&mut self, at: CellRef, raw_input: &str) -> Result<Recalculation, CommitError> {
        self.store.check(at)?;

        let formula = match parse_input(raw_input) {
            Some(Ok(expr)) => Some(expr),
            Some(Err(err)) => {
                log::debug!("rejecting {} <- {:?}: {}", at, raw_input, err);
                return Err(err.into());
            }
            None => None,
        };

        // Out-of-grid references stay in the formula and evaluate to #REF!.
        let refs: Vec<CellRef> = formula
            .as_ref()
            .map(|expr| {
                expr.references()
                    .into_iter()
                    .filter(|r| self.store.contains(r))
                    .collect()
            })
            .unwrap_or_default();

        if let Some(path) = self.graph.cycle_path(at, &refs) {
            let err = CommitError::Cycle { path };
            log::debug!("rejecting {} <- {:?}: {}", at, raw_input, err);
            return Err(err);
        }

        self.graph.add_or_replace(at, &refs);
        let pending = match formula {
            Some(_) => CellValue::Empty,
            None => CellValue::from_literal(raw_input),
        };
        self.store.set(at, raw_input.to_string(), formula, pending)?;

        let dirty = self.graph.dirty_closure(at);
        log::debug!("commit {} <- {:?}: {} cell(s) dirty", at, raw_input, dirty.len());
        self.recalculate(&dirty);

        Ok(Recalculation {
            cell: at,
            value: self.store.value(at)?.clone(),
            touched: dirty,
        })
    }

    /// Reset a cell to empty. Equivalent to committing an empty string.
    pub fn clear(&mut self, at: CellRef) -> Result<Recalculation, CommitError> {
        self.commit_edit(at, "")
    }

    /// Re-evaluate every formula in dependency order. Returns the cells evaluated.
    pub fn recalculate_all(&mut self) -> Vec<CellRef> {
        let order: Vec<CellRef> = self
            .graph
            .topological_order()
            .into_iter()
            .filter(|c| self.store.get(*c).is_ok_and(Cell::is_formula))
            .collect();
        self.recalculate(&order);
        order
    }

    /// Evaluate `order` front to back, then publish the results in one step.
    fn recalculate(&mut self, order: &[CellRef]) {
        let mut staged: HashMap<CellRef, CellValue> = HashMap::with_capacity(order.len());

        for &cell in order {
            let value = {
                let Ok(current) = self.store.get(cell) else {
                    continue;
                };
                match &current.formula {
                    Some(expr) => {
                        let store = &self.store;
                        let fresh = &staged;
                        let source = |r: CellRef| -> Result<CellValue, CellError> {
                            if let Some(v) = fresh.get(&r) {
                                return Ok(v.clone());
                            }
                            store
                                .value(r)
                                .cloned()
                                .map_err(|_| CellError::InvalidReference)
                        };
                        evaluate(expr, &source).unwrap_or_else(CellValue::Error)
                    }
                    None => current.value.clone(),
                }
            };
            log::trace!("evaluated {} = {:?}", cell, value);
            staged.insert(cell, value);
        }

        for (cell, value) in staged {
            self.store.set_value(cell, value);
        }
    }
}
