//! gridcalc_engine - Spreadsheet engine: formulas, dependency tracking, recalculation.

pub mod engine;
