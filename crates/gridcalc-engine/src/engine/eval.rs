//! Formula evaluation.
//!
//! [`evaluate`] walks an [`Expr`] and pulls referenced values through a
//! [`ValueSource`]. Failures are values: the result is a [`CellError`] that the
//! caller stores in the cell, never a panic.

use super::cell::CellValue;
use super::cell_ref::CellRef;
use super::error::CellError;
use super::parser::{BinaryOp, Expr};

/// Supplies the current value of a referenced cell.
pub trait ValueSource {
    /// `Err(InvalidReference)` for coordinates outside the grid.
    fn value_of(&self, cell: CellRef) -> Result<CellValue, CellError>;
}

impl<F> ValueSource for F
where
    F: Fn(CellRef) -> Result<CellValue, CellError>,
{
    fn value_of(&self, cell: CellRef) -> Result<CellValue, CellError> {
        self(cell)
    }
}

/// Evaluate `expr`. A formula consisting of a single reference yields the
/// referenced value itself (text stays text); arithmetic requires numbers.
pub fn evaluate(expr: &Expr, source: &dyn ValueSource) -> Result<CellValue, CellError> {
    match expr {
        Expr::Reference(cell) => match source.value_of(*cell)? {
            CellValue::Empty => Ok(CellValue::Number(0.0)),
            CellValue::Error(e) => Err(e),
            value => Ok(value),
        },
        other => eval_number(other, source).map(CellValue::Number),
    }
}

fn eval_number(expr: &Expr, source: &dyn ValueSource) -> Result<f64, CellError> {
    match expr {
        Expr::Number(n) => Ok(*n),
        Expr::Reference(cell) => match source.value_of(*cell)? {
            CellValue::Empty => Ok(0.0),
            CellValue::Number(n) => Ok(n),
            CellValue::Text(_) => Err(CellError::TypeError),
            CellValue::Error(e) => Err(e),
        },
        Expr::Negate(inner) => Ok(-eval_number(inner, source)?),
        Expr::Binary { op, lhs, rhs } => {
            let l = eval_number(lhs, source)?;
            let r = eval_number(rhs, source)?;
            let n = match op {
                BinaryOp::Add => l + r,
                BinaryOp::Sub => l - r,
                BinaryOp::Mul => l * r,
                BinaryOp::Div => {
                    if r == 0.0 {
                        return Err(CellError::DivideByZero);
                    }
                    l / r
                }
            };
            // Overflow past f64 range shares the division error.
            if n.is_finite() {
                Ok(n)
            } else {
                Err(CellError::DivideByZero)
            }
        }
    }
}
