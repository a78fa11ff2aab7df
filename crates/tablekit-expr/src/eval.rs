use crate::ast::{BinOp, Expr};
use tablekit_common::{Cell, TableError, TableResult};

/// Evaluates a parsed expression against one row. `columns` gives the
/// name-to-index mapping for the table the row came from; an identifier
/// not present in `columns` is a `SchemaError` naming the available set,
/// matching how every other operator reports a missing column.
pub struct Evaluator<'a> {
    columns: &'a [String],
}

impl<'a> Evaluator<'a> {
    pub fn new(columns: &'a [String]) -> Self {
        Self { columns }
    }

    pub fn eval(&self, expr: &Expr, row: &[Cell]) -> TableResult<Cell> {
        match expr {
            Expr::Number(n) => Ok(Cell::Float(*n)),
            Expr::Str(s) => Ok(Cell::Text(s.clone())),
            Expr::Column(name) => {
                let idx = self.columns.iter().position(|c| c == name).ok_or_else(|| {
                    TableError::schema("transform", name.clone(), self.columns)
                })?;
                Ok(row[idx].clone())
            }
            Expr::Not(inner) => {
                let v = self.eval(inner, row)?;
                Ok(Cell::Bool(!v.is_truthy()))
            }
            Expr::Neg(inner) => {
                let v = self.eval(inner, row)?;
                let n = v
                    .as_f64()
                    .ok_or_else(|| TableError::compute(format!("cannot negate {:?}", v)))?;
                Ok(Cell::Float(-n))
            }
            Expr::Binary(lhs, op, rhs) => self.eval_binary(lhs, *op, rhs, row),
        }
    }

    fn eval_binary(
        &self,
        lhs: &Expr,
        op: BinOp,
        rhs: &Expr,
        row: &[Cell],
    ) -> TableResult<Cell> {
        match op {
            BinOp::And => {
                let l = self.eval(lhs, row)?;
                if !l.is_truthy() {
                    return Ok(Cell::Bool(false));
                }
                let r = self.eval(rhs, row)?;
                return Ok(Cell::Bool(r.is_truthy()));
            }
            BinOp::Or => {
                let l = self.eval(lhs, row)?;
                if l.is_truthy() {
                    return Ok(Cell::Bool(true));
                }
                let r = self.eval(rhs, row)?;
                return Ok(Cell::Bool(r.is_truthy()));
            }
            _ => {}
        }

        let l = self.eval(lhs, row)?;
        let r = self.eval(rhs, row)?;

        match op {
            BinOp::Add | BinOp::Sub | BinOp::Mul | BinOp::Div => {
                let (a, b) = self.numeric_pair(&l, &r)?;
                let result = match op {
                    BinOp::Add => a + b,
                    BinOp::Sub => a - b,
                    BinOp::Mul => a * b,
                    BinOp::Div => {
                        if b == 0.0 {
                            return Err(TableError::compute("division by zero"));
                        }
                        a / b
                    }
                    _ => unreachable!(),
                };
                Ok(Cell::Float(result))
            }
            BinOp::Eq | BinOp::Ne | BinOp::Lt | BinOp::Le | BinOp::Gt | BinOp::Ge => {
                let ordering = self.compare(&l, &r);
                let truth = match op {
                    BinOp::Eq => ordering == Some(std::cmp::Ordering::Equal),
                    BinOp::Ne => ordering != Some(std::cmp::Ordering::Equal),
                    BinOp::Lt => ordering == Some(std::cmp::Ordering::Less),
                    BinOp::Le => matches!(
                        ordering,
                        Some(std::cmp::Ordering::Less) | Some(std::cmp::Ordering::Equal)
                    ),
                    BinOp::Gt => ordering == Some(std::cmp::Ordering::Greater),
                    BinOp::Ge => matches!(
                        ordering,
                        Some(std::cmp::Ordering::Greater) | Some(std::cmp::Ordering::Equal)
                    ),
                    _ => unreachable!(),
                };
                Ok(Cell::Bool(truth))
            }
            BinOp::And | BinOp::Or => unreachable!("handled above"),
        }
    }

    fn numeric_pair(&self, l: &Cell, r: &Cell) -> TableResult<(f64, f64)> {
        let a = l
            .as_f64()
            .ok_or_else(|| TableError::compute(format!("'{l}' is not numeric")))?;
        let b = r
            .as_f64()
            .ok_or_else(|| TableError::compute(format!("'{r}' is not numeric")))?;
        Ok((a, b))
    }

    /// Numeric comparison when both sides coerce, otherwise a text
    /// comparison — mirrors the permissive coercion the rest of the
    /// engine applies for join/vlookup/reconcile keys.
    fn compare(&self, l: &Cell, r: &Cell) -> Option<std::cmp::Ordering> {
        match (l.as_f64(), r.as_f64()) {
            (Some(a), Some(b)) => a.partial_cmp(&b),
            _ => Some(l.as_key_text().cmp(&r.as_key_text())),
        }
    }
}
