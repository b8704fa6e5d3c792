//! Standard-form transformation.
//!
//! A bounded problem `min/max c·x, lo <= A x <= hi, l <= x <= u` is rewritten
//! over non-negative variables `y` so the tableau only sees
//! `min c'·y, A' y {<=,>=,=} b, y >= 0`:
//!
//! - a finite lower bound shifts the column: `x = l + y`
//! - an upper bound alone negates it: `x = u - y`
//! - a free column splits: `x = y⁺ - y⁻`
//! - a finite upper bound on a shifted column becomes the row `y <= u - l`
//! - a row with two finite distinct sides becomes a `>=` row and a `<=` row

use mpsolve_core::Problem;

/// Relation of a standard-form row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Relation {
    LessEqual,
    GreaterEqual,
    Equal,
}

impl Relation {
    /// Relation after multiplying both sides by `-1`.
    pub(crate) fn flipped(self) -> Self {
        match self {
            Relation::LessEqual => Relation::GreaterEqual,
            Relation::GreaterEqual => Relation::LessEqual,
            Relation::Equal => Relation::Equal,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct StandardRow {
    pub(crate) coefficients: Vec<(usize, f64)>,
    pub(crate) relation: Relation,
    pub(crate) rhs: f64,
}

/// How an original column is recovered from the `y` variables.
#[derive(Debug, Clone, Copy, PartialEq)]
enum ColumnMap {
    Shifted { offset: f64, var: usize },
    Negated { offset: f64, var: usize },
    Split { positive: usize, negative: usize },
}

/// A problem restricted to given column bounds, in standard form.
///
/// The internal objective is `cost·y + cost_offset`, equal to the user
/// objective multiplied by the sense's minimization factor.
#[derive(Debug, Clone)]
pub(crate) struct StandardForm {
    pub(crate) num_vars: usize,
    pub(crate) cost: Vec<f64>,
    pub(crate) rows: Vec<StandardRow>,
    pub(crate) cost_offset: f64,
    sign: f64,
    columns: Vec<ColumnMap>,
}

impl StandardForm {
    /// Build the standard form over the column bounds `lower`/`upper`.
    ///
    /// Returns `None` when some column has `lower > upper`, which makes the
    /// restriction trivially infeasible.
    pub(crate) fn build(problem: &Problem, lower: &[f64], upper: &[f64]) -> Option<Self> {
        let sign = problem.sense().min_factor();
        let mut columns = Vec::with_capacity(problem.num_columns());
        let mut cost = Vec::with_capacity(problem.num_columns());
        let mut cost_offset = sign * problem.objective_constant();
        let mut bound_rows = Vec::new();

        for (column, &c) in problem.objective().iter().enumerate() {
            let (l, u) = (lower[column], upper[column]);
            if l > u {
                return None;
            }
            let c = sign * c;
            let map = if l.is_finite() {
                let var = cost.len();
                cost.push(c);
                cost_offset += c * l;
                if u.is_finite() {
                    bound_rows.push(StandardRow {
                        coefficients: vec![(var, 1.0)],
                        relation: Relation::LessEqual,
                        rhs: u - l,
                    });
                }
                ColumnMap::Shifted { offset: l, var }
            } else if u.is_finite() {
                let var = cost.len();
                cost.push(-c);
                cost_offset += c * u;
                ColumnMap::Negated { offset: u, var }
            } else {
                let positive = cost.len();
                cost.push(c);
                cost.push(-c);
                ColumnMap::Split {
                    positive,
                    negative: positive + 1,
                }
            };
            columns.push(map);
        }

        let mut rows = Vec::with_capacity(problem.num_rows() + bound_rows.len());
        for (row, entries) in problem.matrix().rows().into_iter().enumerate() {
            let Some(bounds) = problem.row_bounds(row) else {
                continue;
            };
            let mut coefficients = Vec::with_capacity(entries.len());
            let mut shift = 0.0;
            for (column, a) in entries {
                match columns[column] {
                    ColumnMap::Shifted { offset, var } => {
                        coefficients.push((var, a));
                        shift += a * offset;
                    }
                    ColumnMap::Negated { offset, var } => {
                        coefficients.push((var, -a));
                        shift += a * offset;
                    }
                    ColumnMap::Split { positive, negative } => {
                        coefficients.push((positive, a));
                        coefficients.push((negative, -a));
                    }
                }
            }
            let (lo, hi) = (bounds.lower - shift, bounds.upper - shift);
            if lo.is_finite() && hi.is_finite() && lo == hi {
                rows.push(StandardRow {
                    coefficients,
                    relation: Relation::Equal,
                    rhs: hi,
                });
                continue;
            }
            if lo.is_finite() {
                rows.push(StandardRow {
                    coefficients: coefficients.clone(),
                    relation: Relation::GreaterEqual,
                    rhs: lo,
                });
            }
            if hi.is_finite() {
                rows.push(StandardRow {
                    coefficients,
                    relation: Relation::LessEqual,
                    rhs: hi,
                });
            }
        }
        rows.extend(bound_rows);

        Some(Self {
            num_vars: cost.len(),
            cost,
            rows,
            cost_offset,
            sign,
            columns,
        })
    }

    /// Standard form over identity-mapped variables.
    #[cfg(test)]
    pub(crate) fn from_parts(cost: Vec<f64>, rows: Vec<StandardRow>) -> Self {
        let columns = (0..cost.len())
            .map(|var| ColumnMap::Shifted { offset: 0.0, var })
            .collect();
        Self {
            num_vars: cost.len(),
            cost,
            rows,
            cost_offset: 0.0,
            sign: 1.0,
            columns,
        }
    }

    /// Map `y` values back to original column values.
    pub(crate) fn recover(&self, y: &[f64]) -> Vec<f64> {
        self.columns
            .iter()
            .map(|map| match *map {
                ColumnMap::Shifted { offset, var } => offset + y[var],
                ColumnMap::Negated { offset, var } => offset - y[var],
                ColumnMap::Split { positive, negative } => y[positive] - y[negative],
            })
            .collect()
    }

    /// Convert a tableau objective `cost·y` into the user's objective.
    pub(crate) fn user_objective(&self, internal: f64) -> f64 {
        self.sign * (internal + self.cost_offset)
    }
}

#[cfg(test)]
#[allow(clippy::float_cmp)]
mod tests {
    use super::*;
    use crate::tests::support::{bakery, single_row};
    use mpsolve_core::RowType;

    #[test]
    fn test_bakery_shifts_and_bound_rows() {
        let problem = bakery();
        let form =
            StandardForm::build(&problem, problem.column_lower(), problem.column_upper()).unwrap();
        assert_eq!(form.num_vars, 2);
        // Three constraint rows plus two upper-bound rows.
        assert_eq!(form.rows.len(), 5);
        assert_eq!(form.cost, vec![-0.05, -0.08]);
        assert_eq!(form.rows[3].rhs, 1_000_000.0);
        assert_eq!(form.user_objective(-10.0), 10.0 - 4000.0 / 30.0);
    }

    #[test]
    fn test_free_and_negated_columns() {
        // x0 free, x1 <= 3, row: x0 + x1 in [1, 5]
        let problem = single_row(
            &[1.0, 2.0],
            &[f64::NEG_INFINITY, f64::NEG_INFINITY],
            &[f64::INFINITY, 3.0],
            RowType::Range,
            5.0,
            4.0,
        );
        let form =
            StandardForm::build(&problem, problem.column_lower(), problem.column_upper()).unwrap();
        assert_eq!(form.num_vars, 3);
        assert_eq!(form.cost, vec![1.0, -1.0, -2.0]);
        assert_eq!(form.cost_offset, 6.0);
        // Range row splits into >= and <=, both shifted by 3.
        assert_eq!(form.rows.len(), 2);
        assert_eq!(form.rows[0].relation, Relation::GreaterEqual);
        assert_eq!(form.rows[0].rhs, -2.0);
        assert_eq!(form.rows[1].relation, Relation::LessEqual);
        assert_eq!(form.rows[1].rhs, 2.0);
        assert_eq!(form.recover(&[4.0, 1.0, 0.5]), vec![3.0, 2.5]);
    }

    #[test]
    fn test_inverted_bounds_have_no_form() {
        let problem = bakery();
        assert!(StandardForm::build(&problem, &[2.0, 0.0], &[1.0, 5.0]).is_none());
    }
}
