//! Dense two-phase tableau simplex.
//!
//! Phase 1 minimizes the sum of artificial variables; phase 2 minimizes the
//! real cost with artificial columns barred from entering. Both reduced-cost
//! rows are updated on every pivot so phase 2 starts already canonical.

use mpsolve_solver::{CallbackControl, SolverError};

use crate::budget::Budget;
use crate::standard::{Relation, StandardForm};

/// Consecutive degenerate pivots before pricing falls back to Bland's rule.
pub(crate) const DEGENERATE_RUN_LIMIT: u32 = 50;

/// Smallest magnitude accepted as a pivot element.
const PIVOT_TOLERANCE: f64 = 1e-9;

/// Outcome of a tableau solve.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum TableauStatus {
    Optimal,
    Infeasible,
    Unbounded,
    Limit,
    Aborted,
}

/// Progress of one pivot, in tableau terms.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct Pivot {
    /// Pivots counted so far by the shared budget, this one included.
    pub(crate) iteration: u64,
    /// Current value of `cost·y`.
    pub(crate) objective: f64,
    pub(crate) phase_one: bool,
    /// Sum of artificial variables.
    pub(crate) infeasibility: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct TableauResult {
    pub(crate) status: TableauStatus,
    /// Values of the standard-form variables; empty unless optimal.
    pub(crate) y: Vec<f64>,
    /// Final `cost·y`.
    pub(crate) objective: f64,
}

impl TableauResult {
    fn with_status(status: TableauStatus) -> Self {
        Self {
            status,
            y: Vec::new(),
            objective: 0.0,
        }
    }
}

enum PhaseEnd {
    Optimal,
    Unbounded,
    Limit,
    Aborted,
}

pub(crate) struct Tableau {
    rows: Vec<Vec<f64>>,
    basis: Vec<usize>,
    cost: Vec<f64>,
    phase_one: Vec<f64>,
    num_structural: usize,
    first_artificial: usize,
    // Index of the right-hand side entry in every row.
    rhs: usize,
}

impl Tableau {
    pub(crate) fn new(form: &StandardForm) -> Self {
        let m = form.rows.len();
        let n = form.num_vars;

        // Rows with a negative right-hand side are negated first.
        let normalized: Vec<(f64, Relation)> = form
            .rows
            .iter()
            .map(|row| {
                if row.rhs < 0.0 {
                    (-1.0, row.relation.flipped())
                } else {
                    (1.0, row.relation)
                }
            })
            .collect();
        let num_slacks = normalized
            .iter()
            .filter(|(_, relation)| *relation != Relation::Equal)
            .count();
        let num_artificials = normalized
            .iter()
            .filter(|(_, relation)| *relation != Relation::LessEqual)
            .count();
        let first_artificial = n + num_slacks;
        let rhs = first_artificial + num_artificials;

        let mut rows = vec![vec![0.0; rhs + 1]; m];
        let mut basis = vec![0; m];
        let mut phase_one = vec![0.0; rhs + 1];
        let mut next_slack = n;
        let mut next_artificial = first_artificial;

        for (r, (row, &(factor, relation))) in form.rows.iter().zip(&normalized).enumerate() {
            let target = &mut rows[r];
            for &(var, a) in &row.coefficients {
                target[var] += factor * a;
            }
            target[rhs] = factor * row.rhs;
            match relation {
                Relation::LessEqual => {
                    target[next_slack] = 1.0;
                    basis[r] = next_slack;
                    next_slack += 1;
                }
                Relation::GreaterEqual => {
                    target[next_slack] = -1.0;
                    next_slack += 1;
                    target[next_artificial] = 1.0;
                    basis[r] = next_artificial;
                    next_artificial += 1;
                }
                Relation::Equal => {
                    target[next_artificial] = 1.0;
                    basis[r] = next_artificial;
                    next_artificial += 1;
                }
            }
            if basis[r] >= first_artificial {
                // Price out the basic artificial from the phase-1 row.
                for (w, &a) in phase_one.iter_mut().zip(target.iter()) {
                    *w -= a;
                }
                phase_one[basis[r]] = 0.0;
            }
        }

        let mut cost = vec![0.0; rhs + 1];
        cost[..n].copy_from_slice(&form.cost);

        Self {
            rows,
            basis,
            cost,
            phase_one,
            num_structural: n,
            first_artificial,
            rhs,
        }
    }

    /// Run both phases.
    ///
    /// `report` sees every counted pivot; an `Abort` ends the solve.
    pub(crate) fn solve(
        &mut self,
        tolerance: f64,
        budget: &mut Budget,
        report: &mut dyn FnMut(&Pivot) -> CallbackControl,
    ) -> Result<TableauResult, SolverError> {
        if self.first_artificial < self.rhs {
            match self.run_phase(true, tolerance, budget, report) {
                PhaseEnd::Optimal => {}
                PhaseEnd::Unbounded => {
                    return Err(SolverError::Numerical(
                        "phase one objective decreased without bound".to_string(),
                    ));
                }
                PhaseEnd::Limit => return Ok(TableauResult::with_status(TableauStatus::Limit)),
                PhaseEnd::Aborted => {
                    return Ok(TableauResult::with_status(TableauStatus::Aborted));
                }
            }
            if self.infeasibility() > tolerance {
                return Ok(TableauResult::with_status(TableauStatus::Infeasible));
            }
            self.drive_out_artificials();
        }

        let status = match self.run_phase(false, tolerance, budget, report) {
            PhaseEnd::Optimal => TableauStatus::Optimal,
            PhaseEnd::Unbounded => TableauStatus::Unbounded,
            PhaseEnd::Limit => TableauStatus::Limit,
            PhaseEnd::Aborted => TableauStatus::Aborted,
        };
        if status != TableauStatus::Optimal {
            return Ok(TableauResult::with_status(status));
        }

        let mut y = vec![0.0; self.num_structural];
        for (row, &var) in self.rows.iter().zip(&self.basis) {
            if var < self.num_structural {
                y[var] = row[self.rhs].max(0.0);
            }
        }
        Ok(TableauResult {
            status,
            y,
            objective: self.objective(),
        })
    }

    fn objective(&self) -> f64 {
        -self.cost[self.rhs]
    }

    fn infeasibility(&self) -> f64 {
        -self.phase_one[self.rhs]
    }

    fn run_phase(
        &mut self,
        phase_one: bool,
        tolerance: f64,
        budget: &mut Budget,
        report: &mut dyn FnMut(&Pivot) -> CallbackControl,
    ) -> PhaseEnd {
        let eligible = if phase_one {
            self.rhs
        } else {
            self.first_artificial
        };
        let mut degenerate_run = 0;
        let mut bland = false;

        loop {
            let Some(entering) = self.price(phase_one, eligible, tolerance, bland) else {
                return PhaseEnd::Optimal;
            };
            let Some((leaving, ratio)) = self.ratio_test(entering) else {
                return PhaseEnd::Unbounded;
            };
            if budget.exhausted() {
                return PhaseEnd::Limit;
            }

            if ratio <= tolerance {
                degenerate_run += 1;
                if degenerate_run >= DEGENERATE_RUN_LIMIT && !bland {
                    bland = true;
                    tracing::trace!(
                        component = "simplex",
                        operation = "pricing",
                        status = "success",
                        degenerate_run,
                        "Switched to Bland's rule"
                    );
                }
            } else {
                degenerate_run = 0;
            }

            self.pivot(leaving, entering);
            budget.count_iteration();

            let pivot = Pivot {
                iteration: budget.iterations(),
                objective: self.objective(),
                phase_one,
                infeasibility: if phase_one {
                    self.infeasibility().max(0.0)
                } else {
                    0.0
                },
            };
            if report(&pivot).is_abort() {
                return PhaseEnd::Aborted;
            }
        }
    }

    /// Choose the entering column: most negative reduced cost, or the lowest
    /// index with a negative reduced cost under Bland's rule.
    fn price(&self, phase_one: bool, eligible: usize, tolerance: f64, bland: bool) -> Option<usize> {
        let reduced = if phase_one {
            &self.phase_one
        } else {
            &self.cost
        };
        let mut best: Option<(usize, f64)> = None;
        for (column, &d) in reduced[..eligible].iter().enumerate() {
            if d >= -tolerance {
                continue;
            }
            if bland {
                return Some(column);
            }
            if best.is_none_or(|(_, best_d)| d < best_d) {
                best = Some((column, d));
            }
        }
        best.map(|(column, _)| column)
    }

    /// Minimum-ratio test; ties go to the lowest basic variable index.
    fn ratio_test(&self, entering: usize) -> Option<(usize, f64)> {
        let mut best: Option<(usize, f64)> = None;
        for (r, row) in self.rows.iter().enumerate() {
            let a = row[entering];
            if a <= PIVOT_TOLERANCE {
                continue;
            }
            let ratio = row[self.rhs].max(0.0) / a;
            let better = match best {
                None => true,
                Some((best_r, best_ratio)) => {
                    ratio < best_ratio
                        || (ratio == best_ratio && self.basis[r] < self.basis[best_r])
                }
            };
            if better {
                best = Some((r, ratio));
            }
        }
        best
    }

    fn pivot(&mut self, leaving: usize, entering: usize) {
        let element = self.rows[leaving][entering];
        for value in &mut self.rows[leaving] {
            *value /= element;
        }
        let pivot_row = self.rows[leaving].clone();

        for (r, row) in self.rows.iter_mut().enumerate() {
            if r != leaving {
                eliminate(row, &pivot_row, entering);
            }
        }
        eliminate(&mut self.cost, &pivot_row, entering);
        eliminate(&mut self.phase_one, &pivot_row, entering);
        self.basis[leaving] = entering;
    }

    /// Pivot zero-level artificials out of the basis after phase 1.
    ///
    /// A row whose non-artificial entries are all zero is redundant and keeps
    /// its artificial; phase 2 pivots never touch it.
    fn drive_out_artificials(&mut self) {
        for r in 0..self.rows.len() {
            if self.basis[r] < self.first_artificial {
                continue;
            }
            let replacement = self.rows[r][..self.first_artificial]
                .iter()
                .position(|a| a.abs() > PIVOT_TOLERANCE);
            if let Some(entering) = replacement {
                self.pivot(r, entering);
            }
        }
    }
}

fn eliminate(row: &mut [f64], pivot_row: &[f64], column: usize) {
    let factor = row[column];
    if factor == 0.0 {
        return;
    }
    for (value, &p) in row.iter_mut().zip(pivot_row) {
        *value -= factor * p;
    }
    row[column] = 0.0;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::standard::StandardRow;
    use crate::tests::support::bakery;

    fn form(cost: Vec<f64>, rows: Vec<StandardRow>) -> StandardForm {
        StandardForm::from_parts(cost, rows)
    }

    fn row(coefficients: &[(usize, f64)], relation: Relation, rhs: f64) -> StandardRow {
        StandardRow {
            coefficients: coefficients.to_vec(),
            relation,
            rhs,
        }
    }

    fn solve(form: &StandardForm) -> (TableauResult, Vec<Pivot>) {
        let mut pivots = Vec::new();
        let mut budget = Budget::unlimited();
        let result = Tableau::new(form)
            .solve(1e-9, &mut budget, &mut |pivot| {
                pivots.push(*pivot);
                CallbackControl::Continue
            })
            .unwrap();
        (result, pivots)
    }

    #[test]
    fn test_bakery_optimum() {
        let problem = bakery();
        let form =
            StandardForm::build(&problem, problem.column_lower(), problem.column_upper()).unwrap();
        let (result, pivots) = solve(&form);
        assert_eq!(result.status, TableauStatus::Optimal);
        assert!((form.user_objective(result.objective) - 506.666_667).abs() < 1e-3);
        assert!(pivots.iter().all(|pivot| !pivot.phase_one));
    }

    #[test]
    fn test_phase_one_reports_infeasibility() {
        // min x + y, x + y >= 2, x - y = 0
        let form = form(
            vec![1.0, 1.0],
            vec![
                row(&[(0, 1.0), (1, 1.0)], Relation::GreaterEqual, 2.0),
                row(&[(0, 1.0), (1, -1.0)], Relation::Equal, 0.0),
            ],
        );
        let (result, pivots) = solve(&form);
        assert_eq!(result.status, TableauStatus::Optimal);
        assert!((result.objective - 2.0).abs() < 1e-9);
        assert!((result.y[0] - 1.0).abs() < 1e-9);
        assert!((result.y[1] - 1.0).abs() < 1e-9);
        assert!(pivots[0].phase_one);
        assert!(pivots.iter().filter(|p| p.phase_one).all(|p| p.infeasibility >= 0.0));
    }

    #[test]
    fn test_infeasible_rows() {
        // x <= 1 and x >= 2
        let form = form(
            vec![1.0],
            vec![
                row(&[(0, 1.0)], Relation::LessEqual, 1.0),
                row(&[(0, 1.0)], Relation::GreaterEqual, 2.0),
            ],
        );
        let (result, _) = solve(&form);
        assert_eq!(result.status, TableauStatus::Infeasible);
        assert!(result.y.is_empty());
    }

    #[test]
    fn test_unbounded_direction() {
        // min -x, x - y <= 1
        let form = form(
            vec![-1.0, 0.0],
            vec![row(&[(0, 1.0), (1, -1.0)], Relation::LessEqual, 1.0)],
        );
        let (result, _) = solve(&form);
        assert_eq!(result.status, TableauStatus::Unbounded);
    }

    #[test]
    fn test_abort_stops_after_first_pivot() {
        let problem = bakery();
        let form =
            StandardForm::build(&problem, problem.column_lower(), problem.column_upper()).unwrap();
        let mut calls = 0;
        let mut budget = Budget::unlimited();
        let result = Tableau::new(&form)
            .solve(1e-9, &mut budget, &mut |_| {
                calls += 1;
                CallbackControl::Abort
            })
            .unwrap();
        assert_eq!(result.status, TableauStatus::Aborted);
        assert_eq!(calls, 1);
        assert_eq!(budget.iterations(), 1);
    }

    #[test]
    fn test_iteration_limit() {
        let problem = bakery();
        let form =
            StandardForm::build(&problem, problem.column_lower(), problem.column_upper()).unwrap();
        let mut budget = Budget::new(Some(1), None);
        let result = Tableau::new(&form)
            .solve(1e-9, &mut budget, &mut |_| CallbackControl::Continue)
            .unwrap();
        assert_eq!(result.status, TableauStatus::Limit);
        assert_eq!(budget.iterations(), 1);
    }

    #[test]
    fn test_redundant_equality_keeps_artificial() {
        // x + y = 2 stated twice; min x
        let form = form(
            vec![1.0, 0.0],
            vec![
                row(&[(0, 1.0), (1, 1.0)], Relation::Equal, 2.0),
                row(&[(0, 1.0), (1, 1.0)], Relation::Equal, 2.0),
            ],
        );
        let (result, _) = solve(&form);
        assert_eq!(result.status, TableauStatus::Optimal);
        assert!(result.objective.abs() < 1e-9);
        assert!((result.y[1] - 2.0).abs() < 1e-9);
    }
}
