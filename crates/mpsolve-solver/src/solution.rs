//! Solution type.

use serde::Serialize;

use crate::SolutionStatus;

/// Result of a solve that ran to completion.
///
/// The objective value includes the objective constant and is expressed in
/// the problem's own sense. Vectors are empty when the engine found no point.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Solution {
    pub status: SolutionStatus,
    pub objective_value: f64,
    /// Primal value of every column.
    pub values: Vec<f64>,
    /// Constraint activity (row left-hand side) at `values`.
    pub row_activities: Vec<f64>,
    /// Shadow prices, when the engine computes them.
    pub row_duals: Option<Vec<f64>>,
    /// Column reduced costs, when the engine computes them.
    pub reduced_costs: Option<Vec<f64>>,
    pub iterations: u64,
    pub nodes: u64,
    /// Best proven bound on the objective (MIP only).
    pub best_bound: Option<f64>,
    /// Relative gap between incumbent and bound (MIP only).
    pub mip_gap: Option<f64>,
    pub solve_time_seconds: f64,
}

impl Solution {
    /// A solution with a status and nothing else.
    pub fn with_status(status: SolutionStatus) -> Self {
        Self {
            status,
            ..Self::default()
        }
    }

    pub fn is_optimal(&self) -> bool {
        self.status.is_optimal()
    }

    /// Whether primal values are available.
    pub fn has_values(&self) -> bool {
        !self.values.is_empty()
    }

    /// Get the primal value of a column.
    pub fn value(&self, column: usize) -> Option<f64> {
        self.values.get(column).copied()
    }

    /// Get the activity of a row.
    pub fn row_activity(&self, row: usize) -> Option<f64> {
        self.row_activities.get(row).copied()
    }

    /// Columns whose value is non-zero, in column order.
    pub fn nonzero_columns(&self) -> impl Iterator<Item = (usize, f64)> + '_ {
        self.values
            .iter()
            .copied()
            .enumerate()
            .filter(|(_, value)| *value != 0.0)
    }
}
