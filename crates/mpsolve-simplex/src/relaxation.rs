//! LP solve of a problem restricted to given column bounds.

use mpsolve_core::Problem;
use mpsolve_solver::{CallbackControl, LpIterationEvent, SolverError};

use crate::budget::Budget;
use crate::standard::StandardForm;
use crate::tableau::{Pivot, Tableau, TableauStatus};

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Relaxation {
    pub(crate) status: TableauStatus,
    /// Column values; empty unless optimal.
    pub(crate) values: Vec<f64>,
    /// User objective at `values`, including the constant.
    pub(crate) objective: f64,
}

impl Relaxation {
    fn with_status(status: TableauStatus) -> Self {
        Self {
            status,
            values: Vec::new(),
            objective: 0.0,
        }
    }

    pub(crate) fn is_optimal(&self) -> bool {
        self.status == TableauStatus::Optimal
    }
}

/// Solve the LP over `lower`/`upper`, reporting every pivot to `on_iteration`.
pub(crate) fn solve_relaxation(
    problem: &Problem,
    lower: &[f64],
    upper: &[f64],
    tolerance: f64,
    budget: &mut Budget,
    on_iteration: &mut dyn FnMut(&LpIterationEvent) -> CallbackControl,
) -> Result<Relaxation, SolverError> {
    let Some(form) = StandardForm::build(problem, lower, upper) else {
        return Ok(Relaxation::with_status(TableauStatus::Infeasible));
    };

    let mut report = |pivot: &Pivot| {
        on_iteration(&LpIterationEvent {
            iteration: pivot.iteration,
            objective_value: form.user_objective(pivot.objective),
            is_feasible: !pivot.phase_one,
            infeasibility: pivot.infeasibility,
        })
    };
    let result = Tableau::new(&form).solve(tolerance, budget, &mut report)?;
    if result.status != TableauStatus::Optimal {
        return Ok(Relaxation::with_status(result.status));
    }

    let values = form.recover(&result.y);
    Ok(Relaxation {
        status: result.status,
        objective: problem.objective_value_at(&values),
        values,
    })
}

/// Activity of every row at `values`.
pub(crate) fn row_activities(problem: &Problem, values: &[f64]) -> Vec<f64> {
    let matrix = problem.matrix();
    let mut activities = vec![0.0; problem.num_rows()];
    for (column, &x) in values.iter().enumerate() {
        if x == 0.0 {
            continue;
        }
        for (row, a) in matrix.column(column) {
            activities[row] += a * x;
        }
    }
    activities
}
