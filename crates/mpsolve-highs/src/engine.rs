//! [`Engine`] implementation backed by HiGHS.

use std::time::Instant;

use mpsolve_core::Problem;
use mpsolve_solver::{Engine, Solution, SolutionStatus, SolveEvents, SolverConfig, SolverError};
use tracing::{debug, warn};

use crate::ffi::{HighsModel, HighsModelError, HighsOption, HighsOutcome, highs_version};
use crate::status::{has_solution, solution_status};

const ENGINE_NAME: &str = "highs";

fn model_error(err: HighsModelError) -> SolverError {
    SolverError::InternalError(err.to_string())
}

/// HiGHS engine.
///
/// Handles LPs and MIPs with integer or binary columns. Semi-continuous
/// columns and SOS sets are rejected with [`SolverError::Unsupported`];
/// branching priorities are ignored. HiGHS runs to completion without
/// reporting per-iteration or per-node events, so only messages reach the
/// caller's callbacks.
#[derive(Debug, Clone, Copy, Default)]
pub struct HighsEngine;

impl HighsEngine {
    pub fn new() -> Self {
        Self
    }
}

impl Engine for HighsEngine {
    fn name(&self) -> &'static str {
        ENGINE_NAME
    }

    fn solve(
        &mut self,
        problem: &Problem,
        config: &SolverConfig,
        events: &mut dyn SolveEvents,
    ) -> Result<Solution, SolverError> {
        if !problem.is_loaded() {
            return Err(SolverError::NotLoaded);
        }
        config.validate()?;
        if !problem.semi_continuous().is_empty() {
            return Err(SolverError::Unsupported {
                engine: ENGINE_NAME,
                feature: "semi-continuous columns",
            });
        }
        if !problem.sos_sets().is_empty() {
            return Err(SolverError::Unsupported {
                engine: ENGINE_NAME,
                feature: "special ordered sets",
            });
        }
        if !problem.priorities().is_empty() {
            debug!(
                component = "highs",
                operation = "solve",
                status = "success",
                priorities = problem.priorities().len(),
                "Ignoring branching priorities"
            );
        }

        let started = Instant::now();
        let version = highs_version().unwrap_or_else(|| "unknown".to_string());
        let chatty = config.verbosity != Some(0);
        if chatty {
            let banner = format!(
                "{ENGINE_NAME} {version}: {} with {} columns, {} rows, {} nonzeros",
                problem.name(),
                problem.num_columns(),
                problem.num_rows(),
                problem.num_nonzeros()
            );
            if events.message(&banner).is_abort() {
                return Ok(Solution {
                    solve_time_seconds: started.elapsed().as_secs_f64(),
                    ..Solution::with_status(SolutionStatus::UserAbort)
                });
            }
        }

        let model = build_model(problem, config)?;
        let outcome = model.solve();
        let mut solution = into_solution(problem, outcome);
        solution.solve_time_seconds = started.elapsed().as_secs_f64();

        if solution.is_optimal() {
            debug!(
                component = "highs",
                operation = "solve",
                status = "success",
                solver_version = %version,
                objective_value = solution.objective_value,
                iterations = solution.iterations,
                nodes = solution.nodes,
                duration_ms = solution.solve_time_seconds * 1000.0,
                "Solve completed"
            );
        } else {
            warn!(
                component = "highs",
                operation = "solve",
                status = "warn",
                solver_version = %version,
                solver_status = solution.status.as_str(),
                duration_ms = solution.solve_time_seconds * 1000.0,
                "Solve did not reach optimality"
            );
        }
        if chatty {
            let _ = events.message(&format!("{ENGINE_NAME}: {}", solution.status.text()));
        }
        Ok(solution)
    }
}

fn build_model(problem: &Problem, config: &SolverConfig) -> Result<HighsModel, SolverError> {
    let mut model = HighsModel::new(problem.sense());
    apply_config(&mut model, config);

    let lower = problem.column_lower();
    let upper = problem.column_upper();
    for (column, &cost) in problem.objective().iter().enumerate() {
        model.add_column(lower[column], upper[column], cost, problem.is_integer(column));
    }
    for (row, entries) in problem.matrix().rows().into_iter().enumerate() {
        let bounds = problem
            .row_bounds(row)
            .ok_or_else(|| SolverError::InternalError(format!("row {row} has no bounds")))?;
        let (columns, coefficients): (Vec<usize>, Vec<f64>) = entries.into_iter().unzip();
        model
            .add_row(bounds.lower, bounds.upper, &columns, &coefficients)
            .map_err(model_error)?;
    }
    if let Some(values) = problem.initial_values() {
        model.set_primal_start(values.to_vec()).map_err(model_error)?;
    }

    debug!(
        component = "highs",
        operation = "build_model",
        status = "success",
        num_cols = model.num_columns(),
        num_rows = model.num_rows(),
        "Built HiGHS model"
    );
    Ok(model)
}

fn apply_config(model: &mut HighsModel, config: &SolverConfig) {
    model.set_log_to_console(config.log_to_console.unwrap_or(false));
    if let Some(level) = config.verbosity {
        model.set_verbosity(level);
    }
    if let Some(limit) = config.time_limit {
        model.set_option("time_limit", HighsOption::Float(limit));
    }
    if let Some(limit) = config.iteration_limit {
        model.set_option("simplex_iteration_limit", HighsOption::Int(clamp_int(limit)));
    }
    if let Some(limit) = config.node_limit {
        model.set_option("mip_max_nodes", HighsOption::Int(clamp_int(limit)));
    }
    if let Some(gap) = config.mip_gap {
        model.set_option("mip_rel_gap", HighsOption::Float(gap));
    }
    if let Some(tolerance) = config.tolerance {
        model.set_option("primal_feasibility_tolerance", HighsOption::Float(tolerance));
        model.set_option("dual_feasibility_tolerance", HighsOption::Float(tolerance));
    }
    if let Some(tolerance) = config.integer_tolerance {
        model.set_option("mip_feasibility_tolerance", HighsOption::Float(tolerance));
    }
}

fn clamp_int(value: u64) -> i32 {
    i32::try_from(value).unwrap_or(i32::MAX)
}

fn into_solution(problem: &Problem, outcome: HighsOutcome) -> Solution {
    let status = solution_status(outcome.status);
    let mut solution = Solution {
        status,
        iterations: outcome.simplex_iterations,
        nodes: outcome.mip_nodes,
        ..Solution::default()
    };
    if !has_solution(outcome.status) || outcome.col_values.len() != problem.num_columns() {
        return solution;
    }

    let constant = problem.objective_constant();
    solution.objective_value = outcome.objective_value + constant;
    solution.values = outcome.col_values;
    solution.row_activities = outcome.row_values;
    if outcome.is_mip {
        solution.best_bound = outcome.mip_dual_bound.map(|bound| bound + constant);
        solution.mip_gap = Some(outcome.mip_gap).filter(|gap| gap.is_finite());
    } else {
        solution.row_duals = Some(outcome.row_duals).filter(|d| d.len() == problem.num_rows());
        solution.reduced_costs =
            Some(outcome.col_duals).filter(|d| d.len() == problem.num_columns());
    }
    solution
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clamp_int() {
        assert_eq!(clamp_int(10), 10);
        assert_eq!(clamp_int(u64::MAX), i32::MAX);
    }

    #[test]
    fn test_not_loaded() {
        let err = HighsEngine::new()
            .solve(
                &Problem::new("empty"),
                &SolverConfig::new(),
                &mut mpsolve_solver::SilentEvents,
            )
            .unwrap_err();
        assert_eq!(err, SolverError::NotLoaded);
    }
}
