//! The built-in engine.

use std::time::Instant;

use mpsolve_core::{Problem, ProblemClass};
use mpsolve_solver::{Engine, Solution, SolutionStatus, SolveEvents, SolverConfig, SolverError};
use tracing::{debug, warn};

use crate::budget::Budget;
use crate::relaxation::{row_activities, solve_relaxation};
use crate::search::BranchAndBound;
use crate::settings::Settings;
use crate::tableau::TableauStatus;

const ENGINE_NAME: &str = "simplex";

/// Dense two-phase simplex with depth-first branch-and-bound.
///
/// Linear problems report one LP-iteration event per pivot. Problems that
/// carry any MIP annotation are solved by branch-and-bound and report one
/// MIP-node event per explored node instead; their LP relaxations stay
/// silent. Row duals and reduced costs are not computed.
#[derive(Debug, Clone, Copy, Default)]
pub struct SimplexEngine;

impl SimplexEngine {
    pub fn new() -> Self {
        Self
    }
}

impl Engine for SimplexEngine {
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

        let started = Instant::now();
        let settings = Settings::from_config(config);
        let mut budget = Budget::new(settings.iteration_limit, settings.time_limit);
        let class = problem.class();
        let chatty = config.verbosity != Some(0);

        debug!(
            component = "simplex",
            operation = "solve",
            status = "success",
            problem = %problem.name(),
            class = class.as_str(),
            columns = problem.num_columns(),
            rows = problem.num_rows(),
            nonzeros = problem.num_nonzeros(),
            "Starting solve"
        );
        if chatty {
            let banner = format!(
                "{ENGINE_NAME}: {} with {} columns, {} rows, {} nonzeros ({})",
                problem.name(),
                problem.num_columns(),
                problem.num_rows(),
                problem.num_nonzeros(),
                class.as_str()
            );
            if events.message(&banner).is_abort() {
                return Ok(Solution {
                    solve_time_seconds: started.elapsed().as_secs_f64(),
                    ..Solution::with_status(SolutionStatus::UserAbort)
                });
            }
        }

        let mut solution = match class {
            ProblemClass::Linear => solve_linear(problem, &settings, &mut budget, events)?,
            ProblemClass::Mixed => solve_mixed(problem, settings, &mut budget, events)?,
        };
        solution.iterations = budget.iterations();
        solution.solve_time_seconds = started.elapsed().as_secs_f64();

        if solution.is_optimal() {
            debug!(
                component = "simplex",
                operation = "solve",
                status = "success",
                problem = %problem.name(),
                objective_value = solution.objective_value,
                iterations = solution.iterations,
                nodes = solution.nodes,
                duration_ms = solution.solve_time_seconds * 1000.0,
                "Solve completed"
            );
        } else {
            warn!(
                component = "simplex",
                operation = "solve",
                status = "warn",
                problem = %problem.name(),
                solver_status = solution.status.as_str(),
                iterations = solution.iterations,
                nodes = solution.nodes,
                duration_ms = solution.solve_time_seconds * 1000.0,
                "Solve did not reach optimality"
            );
        }
        if chatty && solution.status != SolutionStatus::UserAbort {
            let summary = format!(
                "{ENGINE_NAME}: {} after {} iterations",
                solution.status.text(),
                solution.iterations
            );
            // The solve is over; an abort here has nothing left to stop.
            let _ = events.message(&summary);
        }
        Ok(solution)
    }
}

fn solve_linear(
    problem: &Problem,
    settings: &Settings,
    budget: &mut Budget,
    events: &mut dyn SolveEvents,
) -> Result<Solution, SolverError> {
    let relaxation = solve_relaxation(
        problem,
        problem.column_lower(),
        problem.column_upper(),
        settings.tolerance,
        budget,
        &mut |event| events.lp_iteration(event),
    )?;
    let status = match relaxation.status {
        TableauStatus::Optimal => SolutionStatus::Optimal,
        TableauStatus::Infeasible => SolutionStatus::Infeasible,
        TableauStatus::Unbounded => SolutionStatus::Unbounded,
        TableauStatus::Limit => SolutionStatus::Limit,
        TableauStatus::Aborted => SolutionStatus::UserAbort,
    };
    if !relaxation.is_optimal() {
        return Ok(Solution::with_status(status));
    }
    Ok(Solution {
        status,
        objective_value: relaxation.objective,
        row_activities: row_activities(problem, &relaxation.values),
        values: relaxation.values,
        ..Solution::default()
    })
}

fn solve_mixed(
    problem: &Problem,
    settings: Settings,
    budget: &mut Budget,
    events: &mut dyn SolveEvents,
) -> Result<Solution, SolverError> {
    let outcome = BranchAndBound::new(problem, settings).run(budget, events)?;
    let mut solution = Solution {
        status: outcome.status,
        nodes: outcome.nodes,
        best_bound: outcome.best_bound,
        ..Solution::default()
    };
    if let Some(incumbent) = outcome.incumbent {
        solution.mip_gap = outcome
            .best_bound
            .map(|bound| relative_gap(incumbent.objective, bound));
        solution.objective_value = incumbent.objective;
        solution.row_activities = row_activities(problem, &incumbent.values);
        solution.values = incumbent.values;
    }
    Ok(solution)
}

fn relative_gap(incumbent: f64, bound: f64) -> f64 {
    (incumbent - bound).abs() / incumbent.abs().max(1e-10)
}

#[cfg(test)]
#[allow(clippy::float_cmp)]
mod tests {
    use super::*;
    use crate::tests::support::bakery;
    use mpsolve_solver::SilentEvents;

    #[test]
    fn test_relative_gap() {
        assert_eq!(relative_gap(10.0, 10.0), 0.0);
        assert_eq!(relative_gap(10.0, 12.0), 0.2);
        assert!(relative_gap(0.0, 1.0) > 1e9);
    }

    #[test]
    fn test_unloaded_problem_is_call_error() {
        let err = SimplexEngine::new()
            .solve(&Problem::new("empty"), &SolverConfig::new(), &mut SilentEvents)
            .unwrap_err();
        assert_eq!(err, SolverError::NotLoaded);
    }

    #[test]
    fn test_invalid_config_is_call_error() {
        let err = SimplexEngine::new()
            .solve(
                &bakery(),
                &SolverConfig::new().with_mip_gap(-1.0),
                &mut SilentEvents,
            )
            .unwrap_err();
        assert_eq!(err.code(), "CONFIG_INVALID");
    }

    #[test]
    fn test_bakery_solution_fields() {
        let solution = SimplexEngine::new()
            .solve(&bakery(), &SolverConfig::new(), &mut SilentEvents)
            .unwrap();
        assert!(solution.is_optimal());
        assert!((solution.objective_value - 506.666_667).abs() < 1e-3);
        assert_eq!(solution.values.len(), 2);
        assert_eq!(solution.row_activities.len(), 3);
        assert!(solution.iterations > 0);
        assert_eq!(solution.nodes, 0);
        assert!(solution.row_duals.is_none());
        assert!(solution.best_bound.is_none());
    }
}
