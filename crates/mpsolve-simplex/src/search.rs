//! Depth-first branch-and-bound.
//!
//! Objective values inside the search are kept in minimization form
//! (user objective times the sense's minimization factor) so that pruning
//! and bound tracking never branch on the sense.

use mpsolve_core::Problem;
use mpsolve_solver::{CallbackControl, MipNodeEvent, SolutionStatus, SolveEvents, SolverError};
use tracing::{debug, trace};

use crate::branching::{BoundChange, BranchingSelector};
use crate::budget::Budget;
use crate::relaxation::{row_activities, solve_relaxation};
use crate::settings::Settings;
use crate::tableau::TableauStatus;

/// An open node: column bounds plus the bound inherited from its parent.
#[derive(Debug, Clone)]
struct SearchNode {
    lower: Vec<f64>,
    upper: Vec<f64>,
    /// Lower bound on the minimization objective in this subtree.
    dual_bound: f64,
    depth: usize,
}

impl SearchNode {
    fn root(lower: Vec<f64>, upper: Vec<f64>) -> Self {
        Self {
            lower,
            upper,
            dual_bound: f64::NEG_INFINITY,
            depth: 0,
        }
    }

    /// Child with the given bound changes; `None` when a domain empties.
    fn child(&self, changes: &[BoundChange], dual_bound: f64) -> Option<Self> {
        if changes.iter().any(BoundChange::is_infeasible) {
            return None;
        }
        let mut lower = self.lower.clone();
        let mut upper = self.upper.clone();
        for change in changes {
            lower[change.column] = change.lower;
            upper[change.column] = change.upper;
        }
        Some(Self {
            lower,
            upper,
            dual_bound,
            depth: self.depth + 1,
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Incumbent {
    pub(crate) values: Vec<f64>,
    /// User objective.
    pub(crate) objective: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct SearchOutcome {
    pub(crate) status: SolutionStatus,
    pub(crate) incumbent: Option<Incumbent>,
    pub(crate) nodes: u64,
    /// Best proven bound in user terms, when one exists.
    pub(crate) best_bound: Option<f64>,
}

pub(crate) struct BranchAndBound<'a> {
    problem: &'a Problem,
    settings: Settings,
    selector: BranchingSelector<'a>,
    sign: f64,
    incumbent: Option<Incumbent>,
    stack: Vec<SearchNode>,
    nodes: u64,
}

impl<'a> BranchAndBound<'a> {
    pub(crate) fn new(problem: &'a Problem, settings: Settings) -> Self {
        Self {
            problem,
            settings,
            selector: BranchingSelector::new(
                problem,
                settings.tolerance,
                settings.integer_tolerance,
            ),
            sign: problem.sense().min_factor(),
            incumbent: None,
            stack: Vec::new(),
            nodes: 0,
        }
    }

    pub(crate) fn run(
        mut self,
        budget: &mut Budget,
        events: &mut dyn SolveEvents,
    ) -> Result<SearchOutcome, SolverError> {
        let root_lower = self.selector.relaxed_lower();
        let root_upper = self.problem.column_upper().to_vec();
        self.incumbent = self.feasible_start(&root_lower, &root_upper);
        if let Some(start) = &self.incumbent {
            debug!(
                component = "simplex",
                operation = "branch_and_bound",
                status = "success",
                objective = start.objective,
                "Initial values accepted as incumbent"
            );
        }
        self.stack.push(SearchNode::root(root_lower, root_upper));

        let status = loop {
            let Some(node) = self.stack.pop() else {
                break if self.incumbent.is_some() {
                    SolutionStatus::Optimal
                } else {
                    SolutionStatus::Infeasible
                };
            };
            if self
                .settings
                .node_limit
                .is_some_and(|limit| self.nodes >= limit)
                || budget.exhausted()
            {
                self.stack.push(node);
                break SolutionStatus::Limit;
            }
            if node.dual_bound >= self.cutoff() {
                continue;
            }

            self.nodes += 1;
            let relaxation = solve_relaxation(
                self.problem,
                &node.lower,
                &node.upper,
                self.settings.tolerance,
                budget,
                &mut |_| CallbackControl::Continue,
            )?;

            let mut improved = false;
            match relaxation.status {
                TableauStatus::Optimal => {
                    let bound = self.sign * relaxation.objective;
                    if bound < self.cutoff() {
                        match self.selector.select(&relaxation.values, &node.lower, &node.upper) {
                            None => {
                                improved = self.accept(relaxation.values);
                            }
                            Some(decision) => {
                                trace!(
                                    component = "simplex",
                                    operation = "branch",
                                    status = "success",
                                    node = self.nodes,
                                    depth = node.depth,
                                    kind = decision.kind.as_str(),
                                    bound,
                                    "Branching"
                                );
                                // Second child goes under the first so the first is popped next.
                                if let Some(child) = node.child(&decision.second, bound) {
                                    self.stack.push(child);
                                }
                                if let Some(child) = node.child(&decision.first, bound) {
                                    self.stack.push(child);
                                }
                            }
                        }
                    }
                }
                TableauStatus::Infeasible => {}
                TableauStatus::Unbounded => {
                    let _ = self.report(events, budget, false);
                    break SolutionStatus::Unbounded;
                }
                TableauStatus::Limit | TableauStatus::Aborted => {
                    self.stack.push(node);
                    break SolutionStatus::Limit;
                }
            }

            if self.report(events, budget, improved).is_abort() {
                break SolutionStatus::UserAbort;
            }
        };

        let best_bound = match status {
            SolutionStatus::Unbounded => None,
            _ => Some(self.sign * self.best_bound()).filter(|bound| bound.is_finite()),
        };
        debug!(
            component = "simplex",
            operation = "branch_and_bound",
            status = "success",
            result = status.as_str(),
            nodes = self.nodes,
            iterations = budget.iterations(),
            open_nodes = self.stack.len(),
            has_incumbent = self.incumbent.is_some(),
            "Branch-and-bound finished"
        );
        Ok(SearchOutcome {
            status,
            incumbent: self.incumbent,
            nodes: self.nodes,
            best_bound,
        })
    }

    fn report(
        &self,
        events: &mut dyn SolveEvents,
        budget: &Budget,
        is_improved: bool,
    ) -> CallbackControl {
        let best_integer = self
            .incumbent
            .as_ref()
            .map_or(self.sign * f64::INFINITY, |incumbent| incumbent.objective);
        events.mip_node(&MipNodeEvent {
            iteration: budget.iterations(),
            node: self.nodes,
            best_bound: self.sign * self.best_bound(),
            best_integer,
            is_improved,
        })
    }

    /// Minimization value at or above which a node cannot improve the incumbent.
    fn cutoff(&self) -> f64 {
        match &self.incumbent {
            Some(incumbent) => {
                let value = self.sign * incumbent.objective;
                value - (self.settings.mip_gap * value.abs()).max(1e-9)
            }
            None => f64::INFINITY,
        }
    }

    /// Smallest minimization bound over open nodes and the incumbent.
    fn best_bound(&self) -> f64 {
        let open = self
            .stack
            .iter()
            .map(|node| node.dual_bound)
            .fold(f64::INFINITY, f64::min);
        match &self.incumbent {
            Some(incumbent) => open.min(self.sign * incumbent.objective),
            None => open,
        }
    }

    /// Record a feasible point if it beats the incumbent.
    fn accept(&mut self, mut values: Vec<f64>) -> bool {
        for (column, value) in values.iter_mut().enumerate() {
            if self.problem.is_integer(column) {
                *value = value.round();
            }
        }
        let objective = self.problem.objective_value_at(&values);
        let better = self
            .incumbent
            .as_ref()
            .is_none_or(|current| self.sign * objective < self.sign * current.objective);
        if better {
            trace!(
                component = "simplex",
                operation = "incumbent",
                status = "success",
                node = self.nodes,
                objective,
                "New incumbent"
            );
            self.incumbent = Some(Incumbent { values, objective });
        }
        better
    }

    /// Initial values, when they satisfy every constraint.
    fn feasible_start(&self, lower: &[f64], upper: &[f64]) -> Option<Incumbent> {
        let values = self.problem.initial_values()?;
        let tolerance = self.settings.tolerance;
        let in_bounds = values
            .iter()
            .zip(lower.iter().zip(upper))
            .all(|(&x, (&l, &u))| x >= l - tolerance && x <= u + tolerance);
        let rows_hold = row_activities(self.problem, values)
            .iter()
            .enumerate()
            .all(|(row, &activity)| {
                self.problem
                    .row_bounds(row)
                    .is_some_and(|bounds| bounds.contains(activity, tolerance))
            });
        if !in_bounds || !rows_hold || self.selector.select(values, lower, upper).is_some() {
            return None;
        }
        Some(Incumbent {
            values: values.to_vec(),
            objective: self.problem.objective_value_at(values),
        })
    }
}

#[cfg(test)]
#[allow(clippy::float_cmp)]
mod tests {
    use super::*;
    use crate::tests::support::{bakery, knapsack, single_row};
    use mpsolve_core::{ColumnType, RowType};
    use mpsolve_solver::{LpIterationEvent, SilentEvents};

    fn settings() -> Settings {
        Settings::from_config(&mpsolve_solver::SolverConfig::new())
    }

    /// Records node events; fails the test on any LP iteration event.
    #[derive(Default)]
    struct NodeRecorder {
        nodes: Vec<MipNodeEvent>,
    }

    impl SolveEvents for NodeRecorder {
        fn message(&mut self, _text: &str) -> CallbackControl {
            CallbackControl::Continue
        }

        fn lp_iteration(&mut self, _event: &LpIterationEvent) -> CallbackControl {
            panic!("LP iteration reported during branch-and-bound");
        }

        fn mip_node(&mut self, event: &MipNodeEvent) -> CallbackControl {
            self.nodes.push(*event);
            CallbackControl::Continue
        }
    }

    #[test]
    fn test_integer_bakery_needs_no_branching() {
        let mut problem = bakery();
        problem
            .load_column_types(&[ColumnType::Integer, ColumnType::Continuous])
            .unwrap();
        let mut recorder = NodeRecorder::default();
        let mut budget = Budget::unlimited();
        let outcome = BranchAndBound::new(&problem, settings())
            .run(&mut budget, &mut recorder)
            .unwrap();
        assert_eq!(outcome.status, SolutionStatus::Optimal);
        let incumbent = outcome.incumbent.unwrap();
        assert!((incumbent.objective - 506.666_667).abs() < 1e-3);
        assert_eq!(outcome.nodes, 1);
        assert_eq!(recorder.nodes.len(), 1);
        assert!(recorder.nodes[0].is_improved);
    }

    #[test]
    fn test_knapsack_branches_to_integer_optimum() {
        let problem = knapsack();
        let mut recorder = NodeRecorder::default();
        let mut budget = Budget::unlimited();
        let outcome = BranchAndBound::new(&problem, settings())
            .run(&mut budget, &mut recorder)
            .unwrap();
        assert_eq!(outcome.status, SolutionStatus::Optimal);
        let incumbent = outcome.incumbent.unwrap();
        assert_eq!(incumbent.values, vec![1.0, 1.0, 0.0]);
        assert_eq!(incumbent.objective, 9.0);
        assert_eq!(outcome.best_bound, Some(9.0));
        assert!(outcome.nodes > 1);
        // Maximization: no incumbent reads as negative infinity.
        assert_eq!(recorder.nodes[0].best_integer, f64::NEG_INFINITY);
        assert!(recorder.nodes[0].best_bound > 10.6);
    }

    #[test]
    fn test_fractional_row_forces_branching() {
        // min -x, x integer, x <= 2.5 -> x = 2
        let mut problem = single_row(
            &[-1.0],
            &[0.0],
            &[10.0],
            RowType::LessEqual,
            2.5,
            0.0,
        );
        problem.load_column_types(&[ColumnType::Integer]).unwrap();
        let mut recorder = NodeRecorder::default();
        let mut budget = Budget::unlimited();
        let outcome = BranchAndBound::new(&problem, settings())
            .run(&mut budget, &mut recorder)
            .unwrap();
        assert_eq!(outcome.status, SolutionStatus::Optimal);
        assert_eq!(outcome.incumbent.unwrap().values, vec![2.0]);
        assert!(outcome.nodes >= 2);
        assert_eq!(recorder.nodes.len() as u64, outcome.nodes);
        assert_eq!(recorder.nodes[0].best_integer, f64::INFINITY);
        assert!(recorder.nodes.iter().any(|event| event.is_improved));
    }

    #[test]
    fn test_integer_infeasible() {
        // 0.2 <= x <= 0.8 with x integer
        let mut problem = single_row(
            &[1.0],
            &[0.2],
            &[0.8],
            RowType::GreaterEqual,
            0.0,
            0.0,
        );
        problem.load_column_types(&[ColumnType::Integer]).unwrap();
        let mut budget = Budget::unlimited();
        let outcome = BranchAndBound::new(&problem, settings())
            .run(&mut budget, &mut SilentEvents)
            .unwrap();
        assert_eq!(outcome.status, SolutionStatus::Infeasible);
        assert!(outcome.incumbent.is_none());
        assert_eq!(outcome.best_bound, None);
    }

    #[test]
    fn test_node_limit_stops_search() {
        let mut problem = single_row(
            &[-1.0],
            &[0.0],
            &[10.0],
            RowType::LessEqual,
            2.5,
            0.0,
        );
        problem.load_column_types(&[ColumnType::Integer]).unwrap();
        let mut limited = settings();
        limited.node_limit = Some(1);
        let mut budget = Budget::unlimited();
        let outcome = BranchAndBound::new(&problem, limited)
            .run(&mut budget, &mut SilentEvents)
            .unwrap();
        assert_eq!(outcome.status, SolutionStatus::Limit);
        assert_eq!(outcome.nodes, 1);
        assert_eq!(outcome.best_bound, Some(-2.5));
    }

    #[test]
    fn test_feasible_initial_values_seed_incumbent() {
        let mut problem = single_row(
            &[-1.0],
            &[0.0],
            &[10.0],
            RowType::LessEqual,
            2.5,
            0.0,
        );
        problem.load_column_types(&[ColumnType::Integer]).unwrap();
        problem.load_initial_values(&[2.0]).unwrap();
        let mut recorder = NodeRecorder::default();
        let mut budget = Budget::unlimited();
        let outcome = BranchAndBound::new(&problem, settings())
            .run(&mut budget, &mut recorder)
            .unwrap();
        assert_eq!(outcome.status, SolutionStatus::Optimal);
        assert_eq!(recorder.nodes[0].best_integer, -2.0);
        assert!(recorder.nodes.iter().all(|event| !event.is_improved));
    }
}
