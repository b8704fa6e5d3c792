#![allow(clippy::float_cmp)]

use mpsolve_core::{MatrixInput, Problem, RowType, Sense, SosKind, SosMember, SosSet};
use mpsolve_highs::HighsEngine;
use mpsolve_solver::{
    CallbackControl, Engine, LpIterationEvent, MipNodeEvent, SolutionStatus, SolveEvents,
    SolverConfig, SolverError,
};

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_env_filter("mpsolve_highs=debug")
        .try_init();
}

fn bakery() -> Problem {
    let mut problem = Problem::new("Bakery");
    problem
        .load_matrix(MatrixInput {
            col_count: 2,
            row_count: 3,
            nonzero_count: 4,
            range_count: 0,
            sense: Sense::Maximize,
            objective_constant: -4000.0 / 30.0,
            objective: &[0.05, 0.08],
            lower_bounds: Some(&[0.0, 0.0]),
            upper_bounds: Some(&[1_000_000.0, 1_000_000.0]),
            row_types: &[RowType::LessEqual; 3],
            rhs: &[1400.0, 8000.0, 5000.0],
            ranges: None,
            begin: &[0, 2, 4],
            count: Some(&[2, 2]),
            index: &[0, 1, 0, 2],
            value: &[0.1, 1.0, 0.2, 1.0],
        })
        .unwrap();
    problem
}

#[derive(Default)]
struct Recorder {
    messages: Vec<String>,
    progress: usize,
    abort: bool,
}

impl SolveEvents for Recorder {
    fn message(&mut self, text: &str) -> CallbackControl {
        self.messages.push(text.to_string());
        if self.abort {
            CallbackControl::Abort
        } else {
            CallbackControl::Continue
        }
    }

    fn lp_iteration(&mut self, _event: &LpIterationEvent) -> CallbackControl {
        self.progress += 1;
        CallbackControl::Continue
    }

    fn mip_node(&mut self, _event: &MipNodeEvent) -> CallbackControl {
        self.progress += 1;
        CallbackControl::Continue
    }
}

#[test]
fn test_bakery_lp() {
    init_tracing();
    let mut recorder = Recorder::default();
    let solution = HighsEngine::new()
        .solve(&bakery(), &SolverConfig::new(), &mut recorder)
        .unwrap();

    assert_eq!(solution.status, SolutionStatus::Optimal);
    assert!((solution.objective_value - 506.666_667).abs() < 1e-3);
    assert!((solution.values[0] - 8000.0).abs() < 1e-6);
    assert!((solution.values[1] - 3000.0).abs() < 1e-6);
    assert_eq!(solution.row_activities.len(), 3);
    assert!(solution.row_duals.is_some());
    assert_eq!(recorder.progress, 0);
    assert!(!recorder.messages.is_empty());
}

#[test]
fn test_bakery_with_integer_column() {
    let mut problem = bakery();
    problem.load_column_type_codes("IC").unwrap();
    let solution = HighsEngine::new()
        .solve(&problem, &SolverConfig::new(), &mut Recorder::default())
        .unwrap();
    assert_eq!(solution.status, SolutionStatus::Optimal);
    assert!((solution.objective_value - 506.666_667).abs() < 1e-3);
    assert!(solution.row_duals.is_none());
}

#[test]
fn test_abort_from_message() {
    let mut recorder = Recorder {
        abort: true,
        ..Recorder::default()
    };
    let solution = HighsEngine::new()
        .solve(&bakery(), &SolverConfig::new(), &mut recorder)
        .unwrap();
    assert_eq!(solution.status, SolutionStatus::UserAbort);
    assert_eq!(recorder.messages.len(), 1);
}

#[test]
fn test_sos_is_unsupported() {
    let mut problem = bakery();
    problem
        .load_sos(vec![SosSet::new(
            SosKind::Type1,
            vec![
                SosMember {
                    column: 0,
                    weight: 1.0,
                },
                SosMember {
                    column: 1,
                    weight: 2.0,
                },
            ],
        )])
        .unwrap();
    let err = HighsEngine::new()
        .solve(&problem, &SolverConfig::new(), &mut Recorder::default())
        .unwrap_err();
    assert!(matches!(err, SolverError::Unsupported { engine: "highs", .. }));
    assert_eq!(err.code(), "SOLVER_UNSUPPORTED");
}

#[test]
fn test_infeasible() {
    let mut problem = Problem::new("infeasible");
    problem
        .load_matrix(MatrixInput {
            col_count: 1,
            row_count: 1,
            nonzero_count: 1,
            range_count: 0,
            sense: Sense::Minimize,
            objective_constant: 0.0,
            objective: &[1.0],
            lower_bounds: Some(&[0.0]),
            upper_bounds: Some(&[10.0]),
            row_types: &[RowType::GreaterEqual],
            rhs: &[20.0],
            ranges: None,
            begin: &[0, 1],
            count: None,
            index: &[0],
            value: &[1.0],
        })
        .unwrap();
    let solution = HighsEngine::new()
        .solve(&problem, &SolverConfig::new(), &mut Recorder::default())
        .unwrap();
    assert_eq!(solution.status, SolutionStatus::Infeasible);
    assert!(!solution.has_values());
}
