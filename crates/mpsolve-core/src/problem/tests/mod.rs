#![allow(clippy::float_cmp)]

use super::*;

mod check_cases;
pub(super) mod support;

#[test]
fn test_new_problem_is_empty() {
    let problem = Problem::new("empty");
    assert_eq!(problem.name(), "empty");
    assert!(!problem.is_loaded());
    assert_eq!(problem.num_columns(), 0);
    assert_eq!(problem.num_rows(), 0);
    assert_eq!(problem.class(), ProblemClass::Linear);
    assert_eq!(problem.objective_name(), DEFAULT_OBJECTIVE_NAME);
}

#[test]
fn test_default_names_are_generated() {
    let problem = support::bakery();
    let mut unnamed = Problem::new("Bakery");
    let data = support::BakeryData::new();
    unnamed.load_matrix(data.input()).unwrap();

    assert_eq!(problem.column_name(0), "Sun");
    assert_eq!(unnamed.column_name(1), "C2");
    assert_eq!(unnamed.row_name(2), "R3");
    assert_eq!(unnamed.column_by_name("C2"), None);
}

#[test]
fn test_row_bounds_follow_row_type() {
    let problem = support::bakery();
    let bounds = problem.row_bounds(0).unwrap();
    assert_eq!(bounds.lower, f64::NEG_INFINITY);
    assert_eq!(bounds.upper, 1400.0);
    assert!(problem.row_bounds(3).is_none());
}

#[test]
fn test_objective_value_at_includes_constant() {
    let problem = support::bakery();
    let value = problem.objective_value_at(&[8000.0, 3000.0]);
    assert!((value - 506.666_666_67).abs() < 1e-6);
}

#[test]
fn test_integer_marker_makes_problem_mixed() {
    let mut problem = support::bakery();
    problem
        .load_column_types(&[ColumnType::Continuous, ColumnType::Continuous])
        .unwrap();
    assert_eq!(problem.num_integer_columns(), 0);
    assert_eq!(problem.class(), ProblemClass::Mixed);
}
