use super::support::{bakery, BakeryData};
use super::*;
use crate::problem::{SosMember, SosSet};
use crate::types::SosKind;

#[test]
fn test_bakery_is_consistent() {
    assert!(bakery().check().is_ok());
}

#[test]
fn test_unloaded_problem_fails_check() {
    let err = Problem::new("empty").check().unwrap_err();
    assert_eq!(err.issues, vec![Issue::NotLoaded]);
}

#[test]
fn test_inverted_bounds_are_reported() {
    let mut data = BakeryData::new();
    data.lower[1] = 10.0;
    data.upper[1] = 5.0;
    let mut problem = Problem::new("inverted");
    problem.load_matrix(data.input()).unwrap();

    let err = problem.check().unwrap_err();
    assert_eq!(
        err.issues,
        vec![Issue::ColumnBoundsInverted {
            column: 1,
            lower: 10.0,
            upper: 5.0
        }]
    );
}

#[test]
fn test_duplicate_names_are_reported() {
    let mut problem = Problem::new("dups");
    let data = BakeryData::new();
    problem.load_matrix(data.input()).unwrap();
    problem
        .load_names(Some(&["x", "x"][..]), Some(&["c1", "c2", "c1"][..]), None)
        .unwrap();

    let err = problem.check().unwrap_err();
    assert_eq!(err.issues.len(), 2);
    assert!(matches!(
        &err.issues[0],
        Issue::DuplicateName { kind: NameKind::Column, first: 0, second: 1, .. }
    ));
    assert!(matches!(
        &err.issues[1],
        Issue::DuplicateName { kind: NameKind::Row, first: 0, second: 2, .. }
    ));
}

#[test]
fn test_objective_name_clash_with_row() {
    let mut problem = bakery();
    problem
        .load_names::<&str>(None, None, Some("c2"))
        .unwrap();
    let err = problem.check().unwrap_err();
    assert_eq!(
        err.issues,
        vec![Issue::ObjectiveNameClash {
            name: "c2".to_string(),
            row: 1
        }]
    );
}

#[test]
fn test_check_does_not_mutate() {
    let mut data = BakeryData::new();
    data.lower[0] = 2.0e6;
    let mut problem = Problem::new("frozen");
    problem.load_matrix(data.input()).unwrap();
    let before = problem.clone();
    assert!(problem.check().is_err());
    assert_eq!(problem.column_lower(), before.column_lower());
    assert_eq!(problem.matrix(), before.matrix());
}

#[test]
fn test_semi_continuous_needs_finite_upper() {
    let mut data = BakeryData::new();
    data.upper[0] = 1e30;
    let mut problem = Problem::new("semi");
    problem.load_matrix(data.input()).unwrap();
    problem.load_semi_continuous(&[0, 1]).unwrap();
    let err = problem.check().unwrap_err();
    assert_eq!(err.issues, vec![Issue::SemiContinuousUnbounded { column: 0 }]);
}

#[test]
fn test_sos_duplicates_and_weights() {
    let mut problem = bakery();
    problem
        .load_sos(vec![SosSet::new(
            SosKind::Type2,
            vec![
                SosMember {
                    column: 0,
                    weight: 1.0,
                },
                SosMember {
                    column: 0,
                    weight: 1.0,
                },
            ],
        )])
        .unwrap();
    let err = problem.check().unwrap_err();
    assert_eq!(
        err.issues,
        vec![
            Issue::SosMemberDuplicated { set: 0, column: 0 },
            Issue::SosWeightsNotDistinct { set: 0 },
        ]
    );
    assert!(err.to_string().starts_with("[PROBLEM_INCONSISTENT] Problem check found 2 issue(s)"));
}
