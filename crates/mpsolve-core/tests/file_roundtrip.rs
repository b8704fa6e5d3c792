#![allow(clippy::float_cmp)]

use std::path::PathBuf;

use mpsolve_core::format::{self, FileFormat};
use mpsolve_core::{
    ColumnType, MatrixInput, Problem, RowType, Sense, SosKind, SosMember, SosSet,
};

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_env_filter("mpsolve_core=debug")
        .try_init();
}

fn temp_path(name: &str) -> PathBuf {
    std::env::temp_dir().join(format!("mpsolve-core-{}-{}", std::process::id(), name))
}

/// Bakery LP with names, as loaded by callers of the solver API.
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
        .load_names(
            Some(&["Sun", "Moon"][..]),
            Some(&["c1", "c2", "c3"][..]),
            Some("Profit"),
        )
        .unwrap();
    problem
}

fn assert_equivalent(left: &Problem, right: &Problem) {
    assert_eq!(left.name(), right.name());
    assert_eq!(left.sense(), right.sense());
    assert_eq!(left.objective_constant(), right.objective_constant());
    assert_eq!(left.objective(), right.objective());
    assert_eq!(left.column_lower(), right.column_lower());
    assert_eq!(left.column_upper(), right.column_upper());
    assert_eq!(left.matrix(), right.matrix());
    for column in 0..left.num_columns() {
        assert_eq!(left.column_name(column), right.column_name(column));
    }
    for row in 0..left.num_rows() {
        assert_eq!(left.row_name(row), right.row_name(row));
    }
    assert_eq!(left.objective_name(), right.objective_name());
    for row in 0..left.num_rows() {
        assert_eq!(left.row_bounds(row), right.row_bounds(row), "row {row}");
    }
}

#[test]
fn test_bakery_mps_roundtrip_both_layouts() {
    init_tracing();
    let original = bakery();
    for (format, file) in [
        (FileFormat::Mps, "bakery.mps"),
        (FileFormat::FreeMps, "bakery-free.mps"),
    ] {
        let path = temp_path(file);
        format::write_file(&original, format, &path).unwrap();
        let restored = format::read_file(&path, format).unwrap();
        std::fs::remove_file(&path).ok();

        assert_equivalent(&original, &restored);
        assert_eq!(restored.row_types(), &[RowType::LessEqual; 3]);
        assert!(restored.check().is_ok());
    }
}

#[test]
fn test_mip_annotations_roundtrip() {
    init_tracing();
    let mut original = Problem::new("annotated");
    original
        .load_matrix(MatrixInput {
            col_count: 4,
            row_count: 2,
            nonzero_count: 5,
            range_count: 1,
            sense: Sense::Minimize,
            objective_constant: 3.0,
            objective: &[1.0, 2.0, 0.0, -1.0],
            lower_bounds: Some(&[0.0, -5.0, 0.0, 1.0]),
            upper_bounds: Some(&[1.0, 5.0, 8.0, 6.0]),
            row_types: &[RowType::Range, RowType::GreaterEqual],
            rhs: &[10.0, 1.0],
            ranges: Some(&[4.0, 0.0]),
            begin: &[0, 2, 3, 4, 5],
            count: None,
            index: &[0, 1, 0, 1, 0],
            value: &[1.0, 1.0, 2.0, 3.0, 1.5],
        })
        .unwrap();
    original.load_column_type_codes("BICC").unwrap();
    original.load_semi_continuous(&[3]).unwrap();
    original
        .load_sos(vec![SosSet {
            kind: SosKind::Type2,
            priority: 4,
            members: vec![
                SosMember {
                    column: 1,
                    weight: 1.0,
                },
                SosMember {
                    column: 2,
                    weight: 2.0,
                },
            ],
        }])
        .unwrap();

    let path = temp_path("annotated.mps");
    format::write_file(&original, FileFormat::Mps, &path).unwrap();
    let restored = format::read_file(&path, FileFormat::Mps).unwrap();
    std::fs::remove_file(&path).ok();

    assert_equivalent(&original, &restored);
    assert_eq!(restored.row_types(), &[RowType::Range, RowType::GreaterEqual]);
    assert_eq!(
        restored.column_types(),
        Some(
            &[
                ColumnType::Binary,
                ColumnType::Integer,
                ColumnType::Continuous,
                ColumnType::Continuous
            ][..]
        )
    );
    assert_eq!(restored.semi_continuous(), &[3]);
    assert_eq!(restored.sos_sets(), original.sos_sets());
}

#[test]
fn test_lp_file_is_written() {
    init_tracing();
    let path = temp_path("bakery.lp");
    format::write_file(&bakery(), FileFormat::Lp, &path).unwrap();
    let text = std::fs::read_to_string(&path).unwrap();
    std::fs::remove_file(&path).ok();

    assert!(text.contains("Maximize\n Profit: 0.05 Sun + 0.08 Moon - 133.333"));
    assert!(text.contains(" c2: 1 Sun <= 8000\n"));
    assert!(text.contains("Bounds\n 0 <= Sun <= 1000000\n"));
}

#[test]
fn test_unwritable_path_is_io_error() {
    let path = std::env::temp_dir()
        .join("mpsolve-core-missing-dir")
        .join("nested")
        .join("out.mps");
    let err = format::write_file(&bakery(), FileFormat::Mps, &path).unwrap_err();
    assert_eq!(err.code(), "FILE_IO");
}
