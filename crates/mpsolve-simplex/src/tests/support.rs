use mpsolve_core::{MatrixInput, Problem, RowType, Sense};

/// Bakery LP: maximize profit of two products under three capacity rows.
pub(crate) fn bakery() -> Problem {
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

/// Minimization over one dense row touching every column with coefficient 1.
pub(crate) fn single_row(
    objective: &[f64],
    lower: &[f64],
    upper: &[f64],
    row_type: RowType,
    rhs: f64,
    range: f64,
) -> Problem {
    let n = objective.len();
    let begin: Vec<usize> = (0..=n).collect();
    let index = vec![0; n];
    let value = vec![1.0; n];
    let is_range = row_type == RowType::Range;
    let mut problem = Problem::new("single-row");
    problem
        .load_matrix(MatrixInput {
            col_count: n,
            row_count: 1,
            nonzero_count: n,
            range_count: usize::from(is_range),
            sense: Sense::Minimize,
            objective_constant: 0.0,
            objective,
            lower_bounds: Some(lower),
            upper_bounds: Some(upper),
            row_types: &[row_type],
            rhs: &[rhs],
            ranges: is_range.then_some(&[range][..]),
            begin: &begin,
            count: None,
            index: &index,
            value: &value,
        })
        .unwrap();
    problem
}

/// Binary knapsack: maximize `5a + 4b + 3c` subject to `2a + 3b + c <= 5`.
pub(crate) fn knapsack() -> Problem {
    let mut problem = Problem::new("knapsack");
    problem
        .load_matrix(MatrixInput {
            col_count: 3,
            row_count: 1,
            nonzero_count: 3,
            range_count: 0,
            sense: Sense::Maximize,
            objective_constant: 0.0,
            objective: &[5.0, 4.0, 3.0],
            lower_bounds: None,
            upper_bounds: None,
            row_types: &[RowType::LessEqual],
            rhs: &[5.0],
            ranges: None,
            begin: &[0, 1, 2, 3],
            count: None,
            index: &[0, 0, 0],
            value: &[2.0, 3.0, 1.0],
        })
        .unwrap();
    problem.load_column_type_codes("BBB").unwrap();
    problem
}
