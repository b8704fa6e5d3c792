use crate::problem::{MatrixInput, Problem};
use crate::types::{RowType, Sense};

/// Owned arrays of the two-product bakery LP.
pub(crate) struct BakeryData {
    pub(crate) objective: Vec<f64>,
    pub(crate) lower: Vec<f64>,
    pub(crate) upper: Vec<f64>,
    pub(crate) row_types: Vec<RowType>,
    pub(crate) rhs: Vec<f64>,
    pub(crate) begin: Vec<usize>,
    pub(crate) count: Vec<usize>,
    pub(crate) index: Vec<usize>,
    pub(crate) value: Vec<f64>,
}

impl BakeryData {
    pub(crate) fn new() -> Self {
        Self {
            objective: vec![0.05, 0.08],
            lower: vec![0.0, 0.0],
            upper: vec![1_000_000.0, 1_000_000.0],
            row_types: vec![RowType::LessEqual; 3],
            rhs: vec![1400.0, 8000.0, 5000.0],
            begin: vec![0, 2, 4],
            count: vec![2, 2],
            index: vec![0, 1, 0, 2],
            value: vec![0.1, 1.0, 0.2, 1.0],
        }
    }

    pub(crate) fn input(&self) -> MatrixInput<'_> {
        MatrixInput {
            col_count: 2,
            row_count: 3,
            nonzero_count: 4,
            range_count: 0,
            sense: Sense::Maximize,
            objective_constant: -4000.0 / 30.0,
            objective: &self.objective,
            lower_bounds: Some(&self.lower),
            upper_bounds: Some(&self.upper),
            row_types: &self.row_types,
            rhs: &self.rhs,
            ranges: None,
            begin: &self.begin,
            count: Some(&self.count),
            index: &self.index,
            value: &self.value,
        }
    }
}

/// Bakery problem with its matrix and names loaded.
pub(crate) fn bakery() -> Problem {
    let data = BakeryData::new();
    let mut problem = Problem::new("Bakery");
    problem.load_matrix(data.input()).unwrap();
    problem
        .load_names(
            Some(&["Sun", "Moon"][..]),
            Some(&["c1", "c2", "c3"][..]),
            Some("Profit"),
        )
        .unwrap();
    problem
}
