//! Compressed-sparse-column matrix and the matrix loader.

use crate::problem::error::ProblemError;
use crate::problem::Problem;
use crate::types::{RowType, Sense};

/// Magnitude at or above which a bound is treated as infinite.
pub const INFINITY_THRESHOLD: f64 = 1e30;

/// Constraint matrix in compacted compressed-sparse-column form.
///
/// `begin` has `columns + 1` entries; column `j` occupies
/// `index[begin[j]..begin[j + 1]]` and the matching `value` slice.
#[derive(Debug, Clone, PartialEq)]
pub struct CscMatrix {
    num_rows: usize,
    begin: Vec<usize>,
    index: Vec<usize>,
    value: Vec<f64>,
}

impl CscMatrix {
    pub(crate) fn empty(num_columns: usize) -> Self {
        Self {
            num_rows: 0,
            begin: vec![0; num_columns + 1],
            index: Vec::new(),
            value: Vec::new(),
        }
    }

    pub fn num_rows(&self) -> usize {
        self.num_rows
    }

    pub fn num_columns(&self) -> usize {
        self.begin.len().saturating_sub(1)
    }

    pub fn num_nonzeros(&self) -> usize {
        self.index.len()
    }

    /// Column start offsets (`columns + 1` entries).
    pub fn begin(&self) -> &[usize] {
        &self.begin
    }

    /// Row index of every stored entry.
    pub fn index(&self) -> &[usize] {
        &self.index
    }

    /// Coefficient of every stored entry.
    pub fn value(&self) -> &[f64] {
        &self.value
    }

    /// Number of stored entries in a column.
    pub fn count(&self, column: usize) -> usize {
        self.begin[column + 1] - self.begin[column]
    }

    /// Iterate the `(row, coefficient)` entries of one column.
    pub fn column(&self, column: usize) -> impl Iterator<Item = (usize, f64)> + '_ {
        let range = self.begin[column]..self.begin[column + 1];
        self.index[range.clone()]
            .iter()
            .copied()
            .zip(self.value[range].iter().copied())
    }

    /// Transpose to row-wise `(column, coefficient)` lists.
    pub fn rows(&self) -> Vec<Vec<(usize, f64)>> {
        let mut rows = vec![Vec::new(); self.num_rows];
        for column in 0..self.num_columns() {
            for (row, coeff) in self.column(column) {
                if let Some(entries) = rows.get_mut(row) {
                    entries.push((column, coeff));
                }
            }
        }
        rows
    }
}

/// Arguments of a matrix load, borrowed from the caller.
///
/// `begin` may hold `col_count` or `col_count + 1` offsets. When `count` is
/// `None` the per-column counts are derived from `begin`, which then must
/// have `col_count + 1` entries. Missing bounds default to `[0, +inf)`.
#[derive(Debug, Clone, Copy)]
pub struct MatrixInput<'a> {
    pub col_count: usize,
    pub row_count: usize,
    pub nonzero_count: usize,
    pub range_count: usize,
    pub sense: Sense,
    pub objective_constant: f64,
    pub objective: &'a [f64],
    pub lower_bounds: Option<&'a [f64]>,
    pub upper_bounds: Option<&'a [f64]>,
    pub row_types: &'a [RowType],
    pub rhs: &'a [f64],
    pub ranges: Option<&'a [f64]>,
    pub begin: &'a [usize],
    pub count: Option<&'a [usize]>,
    pub index: &'a [usize],
    pub value: &'a [f64],
}

fn expect_len(field: &'static str, expected: usize, got: usize) -> Result<(), ProblemError> {
    if expected == got {
        Ok(())
    } else {
        Err(ProblemError::LengthMismatch {
            field,
            expected,
            got,
        })
    }
}

fn expect_finite(field: &'static str, values: &[f64]) -> Result<(), ProblemError> {
    match values.iter().position(|v| !v.is_finite()) {
        Some(position) => Err(ProblemError::NonFiniteValue { field, position }),
        None => Ok(()),
    }
}

fn normalize_bound(value: f64) -> f64 {
    if value >= INFINITY_THRESHOLD {
        f64::INFINITY
    } else if value <= -INFINITY_THRESHOLD {
        f64::NEG_INFINITY
    } else {
        value
    }
}

/// Validate the CSC arrays and return per-column `(begin, count)` extents.
fn column_extents(input: &MatrixInput<'_>) -> Result<Vec<(usize, usize)>, ProblemError> {
    let n = input.col_count;
    let counts: Vec<usize> = match input.count {
        Some(count) => {
            expect_len("matrix count", n, count.len())?;
            if input.begin.len() != n && input.begin.len() != n + 1 {
                return Err(ProblemError::LengthMismatch {
                    field: "matrix begin",
                    expected: n + 1,
                    got: input.begin.len(),
                });
            }
            count.to_vec()
        }
        None => {
            expect_len("matrix begin", n + 1, input.begin.len())?;
            let mut derived = Vec::with_capacity(n);
            for column in 0..n {
                let (start, end) = (input.begin[column], input.begin[column + 1]);
                if end < start {
                    return Err(ProblemError::InvalidColumnExtent {
                        column,
                        begin: start,
                        count: 0,
                    });
                }
                derived.push(end - start);
            }
            derived
        }
    };

    let mut extents = Vec::with_capacity(n);
    for (column, &count) in counts.iter().enumerate() {
        let start = input.begin[column];
        let limit = input
            .begin
            .get(column + 1)
            .copied()
            .unwrap_or(input.index.len())
            .min(input.index.len());
        let end = start.checked_add(count);
        match end {
            Some(end) if end <= limit => extents.push((start, count)),
            _ => {
                return Err(ProblemError::InvalidColumnExtent {
                    column,
                    begin: start,
                    count,
                });
            }
        }
    }

    let actual: usize = counts.iter().sum();
    if actual != input.nonzero_count {
        return Err(ProblemError::NonZeroCountMismatch {
            declared: input.nonzero_count,
            actual,
        });
    }
    Ok(extents)
}

impl Problem {
    /// Load the objective, bounds, rows and constraint matrix.
    ///
    /// Every argument is validated before anything is stored, so a failed
    /// load leaves the problem empty. A problem accepts exactly one matrix.
    pub fn load_matrix(&mut self, input: MatrixInput<'_>) -> Result<(), ProblemError> {
        if self.loaded {
            tracing::warn!(
                component = "problem",
                operation = "load_matrix",
                status = "error",
                problem = %self.name,
                "Matrix already loaded"
            );
            return Err(ProblemError::AlreadyLoaded);
        }
        let result = self.load_matrix_checked(&input);
        if let Err(err) = &result {
            tracing::warn!(
                component = "problem",
                operation = "load_matrix",
                status = "error",
                problem = %self.name,
                code = err.code(),
                "{err}"
            );
        }
        result
    }

    fn load_matrix_checked(&mut self, input: &MatrixInput<'_>) -> Result<(), ProblemError> {
        let (n, m) = (input.col_count, input.row_count);
        expect_len("objective", n, input.objective.len())?;
        if let Some(lower) = input.lower_bounds {
            expect_len("lower bounds", n, lower.len())?;
        }
        if let Some(upper) = input.upper_bounds {
            expect_len("upper bounds", n, upper.len())?;
        }
        expect_len("row types", m, input.row_types.len())?;
        expect_len("rhs", m, input.rhs.len())?;
        expect_len("matrix values", input.index.len(), input.value.len())?;
        if let Some(ranges) = input.ranges {
            expect_len("ranges", m, ranges.len())?;
        }

        let range_rows = input
            .row_types
            .iter()
            .filter(|t| **t == RowType::Range)
            .count();
        if range_rows != input.range_count {
            return Err(ProblemError::RangeCountMismatch {
                declared: input.range_count,
                actual: range_rows,
            });
        }
        if range_rows > 0 && input.ranges.is_none() {
            return Err(ProblemError::LengthMismatch {
                field: "ranges",
                expected: m,
                got: 0,
            });
        }

        expect_finite("objective", input.objective)?;
        expect_finite("rhs", input.rhs)?;
        if !input.objective_constant.is_finite() {
            return Err(ProblemError::NonFiniteValue {
                field: "objective constant",
                position: 0,
            });
        }

        let extents = column_extents(input)?;

        let mut begin = Vec::with_capacity(n + 1);
        let mut index = Vec::with_capacity(input.nonzero_count);
        let mut value = Vec::with_capacity(input.nonzero_count);
        begin.push(0);
        for &(start, count) in &extents {
            for position in start..start + count {
                let row = input.index[position];
                if row >= m {
                    return Err(ProblemError::RowIndexOutOfBounds {
                        position,
                        row,
                        rows: m,
                    });
                }
                let coeff = input.value[position];
                if !coeff.is_finite() {
                    return Err(ProblemError::NonFiniteValue {
                        field: "matrix values",
                        position,
                    });
                }
                index.push(row);
                value.push(coeff);
            }
            begin.push(index.len());
        }

        let mut ranges = vec![0.0; m];
        if let Some(input_ranges) = input.ranges {
            for (row, row_type) in input.row_types.iter().enumerate() {
                if *row_type == RowType::Range {
                    if !input_ranges[row].is_finite() {
                        return Err(ProblemError::NonFiniteValue {
                            field: "ranges",
                            position: row,
                        });
                    }
                    ranges[row] = input_ranges[row].abs();
                }
            }
        }

        self.sense = input.sense;
        self.objective_constant = input.objective_constant;
        self.objective = input.objective.to_vec();
        self.col_lower = match input.lower_bounds {
            Some(lower) => lower.iter().copied().map(normalize_bound).collect(),
            None => vec![0.0; n],
        };
        self.col_upper = match input.upper_bounds {
            Some(upper) => upper.iter().copied().map(normalize_bound).collect(),
            None => vec![f64::INFINITY; n],
        };
        self.unclamped_bounds.clear();
        self.row_types = input.row_types.to_vec();
        self.rhs = input.rhs.to_vec();
        self.ranges = ranges;
        self.matrix = CscMatrix {
            num_rows: m,
            begin,
            index,
            value,
        };
        self.loaded = true;

        tracing::debug!(
            component = "problem",
            operation = "load_matrix",
            status = "success",
            problem = %self.name,
            columns = n,
            rows = m,
            nnz = self.matrix.num_nonzeros(),
            ranges = input.range_count,
            sense = self.sense.as_str(),
            "Loaded problem matrix"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input<'a>(begin: &'a [usize], count: Option<&'a [usize]>, index: &'a [usize], value: &'a [f64]) -> MatrixInput<'a> {
        MatrixInput {
            col_count: 2,
            row_count: 2,
            nonzero_count: count.map_or(index.len(), |c| c.iter().sum()),
            range_count: 0,
            sense: Sense::Minimize,
            objective_constant: 0.0,
            objective: &[1.0, 1.0],
            lower_bounds: None,
            upper_bounds: None,
            row_types: &[RowType::GreaterEqual, RowType::GreaterEqual],
            rhs: &[1.0, 1.0],
            ranges: None,
            begin,
            count,
            index,
            value,
        }
    }

    #[test]
    fn test_gapped_columns_are_compacted() {
        // Column 0 uses one of its two reserved slots.
        let mut problem = Problem::new("gaps");
        problem
            .load_matrix(input(&[0, 2, 4], Some(&[1, 2]), &[0, 9, 0, 1], &[3.0, 0.0, 4.0, 5.0]))
            .unwrap();
        let matrix = problem.matrix();
        assert_eq!(matrix.begin(), &[0, 1, 3]);
        assert_eq!(matrix.index(), &[0, 0, 1]);
        assert_eq!(matrix.column(1).collect::<Vec<_>>(), vec![(0, 4.0), (1, 5.0)]);
        assert_eq!(problem.column_upper(), &[f64::INFINITY, f64::INFINITY]);
    }

    #[test]
    fn test_counts_derived_from_begin() {
        let mut problem = Problem::new("derived");
        problem
            .load_matrix(input(&[0, 1, 3], None, &[1, 0, 1], &[2.0, 3.0, 4.0]))
            .unwrap();
        assert_eq!(problem.matrix().count(0), 1);
        assert_eq!(problem.matrix().count(1), 2);
        assert_eq!(problem.matrix().rows(), vec![vec![(1, 3.0)], vec![(0, 2.0), (1, 4.0)]]);
    }

    #[test]
    fn test_overlapping_column_is_rejected() {
        let mut problem = Problem::new("overlap");
        let result = problem.load_matrix(input(&[0, 1], Some(&[2, 1]), &[0, 1, 1], &[1.0, 1.0, 1.0]));
        assert!(matches!(
            result,
            Err(ProblemError::InvalidColumnExtent { column: 0, .. })
        ));
        assert!(!problem.is_loaded());
    }

    #[test]
    fn test_large_bounds_become_infinite() {
        let mut problem = Problem::new("inf");
        let mut data = input(&[0, 1, 2], None, &[0, 1], &[1.0, 1.0]);
        data.lower_bounds = Some(&[-1e30, 0.0]);
        data.upper_bounds = Some(&[1e31, 10.0]);
        problem.load_matrix(data).unwrap();
        assert_eq!(problem.column_lower()[0], f64::NEG_INFINITY);
        assert_eq!(problem.column_upper()[0], f64::INFINITY);
        assert_eq!(problem.column_upper()[1], 10.0);
    }
}
