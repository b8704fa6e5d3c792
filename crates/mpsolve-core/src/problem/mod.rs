//! Problem descriptor for linear and mixed-integer programs.
//!
//! A [`Problem`] starts empty and is filled by a fixed sequence of loads:
//! the matrix first, then optional names, then any MIP annotations.
//!
//! # Module Organization
//!
//! - [`error`]: Load and consistency error types
//! - [`matrix`]: Compressed-sparse-column matrix and the matrix loader
//! - [`names`]: Column/row name tables and the two name loaders
//! - [`mip`]: Integer markers, priorities, SOS sets, semi-continuous columns
//! - [`check`]: Consistency validation

mod check;
mod error;
mod matrix;
mod mip;
mod names;

use std::borrow::Cow;

use crate::types::{Bounds, ColumnType, ProblemClass, RowType, Sense};

pub use error::{ConsistencyError, Issue, NameKind, ProblemError};
pub use matrix::{CscMatrix, MatrixInput, INFINITY_THRESHOLD};
pub use mip::{BranchPriority, SosInput, SosMember, SosSet};
pub use names::{NameTable, PACKED_NAME_DELIMITER};

/// Objective row name used when none was loaded.
pub const DEFAULT_OBJECTIVE_NAME: &str = "OBJ";

/// An LP/MIP instance.
///
/// Column and row counts are fixed by [`Problem::load_matrix`]. The matrix is
/// stored column-major with a compacted `begin` offset array.
#[derive(Debug, Clone)]
pub struct Problem {
    pub(crate) name: String,
    pub(crate) loaded: bool,
    pub(crate) sense: Sense,
    pub(crate) objective_constant: f64,
    pub(crate) objective: Vec<f64>,
    pub(crate) col_lower: Vec<f64>,
    pub(crate) col_upper: Vec<f64>,
    pub(crate) row_types: Vec<RowType>,
    pub(crate) rhs: Vec<f64>,
    pub(crate) ranges: Vec<f64>,
    pub(crate) matrix: CscMatrix,
    pub(crate) column_names: Option<NameTable>,
    pub(crate) row_names: Option<NameTable>,
    pub(crate) objective_name: Option<String>,
    pub(crate) column_types: Option<Vec<ColumnType>>,
    // Bounds of binary columns as loaded, before clamping to [0, 1].
    pub(crate) unclamped_bounds: Vec<(usize, f64, f64)>,
    pub(crate) priorities: Vec<BranchPriority>,
    pub(crate) sos_sets: Vec<SosSet>,
    // Sorted, deduplicated column indices.
    pub(crate) semi_continuous: Vec<usize>,
    pub(crate) initial_values: Option<Vec<f64>>,
}

impl Problem {
    /// Create an empty problem with the given name.
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        tracing::debug!(
            component = "problem",
            operation = "create",
            status = "success",
            problem = %name,
            "Created empty problem"
        );
        Self {
            name,
            loaded: false,
            sense: Sense::Minimize,
            objective_constant: 0.0,
            objective: Vec::new(),
            col_lower: Vec::new(),
            col_upper: Vec::new(),
            row_types: Vec::new(),
            rhs: Vec::new(),
            ranges: Vec::new(),
            matrix: CscMatrix::empty(0),
            column_names: None,
            row_names: None,
            objective_name: None,
            column_types: None,
            unclamped_bounds: Vec::new(),
            priorities: Vec::new(),
            sos_sets: Vec::new(),
            semi_continuous: Vec::new(),
            initial_values: None,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_loaded(&self) -> bool {
        self.loaded
    }

    pub fn num_columns(&self) -> usize {
        self.objective.len()
    }

    pub fn num_rows(&self) -> usize {
        self.row_types.len()
    }

    pub fn num_nonzeros(&self) -> usize {
        self.matrix.num_nonzeros()
    }

    pub fn sense(&self) -> Sense {
        self.sense
    }

    pub fn objective_constant(&self) -> f64 {
        self.objective_constant
    }

    /// Objective coefficients, one per column.
    pub fn objective(&self) -> &[f64] {
        &self.objective
    }

    pub fn column_lower(&self) -> &[f64] {
        &self.col_lower
    }

    pub fn column_upper(&self) -> &[f64] {
        &self.col_upper
    }

    pub fn column_bounds(&self, column: usize) -> Option<Bounds> {
        let lower = *self.col_lower.get(column)?;
        let upper = *self.col_upper.get(column)?;
        Some(Bounds::new(lower, upper))
    }

    pub fn row_types(&self) -> &[RowType] {
        &self.row_types
    }

    pub fn rhs(&self) -> &[f64] {
        &self.rhs
    }

    /// Range widths, one per row (zero for non-range rows).
    pub fn ranges(&self) -> &[f64] {
        &self.ranges
    }

    /// Activity bounds of a row derived from its type, rhs and range.
    pub fn row_bounds(&self, row: usize) -> Option<Bounds> {
        let row_type = *self.row_types.get(row)?;
        Some(row_type.bounds(self.rhs[row], self.ranges[row]))
    }

    pub fn matrix(&self) -> &CscMatrix {
        &self.matrix
    }

    /// Evaluate the objective (including the constant) at a point.
    pub fn objective_value_at(&self, values: &[f64]) -> f64 {
        self.objective
            .iter()
            .zip(values)
            .map(|(c, x)| c * x)
            .sum::<f64>()
            + self.objective_constant
    }

    /// Column name, or the generated `C<n>` default when no names were loaded.
    pub fn column_name(&self, column: usize) -> Cow<'_, str> {
        match self.column_names.as_ref().and_then(|names| names.get(column)) {
            Some(name) => Cow::Borrowed(name),
            None => Cow::Owned(format!("C{}", column + 1)),
        }
    }

    /// Row name, or the generated `R<n>` default when no names were loaded.
    pub fn row_name(&self, row: usize) -> Cow<'_, str> {
        match self.row_names.as_ref().and_then(|names| names.get(row)) {
            Some(name) => Cow::Borrowed(name),
            None => Cow::Owned(format!("R{}", row + 1)),
        }
    }

    pub fn objective_name(&self) -> &str {
        self.objective_name
            .as_deref()
            .unwrap_or(DEFAULT_OBJECTIVE_NAME)
    }

    pub fn column_names(&self) -> Option<&NameTable> {
        self.column_names.as_ref()
    }

    pub fn row_names(&self) -> Option<&NameTable> {
        self.row_names.as_ref()
    }

    /// Find a column by its loaded name.
    pub fn column_by_name(&self, name: &str) -> Option<usize> {
        self.column_names.as_ref()?.position(name)
    }

    /// Find a row by its loaded name.
    pub fn row_by_name(&self, name: &str) -> Option<usize> {
        self.row_names.as_ref()?.position(name)
    }

    pub fn column_type(&self, column: usize) -> ColumnType {
        self.column_types
            .as_ref()
            .and_then(|types| types.get(column).copied())
            .unwrap_or_default()
    }

    pub fn is_integer(&self, column: usize) -> bool {
        self.column_type(column).is_integer()
    }

    pub fn column_types(&self) -> Option<&[ColumnType]> {
        self.column_types.as_deref()
    }

    pub fn num_integer_columns(&self) -> usize {
        self.column_types
            .as_ref()
            .map_or(0, |types| types.iter().filter(|t| t.is_integer()).count())
    }

    pub fn priorities(&self) -> &[BranchPriority] {
        &self.priorities
    }

    pub fn sos_sets(&self) -> &[SosSet] {
        &self.sos_sets
    }

    pub fn semi_continuous(&self) -> &[usize] {
        &self.semi_continuous
    }

    pub fn is_semi_continuous(&self, column: usize) -> bool {
        self.semi_continuous.binary_search(&column).is_ok()
    }

    pub fn initial_values(&self) -> Option<&[f64]> {
        self.initial_values.as_deref()
    }

    /// Problem class declared by the loaded annotations.
    ///
    /// Any integer marker, SOS set, semi-continuous column or branching
    /// priority makes the problem [`ProblemClass::Mixed`], even when no
    /// column actually ends up integer.
    pub fn class(&self) -> ProblemClass {
        if self.column_types.is_some()
            || !self.sos_sets.is_empty()
            || !self.semi_continuous.is_empty()
            || !self.priorities.is_empty()
        {
            ProblemClass::Mixed
        } else {
            ProblemClass::Linear
        }
    }

    pub(crate) fn ensure_loaded(&self, operation: &'static str) -> Result<(), ProblemError> {
        if self.loaded {
            Ok(())
        } else {
            Err(ProblemError::NotLoaded { operation })
        }
    }

    pub(crate) fn ensure_column(&self, field: &'static str, column: usize) -> Result<(), ProblemError> {
        if column < self.num_columns() {
            Ok(())
        } else {
            Err(ProblemError::ColumnIndexOutOfBounds {
                field,
                column,
                columns: self.num_columns(),
            })
        }
    }
}

impl Default for Problem {
    fn default() -> Self {
        Self::new("")
    }
}

#[cfg(test)]
mod tests;
