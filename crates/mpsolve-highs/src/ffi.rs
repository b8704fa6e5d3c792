//! Thin wrapper over the `highs` crate plus the info queries it does not expose.
//!
//! This module contains unsafe code for reading solve statistics from the C library.
#![allow(unsafe_code)]

use highs::{Col, HighsModelStatus, RowProblem, Sense as HighsSense, SolvedModel};
use mpsolve_core::Sense;
use std::ffi::{CStr, CString};
use std::fmt;
use tracing::{debug, trace, warn};

/// Model status reported by HiGHS after a solve.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HighsStatus {
    Optimal,
    Infeasible,
    Unbounded,
    UnboundedOrInfeasible,
    ReachedTimeLimit,
    ReachedIterationLimit,
    /// HiGHS rejected the model or failed while solving it.
    Failed,
    Unknown,
}

/// Errors returned by the HiGHS model wrapper.
#[derive(Debug, Clone, PartialEq)]
pub enum HighsModelError {
    ColumnCoefficientLengthMismatch {
        columns: usize,
        coefficients: usize,
    },
    ColumnIndexOutOfBounds {
        column_index: usize,
        num_columns: usize,
    },
    PrimalStartLengthMismatch {
        expected: usize,
        got: usize,
    },
}

impl fmt::Display for HighsModelError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HighsModelError::ColumnCoefficientLengthMismatch {
                columns,
                coefficients,
            } => write!(
                f,
                "columns length ({}) must match coefficients length ({})",
                columns, coefficients
            ),
            HighsModelError::ColumnIndexOutOfBounds {
                column_index,
                num_columns,
            } => write!(
                f,
                "column index {} out of bounds (num_columns = {})",
                column_index, num_columns
            ),
            HighsModelError::PrimalStartLengthMismatch { expected, got } => write!(
                f,
                "primal start length must match number of columns (expected {}, got {})",
                expected, got
            ),
        }
    }
}

impl std::error::Error for HighsModelError {}

/// Option value types for HiGHS configuration.
#[derive(Debug, Clone, PartialEq)]
pub enum HighsOption {
    Bool(bool),
    Int(i32),
    Float(f64),
    Str(String),
}

/// Everything read back from a finished solve.
#[derive(Debug, Clone, PartialEq)]
pub struct HighsOutcome {
    pub status: HighsStatus,
    /// Whether any column was integer.
    pub is_mip: bool,
    /// Objective without any constant offset.
    pub objective_value: f64,
    pub col_values: Vec<f64>,
    pub col_duals: Vec<f64>,
    pub row_values: Vec<f64>,
    pub row_duals: Vec<f64>,
    pub simplex_iterations: u64,
    pub mip_nodes: u64,
    pub mip_gap: f64,
    /// Without any constant offset; `None` for pure LPs.
    pub mip_dual_bound: Option<f64>,
}

/// Model under construction: columns first, then rows.
pub struct HighsModel {
    problem: RowProblem,
    sense: Sense,
    columns: Vec<Col>,
    has_integers: bool,
    log_to_console: bool,
    verbosity: Option<u32>,
    options: Vec<(String, HighsOption)>,
    primal_start: Option<Vec<f64>>,
}

impl HighsModel {
    pub fn new(sense: Sense) -> Self {
        trace!(
            component = "highs",
            operation = "init_model",
            status = "success",
            sense = sense.as_str(),
            "Creating HiGHS model"
        );
        Self {
            problem: RowProblem::default(),
            sense,
            columns: Vec::new(),
            has_integers: false,
            log_to_console: false,
            verbosity: None,
            options: Vec::new(),
            primal_start: None,
        }
    }

    /// Add a column and return its index.
    pub fn add_column(&mut self, lower: f64, upper: f64, cost: f64, is_integer: bool) -> usize {
        let col = if is_integer {
            self.has_integers = true;
            self.problem.add_integer_column(cost, lower..=upper)
        } else {
            self.problem.add_column(cost, lower..=upper)
        };
        self.columns.push(col);
        self.columns.len() - 1
    }

    /// Add a row over previously added columns and return its index.
    ///
    /// # Errors
    ///
    /// Returns an error if columns and coefficients have different lengths
    /// or if any column index is out of bounds.
    pub fn add_row(
        &mut self,
        lower: f64,
        upper: f64,
        columns: &[usize],
        coefficients: &[f64],
    ) -> Result<usize, HighsModelError> {
        if columns.len() != coefficients.len() {
            return Err(HighsModelError::ColumnCoefficientLengthMismatch {
                columns: columns.len(),
                coefficients: coefficients.len(),
            });
        }
        let num_columns = self.columns.len();
        let mut factors = Vec::with_capacity(columns.len());
        for (&column, &coeff) in columns.iter().zip(coefficients) {
            let col = *self
                .columns
                .get(column)
                .ok_or(HighsModelError::ColumnIndexOutOfBounds {
                    column_index: column,
                    num_columns,
                })?;
            factors.push((col, coeff));
        }
        self.problem.add_row(lower..=upper, factors);
        Ok(self.problem.num_rows().saturating_sub(1))
    }

    pub fn num_columns(&self) -> usize {
        self.columns.len()
    }

    pub fn num_rows(&self) -> usize {
        self.problem.num_rows()
    }

    pub fn set_log_to_console(&mut self, enabled: bool) {
        self.log_to_console = enabled;
    }

    pub fn set_verbosity(&mut self, level: u32) {
        self.verbosity = Some(level);
    }

    pub fn set_option(&mut self, option: impl Into<String>, value: HighsOption) {
        self.options.push((option.into(), value));
    }

    /// Primal start handed to HiGHS as an initial solution.
    ///
    /// # Errors
    ///
    /// Returns an error if the length does not match the column count.
    pub fn set_primal_start(&mut self, values: Vec<f64>) -> Result<(), HighsModelError> {
        if values.len() != self.columns.len() {
            return Err(HighsModelError::PrimalStartLengthMismatch {
                expected: self.columns.len(),
                got: values.len(),
            });
        }
        self.primal_start = Some(values);
        Ok(())
    }

    /// Consume the model, solve it and read everything back.
    pub fn solve(self) -> HighsOutcome {
        debug!(
            component = "highs",
            operation = "solve",
            status = "success",
            num_cols = self.columns.len(),
            num_rows = self.problem.num_rows(),
            sense = self.sense.as_str(),
            "Solving model"
        );
        let sense = match self.sense {
            Sense::Minimize => HighsSense::Minimise,
            Sense::Maximize => HighsSense::Maximise,
        };

        let mut model = self.problem.optimise(sense);
        if self.verbosity.unwrap_or(0) == 0 && !self.log_to_console {
            model.make_quiet();
        }
        if let Some(level) = self.verbosity {
            model.set_option("output_flag", level > 0);
        }
        for (option, value) in &self.options {
            match value {
                HighsOption::Bool(val) => model.set_option(option.as_str(), *val),
                HighsOption::Int(val) => model.set_option(option.as_str(), *val),
                HighsOption::Float(val) => model.set_option(option.as_str(), *val),
                HighsOption::Str(val) => model.set_option(option.as_str(), val.as_str()),
            }
        }
        if self.log_to_console {
            model.set_option("log_to_console", true);
            model.set_option("output_flag", true);
        }
        if let Some(values) = self.primal_start.as_deref() {
            if let Err(err) = model.try_set_solution(Some(values), None, None, None) {
                warn!(
                    component = "highs",
                    operation = "set_primal_start",
                    status = "warn",
                    ?err,
                    "Failed to set initial solution; continuing without it"
                );
            }
        }

        let solved = model.solve();
        let status = map_status(solved.status());
        trace!(
            component = "highs",
            operation = "solve",
            status = "success",
            ?status,
            "Model status received"
        );
        read_outcome(&solved, status, self.has_integers)
    }
}

impl fmt::Debug for HighsModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HighsModel")
            .field("num_columns", &self.columns.len())
            .field("num_rows", &self.problem.num_rows())
            .field("sense", &self.sense)
            .finish_non_exhaustive()
    }
}

fn read_outcome(solved: &SolvedModel, status: HighsStatus, has_integers: bool) -> HighsOutcome {
    let solution = solved.get_solution();
    HighsOutcome {
        status,
        is_mip: has_integers,
        objective_value: solved.objective_value(),
        col_values: solution.columns().to_vec(),
        col_duals: solution.dual_columns().to_vec(),
        row_values: solution.rows().to_vec(),
        row_duals: solution.dual_rows().to_vec(),
        simplex_iterations: int_info(solved, "simplex_iteration_count").unwrap_or(0),
        mip_nodes: if has_integers {
            int64_info(solved, "mip_node_count").unwrap_or(0)
        } else {
            0
        },
        mip_gap: solved.mip_gap(),
        mip_dual_bound: has_integers
            .then(|| double_info(solved, "mip_dual_bound"))
            .flatten(),
    }
}

fn int_info(solved: &SolvedModel, name: &str) -> Option<u64> {
    let c_name = CString::new(name).ok()?;
    let mut value: highs_sys::HighsInt = 0;
    let status = unsafe {
        highs_sys::Highs_getIntInfoValue(solved.as_ptr(), c_name.as_ptr(), &raw mut value)
    };
    if status != highs_sys::STATUS_OK {
        debug!(
            component = "highs",
            operation = "solve_info",
            info = name,
            status_code = status,
            "Info value not available"
        );
        return None;
    }
    u64::try_from(value).ok()
}

fn int64_info(solved: &SolvedModel, name: &str) -> Option<u64> {
    let c_name = CString::new(name).ok()?;
    let mut value: i64 = 0;
    let status = unsafe {
        highs_sys::Highs_getInt64InfoValue(solved.as_ptr(), c_name.as_ptr(), &raw mut value)
    };
    if status != highs_sys::STATUS_OK {
        return None;
    }
    u64::try_from(value).ok()
}

fn double_info(solved: &SolvedModel, name: &str) -> Option<f64> {
    let c_name = CString::new(name).ok()?;
    let mut value: f64 = 0.0;
    let status = unsafe {
        highs_sys::Highs_getDoubleInfoValue(solved.as_ptr(), c_name.as_ptr(), &raw mut value)
    };
    (status == highs_sys::STATUS_OK && value.is_finite()).then_some(value)
}

/// Return the HiGHS library version string, if available.
pub fn highs_version() -> Option<String> {
    unsafe {
        let ptr = highs_sys::Highs_version();
        if ptr.is_null() {
            None
        } else {
            CStr::from_ptr(ptr).to_str().ok().map(str::to_string)
        }
    }
}

fn map_status(status: HighsModelStatus) -> HighsStatus {
    match status {
        HighsModelStatus::Optimal => HighsStatus::Optimal,
        HighsModelStatus::Infeasible => HighsStatus::Infeasible,
        HighsModelStatus::Unbounded => HighsStatus::Unbounded,
        HighsModelStatus::UnboundedOrInfeasible => HighsStatus::UnboundedOrInfeasible,
        HighsModelStatus::ReachedTimeLimit => HighsStatus::ReachedTimeLimit,
        HighsModelStatus::ReachedIterationLimit => HighsStatus::ReachedIterationLimit,
        HighsModelStatus::LoadError
        | HighsModelStatus::ModelError
        | HighsModelStatus::PresolveError
        | HighsModelStatus::SolveError
        | HighsModelStatus::PostsolveError => HighsStatus::Failed,
        _ => HighsStatus::Unknown,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_row_checks_columns() {
        let mut model = HighsModel::new(Sense::Minimize);
        assert_eq!(model.add_column(0.0, 1.0, 1.0, false), 0);
        assert_eq!(
            model.add_row(0.0, 1.0, &[0, 1], &[1.0]),
            Err(HighsModelError::ColumnCoefficientLengthMismatch {
                columns: 2,
                coefficients: 1
            })
        );
        assert_eq!(
            model.add_row(0.0, 1.0, &[3], &[1.0]),
            Err(HighsModelError::ColumnIndexOutOfBounds {
                column_index: 3,
                num_columns: 1
            })
        );
        assert_eq!(model.add_row(0.0, 1.0, &[0], &[1.0]), Ok(0));
        assert_eq!(model.num_rows(), 1);
    }

    #[test]
    fn test_primal_start_length() {
        let mut model = HighsModel::new(Sense::Maximize);
        model.add_column(0.0, 1.0, 1.0, true);
        assert!(model.set_primal_start(vec![1.0, 2.0]).is_err());
        assert!(model.set_primal_start(vec![1.0]).is_ok());
    }

    #[test]
    fn test_map_status() {
        assert_eq!(map_status(HighsModelStatus::Optimal), HighsStatus::Optimal);
        assert_eq!(map_status(HighsModelStatus::ModelError), HighsStatus::Failed);
        assert_eq!(
            map_status(HighsModelStatus::ReachedTimeLimit),
            HighsStatus::ReachedTimeLimit
        );
    }
}
