//! Problem error types.

use std::fmt;

/// Namespace a name table belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NameKind {
    Column,
    Row,
}

impl NameKind {
    pub fn as_str(self) -> &'static str {
        match self {
            NameKind::Column => "column",
            NameKind::Row => "row",
        }
    }
}

/// Errors raised while loading data into a problem.
#[derive(Debug, Clone, PartialEq)]
pub enum ProblemError {
    /// Matrix data already loaded
    AlreadyLoaded,
    /// Operation requires a loaded matrix
    NotLoaded { operation: &'static str },
    /// Array length does not match its declared count
    LengthMismatch {
        field: &'static str,
        expected: usize,
        got: usize,
    },
    /// Nonzero count disagrees with the CSC arrays
    NonZeroCountMismatch { declared: usize, actual: usize },
    /// Range count disagrees with the number of range rows
    RangeCountMismatch { declared: usize, actual: usize },
    /// Column extent overlaps the next column or runs past the index array
    InvalidColumnExtent { column: usize, begin: usize, count: usize },
    /// Row index outside `[0, rowCount)`
    RowIndexOutOfBounds { position: usize, row: usize, rows: usize },
    /// Column index outside `[0, colCount)`
    ColumnIndexOutOfBounds {
        field: &'static str,
        column: usize,
        columns: usize,
    },
    /// Non-finite value where a finite one is required
    NonFiniteValue { field: &'static str, position: usize },
    /// Unknown row type code
    InvalidRowType { code: char },
    /// Unknown column type code
    InvalidColumnType { code: char },
    /// Unknown SOS type code
    InvalidSosType { code: i32 },
    /// Malformed SOS packed arrays
    InvalidSosData { reason: String },
    /// Malformed name data
    InvalidNames { kind: NameKind, reason: String },
}

impl ProblemError {
    /// Returns a semantic error code for programmatic handling.
    pub fn code(&self) -> &'static str {
        match self {
            ProblemError::AlreadyLoaded => "PROBLEM_ALREADY_LOADED",
            ProblemError::NotLoaded { .. } => "PROBLEM_NOT_LOADED",
            ProblemError::LengthMismatch { .. } => "LOAD_LENGTH_MISMATCH",
            ProblemError::NonZeroCountMismatch { .. } => "LOAD_NONZERO_COUNT",
            ProblemError::RangeCountMismatch { .. } => "LOAD_RANGE_COUNT",
            ProblemError::InvalidColumnExtent { .. } => "CSC_INVALID_EXTENT",
            ProblemError::RowIndexOutOfBounds { .. } => "CSC_ROW_OUT_OF_BOUNDS",
            ProblemError::ColumnIndexOutOfBounds { .. } => "COLUMN_OUT_OF_BOUNDS",
            ProblemError::NonFiniteValue { .. } => "LOAD_NON_FINITE",
            ProblemError::InvalidRowType { .. } => "ROW_INVALID_TYPE",
            ProblemError::InvalidColumnType { .. } => "COLUMN_INVALID_TYPE",
            ProblemError::InvalidSosType { .. } => "SOS_INVALID_TYPE",
            ProblemError::InvalidSosData { .. } => "SOS_INVALID_DATA",
            ProblemError::InvalidNames { .. } => "NAMES_INVALID",
        }
    }
}

impl fmt::Display for ProblemError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProblemError::AlreadyLoaded => {
                write!(f, "[{}] Problem matrix is already loaded", self.code())
            }
            ProblemError::NotLoaded { operation } => write!(
                f,
                "[{}] {} requires a loaded problem matrix",
                self.code(),
                operation
            ),
            ProblemError::LengthMismatch {
                field,
                expected,
                got,
            } => write!(
                f,
                "[{}] {} has {} entries, expected {}",
                self.code(),
                field,
                got,
                expected
            ),
            ProblemError::NonZeroCountMismatch { declared, actual } => write!(
                f,
                "[{}] Declared {} nonzeros but column counts sum to {}",
                self.code(),
                declared,
                actual
            ),
            ProblemError::RangeCountMismatch { declared, actual } => write!(
                f,
                "[{}] Declared {} ranges but found {} range rows",
                self.code(),
                declared,
                actual
            ),
            ProblemError::InvalidColumnExtent {
                column,
                begin,
                count,
            } => write!(
                f,
                "[{}] Column {} extent (begin {}, count {}) overlaps the next column or exceeds the index array",
                self.code(),
                column,
                begin,
                count
            ),
            ProblemError::RowIndexOutOfBounds {
                position,
                row,
                rows,
            } => write!(
                f,
                "[{}] Row index {} at position {} out of bounds (rows = {})",
                self.code(),
                row,
                position,
                rows
            ),
            ProblemError::ColumnIndexOutOfBounds {
                field,
                column,
                columns,
            } => write!(
                f,
                "[{}] {} references column {} (columns = {})",
                self.code(),
                field,
                column,
                columns
            ),
            ProblemError::NonFiniteValue { field, position } => write!(
                f,
                "[{}] {} entry {} must be finite",
                self.code(),
                field,
                position
            ),
            ProblemError::InvalidRowType { code } => {
                write!(f, "[{}] Unknown row type '{}'", self.code(), code)
            }
            ProblemError::InvalidColumnType { code } => {
                write!(f, "[{}] Unknown column type '{}'", self.code(), code)
            }
            ProblemError::InvalidSosType { code } => {
                write!(f, "[{}] Unknown SOS type {}", self.code(), code)
            }
            ProblemError::InvalidSosData { reason } => {
                write!(f, "[{}] SOS data invalid: {}", self.code(), reason)
            }
            ProblemError::InvalidNames { kind, reason } => write!(
                f,
                "[{}] {} names invalid: {}",
                self.code(),
                kind.as_str(),
                reason
            ),
        }
    }
}

impl std::error::Error for ProblemError {}

/// A single consistency violation found by [`Problem::check`](crate::Problem::check).
#[derive(Debug, Clone, PartialEq)]
pub enum Issue {
    NotLoaded,
    ColumnBoundsInverted { column: usize, lower: f64, upper: f64 },
    ColumnBoundsInvalid { column: usize, lower: f64, upper: f64 },
    RowValueInvalid { row: usize, rhs: f64, range: f64 },
    MatrixIndexOutOfRange { column: usize, row: usize },
    MatrixValueInvalid { column: usize, row: usize },
    ObjectiveInvalid { column: usize },
    DuplicateName { kind: NameKind, name: String, first: usize, second: usize },
    ObjectiveNameClash { name: String, row: usize },
    SemiContinuousUnbounded { column: usize },
    SosMemberOutOfRange { set: usize, column: usize },
    SosMemberDuplicated { set: usize, column: usize },
    SosWeightsNotDistinct { set: usize },
    PriorityColumnOutOfRange { column: usize },
}

impl fmt::Display for Issue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Issue::NotLoaded => write!(f, "problem matrix not loaded"),
            Issue::ColumnBoundsInverted {
                column,
                lower,
                upper,
            } => write!(
                f,
                "column {} bounds inverted: lower ({}) > upper ({})",
                column, lower, upper
            ),
            Issue::ColumnBoundsInvalid {
                column,
                lower,
                upper,
            } => write!(
                f,
                "column {} bounds invalid: lower ({}) upper ({})",
                column, lower, upper
            ),
            Issue::RowValueInvalid { row, rhs, range } => write!(
                f,
                "row {} right-hand side ({}) or range ({}) invalid",
                row, rhs, range
            ),
            Issue::MatrixIndexOutOfRange { column, row } => {
                write!(f, "column {} references missing row {}", column, row)
            }
            Issue::MatrixValueInvalid { column, row } => {
                write!(f, "coefficient at (row {}, column {}) is not finite", row, column)
            }
            Issue::ObjectiveInvalid { column } => {
                write!(f, "objective coefficient of column {} is not finite", column)
            }
            Issue::DuplicateName {
                kind,
                name,
                first,
                second,
            } => write!(
                f,
                "duplicate {} name '{}' at {} and {}",
                kind.as_str(),
                name,
                first,
                second
            ),
            Issue::ObjectiveNameClash { name, row } => {
                write!(f, "objective name '{}' also names row {}", name, row)
            }
            Issue::SemiContinuousUnbounded { column } => write!(
                f,
                "semi-continuous column {} needs a finite upper bound",
                column
            ),
            Issue::SosMemberOutOfRange { set, column } => {
                write!(f, "SOS set {} references missing column {}", set, column)
            }
            Issue::SosMemberDuplicated { set, column } => {
                write!(f, "SOS set {} lists column {} twice", set, column)
            }
            Issue::SosWeightsNotDistinct { set } => {
                write!(f, "SOS set {} reference weights are not distinct", set)
            }
            Issue::PriorityColumnOutOfRange { column } => {
                write!(f, "branching priority references missing column {}", column)
            }
        }
    }
}

/// Every issue found by one consistency check.
#[derive(Debug, Clone, PartialEq)]
pub struct ConsistencyError {
    pub issues: Vec<Issue>,
}

impl ConsistencyError {
    pub fn code(&self) -> &'static str {
        "PROBLEM_INCONSISTENT"
    }
}

impl fmt::Display for ConsistencyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}] Problem check found {} issue(s)",
            self.code(),
            self.issues.len()
        )?;
        for issue in &self.issues {
            write!(f, "; {issue}")?;
        }
        Ok(())
    }
}

impl std::error::Error for ConsistencyError {}
