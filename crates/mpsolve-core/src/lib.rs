//! Problem descriptor for linear and mixed-integer programs.

pub mod format;
pub mod problem;
pub mod types;

pub use format::{FileFormat, FormatError};
pub use problem::{
    BranchPriority, ConsistencyError, CscMatrix, Issue, MatrixInput, NameKind, NameTable, Problem,
    ProblemError, SosInput, SosMember, SosSet, DEFAULT_OBJECTIVE_NAME, INFINITY_THRESHOLD,
    PACKED_NAME_DELIMITER,
};
pub use types::{BranchDirection, Bounds, ColumnType, ProblemClass, RowType, Sense, SosKind};
