//! Solver handles for linear and mixed-integer programs.
//!
//! A [`SolverHandle`] owns one problem and walks it through
//! load, check, optimize and query. [`SolveRequest`] runs that whole
//! sequence from owned arrays and returns a serializable [`SolveReport`].
//!
//! The built-in [`SimplexEngine`] is always available; enable the `highs`
//! feature for `HighsEngine`.

pub mod callbacks;
pub mod error;
pub mod handle;
pub mod logging;
pub mod pipeline;

pub use callbacks::{CallbackRegistry, ProgressKind};
pub use error::HandleError;
pub use handle::{HandleState, SolverHandle};
pub use logging::{LoggingError, enable_logging};
pub use pipeline::{
    MatrixData, NameSource, NamedValue, ProgressEvent, SolveReport, SolveRequest, WriteStage,
    WriteTarget,
};

pub use mpsolve_core::format::{self, FileFormat, FormatError};
pub use mpsolve_core::{
    BranchDirection, BranchPriority, ColumnType, ConsistencyError, Issue, MatrixInput, Problem,
    ProblemClass, ProblemError, RowType, Sense, SosInput, SosKind, SosMember, SosSet,
};
pub use mpsolve_simplex::SimplexEngine;
pub use mpsolve_solver::{
    CallbackControl, Engine, LpIterationEvent, MipNodeEvent, Solution, SolutionStatus,
    SolverConfig, SolverError,
};

#[cfg(feature = "highs")]
pub use mpsolve_highs::HighsEngine;
