//! Solver error types.
//!
//! A [`SolverError`] means the solve did not run to completion. A solve that
//! finishes without an optimal point is an `Ok` result with a non-optimal
//! [`SolutionStatus`](crate::SolutionStatus).

/// Error type for solver operations.
#[derive(Debug, Clone, PartialEq)]
pub enum SolverError {
    /// Problem has no loaded matrix.
    NotLoaded,
    /// Configuration value out of range.
    InvalidConfig { field: &'static str, value: f64 },
    /// Engine cannot handle a feature of the problem.
    Unsupported {
        engine: &'static str,
        feature: &'static str,
    },
    /// Linear algebra broke down.
    Numerical(String),
    /// Internal solver error.
    InternalError(String),
}

impl SolverError {
    /// Returns a semantic error code for programmatic handling.
    pub fn code(&self) -> &'static str {
        match self {
            SolverError::NotLoaded => "SOLVER_PROBLEM_NOT_LOADED",
            SolverError::InvalidConfig { .. } => "CONFIG_INVALID",
            SolverError::Unsupported { .. } => "SOLVER_UNSUPPORTED",
            SolverError::Numerical(_) => "SOLVER_NUMERICAL",
            SolverError::InternalError(_) => "SOLVER_INTERNAL",
        }
    }
}

impl std::fmt::Display for SolverError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SolverError::NotLoaded => {
                write!(f, "[{}] Problem has no loaded matrix", self.code())
            }
            SolverError::InvalidConfig { field, value } => write!(
                f,
                "[{}] Configuration value {} = {} is out of range",
                self.code(),
                field,
                value
            ),
            SolverError::Unsupported { engine, feature } => write!(
                f,
                "[{}] Engine {} does not support {}",
                self.code(),
                engine,
                feature
            ),
            SolverError::Numerical(msg) => {
                write!(f, "[{}] Numerical failure: {}", self.code(), msg)
            }
            SolverError::InternalError(msg) => {
                write!(f, "[{}] Solver internal error: {}", self.code(), msg)
            }
        }
    }
}

impl std::error::Error for SolverError {}
