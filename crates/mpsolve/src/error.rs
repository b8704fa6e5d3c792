//! Handle error taxonomy.
//!
//! Load, consistency, call and file failures stay separate variants so a
//! caller can continue past a failed check but stop on a failed optimize.
//! A solve that runs to completion without an optimal point is not an
//! error; it is reported through [`SolutionStatus`](mpsolve_solver::SolutionStatus).

use std::fmt;

use mpsolve_core::{ConsistencyError, FormatError, ProblemError};
use mpsolve_solver::SolverError;

use crate::handle::HandleState;

/// Error type for [`SolverHandle`](crate::SolverHandle) operations.
#[derive(Debug, Clone, PartialEq)]
pub enum HandleError {
    /// Malformed problem data was rejected by a loader.
    Load(ProblemError),
    /// The consistency check found issues.
    Consistency(ConsistencyError),
    /// Optimize could not run to completion.
    Call(SolverError),
    /// A problem file could not be written or read.
    File(FormatError),
    /// Operation not permitted in the handle's current state.
    InvalidState {
        operation: &'static str,
        state: HandleState,
    },
    /// Solution data queried before a solve produced it.
    SolutionUnavailable { operation: &'static str },
}

impl HandleError {
    /// Returns a semantic error code for programmatic handling.
    pub fn code(&self) -> &'static str {
        match self {
            HandleError::Load(_) => "HANDLE_LOAD",
            HandleError::Consistency(_) => "HANDLE_CONSISTENCY",
            HandleError::Call(_) => "HANDLE_CALL",
            HandleError::File(_) => "HANDLE_FILE",
            HandleError::InvalidState { .. } => "HANDLE_INVALID_STATE",
            HandleError::SolutionUnavailable { .. } => "HANDLE_SOLUTION_UNAVAILABLE",
        }
    }

    /// Whether a caller may keep going after this error.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, HandleError::Consistency(_))
    }
}

impl fmt::Display for HandleError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HandleError::Load(err) => write!(f, "[{}] {}", self.code(), err),
            HandleError::Consistency(err) => write!(f, "[{}] {}", self.code(), err),
            HandleError::Call(err) => write!(f, "[{}] {}", self.code(), err),
            HandleError::File(err) => write!(f, "[{}] {}", self.code(), err),
            HandleError::InvalidState { operation, state } => write!(
                f,
                "[{}] {} is not allowed while the handle is {}",
                self.code(),
                operation,
                state.as_str()
            ),
            HandleError::SolutionUnavailable { operation } => write!(
                f,
                "[{}] {} needs a solution; optimize has not produced one",
                self.code(),
                operation
            ),
        }
    }
}

impl std::error::Error for HandleError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            HandleError::Load(err) => Some(err),
            HandleError::Consistency(err) => Some(err),
            HandleError::Call(err) => Some(err),
            HandleError::File(err) => Some(err),
            HandleError::InvalidState { .. } | HandleError::SolutionUnavailable { .. } => None,
        }
    }
}

impl From<ProblemError> for HandleError {
    fn from(err: ProblemError) -> Self {
        HandleError::Load(err)
    }
}

impl From<ConsistencyError> for HandleError {
    fn from(err: ConsistencyError) -> Self {
        HandleError::Consistency(err)
    }
}

impl From<SolverError> for HandleError {
    fn from(err: SolverError) -> Self {
        HandleError::Call(err)
    }
}

impl From<FormatError> for HandleError {
    fn from(err: FormatError) -> Self {
        HandleError::File(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_carries_code() {
        let err = HandleError::InvalidState {
            operation: "optimize",
            state: HandleState::Created,
        };
        assert_eq!(
            err.to_string(),
            "[HANDLE_INVALID_STATE] optimize is not allowed while the handle is created"
        );
        let err = HandleError::from(SolverError::NotLoaded);
        assert!(err.to_string().starts_with("[HANDLE_CALL] [SOLVER_PROBLEM_NOT_LOADED]"));
    }

    #[test]
    fn test_only_consistency_is_recoverable() {
        let consistency = HandleError::from(ConsistencyError { issues: Vec::new() });
        assert!(consistency.is_recoverable());
        assert!(!HandleError::from(ProblemError::AlreadyLoaded).is_recoverable());
        assert!(
            !HandleError::SolutionUnavailable {
                operation: "objective_value"
            }
            .is_recoverable()
        );
    }
}
