//! Engine trait for abstraction over different solver backends.

use mpsolve_core::Problem;

use crate::{SolveEvents, Solution, SolverConfig, SolverError};

/// Trait for solver engine implementations.
///
/// An engine receives a loaded problem and runs LP or branch-and-bound
/// depending on the problem class. Progress is reported through `events`,
/// and an `Abort` from any report ends the solve with
/// [`SolutionStatus::UserAbort`](crate::SolutionStatus::UserAbort).
pub trait Engine {
    /// Short engine name used in logs.
    fn name(&self) -> &'static str;

    /// Solve the problem with the given configuration.
    ///
    /// # Errors
    ///
    /// Returns a `SolverError` when the solve could not run to completion:
    /// - The problem has no loaded matrix
    /// - The configuration is out of range
    /// - The engine does not support a problem feature
    /// - The engine failed internally
    fn solve(
        &mut self,
        problem: &Problem,
        config: &SolverConfig,
        events: &mut dyn SolveEvents,
    ) -> Result<Solution, SolverError>;
}
