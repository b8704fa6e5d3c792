//! Status conversions for the HiGHS engine.

use crate::ffi::HighsStatus;
use mpsolve_solver::SolutionStatus;

pub(crate) fn solution_status(status: HighsStatus) -> SolutionStatus {
    match status {
        HighsStatus::Optimal => SolutionStatus::Optimal,
        HighsStatus::Infeasible => SolutionStatus::Infeasible,
        HighsStatus::Unbounded | HighsStatus::UnboundedOrInfeasible => SolutionStatus::Unbounded,
        HighsStatus::ReachedTimeLimit | HighsStatus::ReachedIterationLimit => {
            SolutionStatus::Limit
        }
        HighsStatus::Failed | HighsStatus::Unknown => SolutionStatus::Error,
    }
}

/// Whether HiGHS leaves primal values worth reporting.
pub(crate) fn has_solution(status: HighsStatus) -> bool {
    matches!(
        status,
        HighsStatus::Optimal | HighsStatus::ReachedTimeLimit | HighsStatus::ReachedIterationLimit
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(solution_status(HighsStatus::Optimal), SolutionStatus::Optimal);
        assert_eq!(
            solution_status(HighsStatus::UnboundedOrInfeasible),
            SolutionStatus::Unbounded
        );
        assert_eq!(
            solution_status(HighsStatus::ReachedIterationLimit),
            SolutionStatus::Limit
        );
        assert_eq!(solution_status(HighsStatus::Failed), SolutionStatus::Error);
    }

    #[test]
    fn test_has_solution() {
        assert!(has_solution(HighsStatus::Optimal));
        assert!(has_solution(HighsStatus::ReachedTimeLimit));
        assert!(!has_solution(HighsStatus::Infeasible));
        assert!(!has_solution(HighsStatus::Unknown));
    }
}
