//! Solution status types.

use serde::{Deserialize, Serialize};

/// Outcome of a solve that ran to completion.
///
/// Codes are stable and the text is a fixed rendering of the code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SolutionStatus {
    /// Optimal solution found.
    Optimal,
    /// No point satisfies the constraints.
    Infeasible,
    /// Objective can improve without bound.
    Unbounded,
    /// Stopped on an iteration, node or time limit.
    Limit,
    /// Stopped on a numerical or internal failure.
    Error,
    /// A callback asked the solve to stop.
    UserAbort,
    /// Optimize has not run yet.
    #[default]
    NotSolved,
}

impl SolutionStatus {
    /// Numeric status code.
    pub fn code(self) -> i32 {
        match self {
            SolutionStatus::Optimal => 0,
            SolutionStatus::Infeasible => 1,
            SolutionStatus::Unbounded => 2,
            SolutionStatus::Limit => 3,
            SolutionStatus::Error => 4,
            SolutionStatus::UserAbort => 5,
            SolutionStatus::NotSolved => -1,
        }
    }

    pub fn from_code(code: i32) -> Option<Self> {
        match code {
            0 => Some(SolutionStatus::Optimal),
            1 => Some(SolutionStatus::Infeasible),
            2 => Some(SolutionStatus::Unbounded),
            3 => Some(SolutionStatus::Limit),
            4 => Some(SolutionStatus::Error),
            5 => Some(SolutionStatus::UserAbort),
            -1 => Some(SolutionStatus::NotSolved),
            _ => None,
        }
    }

    /// Human-readable status text.
    pub fn text(self) -> &'static str {
        match self {
            SolutionStatus::Optimal => "Optimal solution found",
            SolutionStatus::Infeasible => "Problem primal infeasible",
            SolutionStatus::Unbounded => "Problem dual infeasible",
            SolutionStatus::Limit => "Stopped on iterations or time",
            SolutionStatus::Error => "Stopped due to errors",
            SolutionStatus::UserAbort => "Stopped by user",
            SolutionStatus::NotSolved => "Problem not solved",
        }
    }

    /// Short machine-friendly name.
    pub fn as_str(self) -> &'static str {
        match self {
            SolutionStatus::Optimal => "optimal",
            SolutionStatus::Infeasible => "infeasible",
            SolutionStatus::Unbounded => "unbounded",
            SolutionStatus::Limit => "limit",
            SolutionStatus::Error => "error",
            SolutionStatus::UserAbort => "user_abort",
            SolutionStatus::NotSolved => "not_solved",
        }
    }

    /// Check if the status indicates an optimal solution.
    pub fn is_optimal(self) -> bool {
        matches!(self, SolutionStatus::Optimal)
    }

    /// Check if the status indicates infeasibility.
    pub fn is_infeasible(self) -> bool {
        matches!(self, SolutionStatus::Infeasible)
    }

    /// Check if the status indicates unboundedness.
    pub fn is_unbounded(self) -> bool {
        matches!(self, SolutionStatus::Unbounded)
    }

    /// Check if the solve stopped before reaching its natural end.
    pub fn is_interrupted(self) -> bool {
        matches!(self, SolutionStatus::Limit | SolutionStatus::UserAbort)
    }
}

impl std::fmt::Display for SolutionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.text())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL: [SolutionStatus; 7] = [
        SolutionStatus::Optimal,
        SolutionStatus::Infeasible,
        SolutionStatus::Unbounded,
        SolutionStatus::Limit,
        SolutionStatus::Error,
        SolutionStatus::UserAbort,
        SolutionStatus::NotSolved,
    ];

    #[test]
    fn test_codes_are_stable() {
        assert_eq!(SolutionStatus::Optimal.code(), 0);
        assert_eq!(SolutionStatus::UserAbort.code(), 5);
        assert_eq!(SolutionStatus::NotSolved.code(), -1);
        for status in ALL {
            assert_eq!(SolutionStatus::from_code(status.code()), Some(status));
        }
        assert_eq!(SolutionStatus::from_code(42), None);
    }

    #[test]
    fn test_text_matches_code() {
        assert_eq!(SolutionStatus::Optimal.text(), "Optimal solution found");
        assert_eq!(SolutionStatus::Infeasible.text(), "Problem primal infeasible");
        assert_eq!(format!("{}", SolutionStatus::UserAbort), "Stopped by user");
    }

    #[test]
    fn test_default_is_not_solved() {
        assert_eq!(SolutionStatus::default(), SolutionStatus::NotSolved);
    }

    #[test]
    fn test_status_predicates() {
        assert!(SolutionStatus::Optimal.is_optimal());
        assert!(!SolutionStatus::Limit.is_optimal());
        assert!(SolutionStatus::Infeasible.is_infeasible());
        assert!(SolutionStatus::Unbounded.is_unbounded());
        assert!(SolutionStatus::UserAbort.is_interrupted());
        assert!(!SolutionStatus::Error.is_interrupted());
    }
}
