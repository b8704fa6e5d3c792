//! Solver configuration types.

use serde::{Deserialize, Serialize};

use crate::SolverError;

/// Configuration options for solver behavior.
///
/// Every field is optional; `None` means the engine picks its own default.
/// The struct deserializes from JSON so configuration can live in a file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SolverConfig {
    /// Time limit in seconds. `None` means no limit.
    pub time_limit: Option<f64>,
    /// Maximum simplex iterations over the whole solve.
    pub iteration_limit: Option<u64>,
    /// Maximum branch-and-bound nodes.
    pub node_limit: Option<u64>,
    /// Relative MIP gap at which branch-and-bound stops.
    pub mip_gap: Option<f64>,
    /// Primal feasibility tolerance.
    pub tolerance: Option<f64>,
    /// Distance from an integer below which a value counts as integral.
    pub integer_tolerance: Option<f64>,
    /// Verbosity level. `None` uses solver default.
    pub verbosity: Option<u32>,
    /// Log solver output to console. `None` uses solver default.
    pub log_to_console: Option<bool>,
}

impl SolverConfig {
    /// Create a new configuration with all defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the time limit in seconds.
    pub fn with_time_limit(mut self, seconds: f64) -> Self {
        self.time_limit = Some(seconds);
        self
    }

    /// Set the iteration limit.
    pub fn with_iteration_limit(mut self, iterations: u64) -> Self {
        self.iteration_limit = Some(iterations);
        self
    }

    /// Set the branch-and-bound node limit.
    pub fn with_node_limit(mut self, nodes: u64) -> Self {
        self.node_limit = Some(nodes);
        self
    }

    /// Set the relative MIP gap tolerance.
    pub fn with_mip_gap(mut self, gap: f64) -> Self {
        self.mip_gap = Some(gap);
        self
    }

    /// Set the feasibility tolerance.
    pub fn with_tolerance(mut self, tol: f64) -> Self {
        self.tolerance = Some(tol);
        self
    }

    /// Set the integrality tolerance.
    pub fn with_integer_tolerance(mut self, tol: f64) -> Self {
        self.integer_tolerance = Some(tol);
        self
    }

    /// Set the verbosity level.
    pub fn with_verbosity(mut self, level: u32) -> Self {
        self.verbosity = Some(level);
        self
    }

    /// Enable or disable console logging.
    pub fn with_log_to_console(mut self, enabled: bool) -> Self {
        self.log_to_console = Some(enabled);
        self
    }

    /// Check if this configuration is completely empty (all defaults).
    pub fn is_empty(&self) -> bool {
        self.time_limit.is_none()
            && self.iteration_limit.is_none()
            && self.node_limit.is_none()
            && self.mip_gap.is_none()
            && self.tolerance.is_none()
            && self.integer_tolerance.is_none()
            && self.verbosity.is_none()
            && self.log_to_console.is_none()
    }

    /// Reject values no engine can honor.
    pub fn validate(&self) -> Result<(), SolverError> {
        let non_negative = [
            ("time_limit", self.time_limit),
            ("mip_gap", self.mip_gap),
        ];
        for (field, value) in non_negative {
            if let Some(value) = value.filter(|v| v.is_nan() || *v < 0.0) {
                return Err(SolverError::InvalidConfig { field, value });
            }
        }
        let positive = [
            ("tolerance", self.tolerance),
            ("integer_tolerance", self.integer_tolerance),
        ];
        for (field, value) in positive {
            if let Some(value) = value.filter(|v| !v.is_finite() || *v <= 0.0) {
                return Err(SolverError::InvalidConfig { field, value });
            }
        }
        Ok(())
    }
}
