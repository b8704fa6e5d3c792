//! Engine settings resolved from a [`SolverConfig`].

use mpsolve_solver::SolverConfig;

/// Primal feasibility and reduced-cost tolerance.
pub const DEFAULT_TOLERANCE: f64 = 1e-7;
/// Distance from an integer accepted as integral.
pub const DEFAULT_INTEGER_TOLERANCE: f64 = 1e-6;
/// Relative gap below which a node is pruned against the incumbent.
pub const DEFAULT_MIP_GAP: f64 = 1e-9;

#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct Settings {
    pub(crate) tolerance: f64,
    pub(crate) integer_tolerance: f64,
    pub(crate) mip_gap: f64,
    pub(crate) iteration_limit: Option<u64>,
    pub(crate) node_limit: Option<u64>,
    pub(crate) time_limit: Option<f64>,
}

impl Settings {
    pub(crate) fn from_config(config: &SolverConfig) -> Self {
        Self {
            tolerance: config.tolerance.unwrap_or(DEFAULT_TOLERANCE),
            integer_tolerance: config
                .integer_tolerance
                .unwrap_or(DEFAULT_INTEGER_TOLERANCE),
            mip_gap: config.mip_gap.unwrap_or(DEFAULT_MIP_GAP),
            iteration_limit: config.iteration_limit,
            node_limit: config.node_limit,
            time_limit: config.time_limit,
        }
    }
}
