//! Shared solve abstractions for mpsolve engines.
//!
//! This crate provides the types an engine (like `mpsolve-simplex` or
//! `mpsolve-highs`) uses to report progress and results.
//!
//! # Overview
//!
//! - [`SolverConfig`]: Configuration options for solver behavior
//! - [`SolutionStatus`]: Outcome of a completed solve, with stable codes
//! - [`SolverError`]: Call failures (the solve did not run to completion)
//! - [`Solution`]: Primal values, activities and solve statistics
//! - [`SolveEvents`]: Sink through which an engine reports progress
//! - [`Engine`]: Trait for engine implementations

mod callback;
mod config;
mod error;
mod solution;
mod status;
mod traits;

pub use callback::{
    CallbackControl, LpIterationCallback, LpIterationEvent, MessageLogCallback, MipNodeCallback,
    MipNodeEvent, SilentEvents, SolveEvents,
};
pub use config::SolverConfig;
pub use error::SolverError;
pub use solution::Solution;
pub use status::SolutionStatus;
pub use traits::Engine;
