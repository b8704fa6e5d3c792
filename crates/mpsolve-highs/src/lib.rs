//! HiGHS engine adapter for mpsolve.
//!
//! [`HighsEngine`] hands a loaded [`mpsolve_core::Problem`] to the HiGHS
//! library row by row and maps the outcome back to an
//! [`mpsolve_solver::Solution`].

pub mod engine;
pub mod ffi;
mod status;

pub use engine::HighsEngine;
pub use ffi::{HighsModel, HighsModelError, HighsOption, HighsOutcome, HighsStatus, highs_version};
