//! Built-in engine for mpsolve.
//!
//! [`SimplexEngine`] solves linear problems with a dense two-phase primal
//! simplex and mixed problems (integers, semi-continuous columns, SOS sets)
//! with depth-first branch-and-bound over the same simplex.

mod branching;
mod budget;
mod engine;
mod relaxation;
mod search;
mod settings;
mod standard;
mod tableau;

#[cfg(test)]
mod tests;

pub use engine::SimplexEngine;
pub use settings::{DEFAULT_INTEGER_TOLERANCE, DEFAULT_MIP_GAP, DEFAULT_TOLERANCE};
