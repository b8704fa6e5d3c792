//! Progress callbacks.
//!
//! Engines report through a [`SolveEvents`] sink, synchronously on the
//! solving thread. Every report returns a [`CallbackControl`]; `Abort` asks
//! the engine to stop at the next opportunity.

use serde::Serialize;

/// Cooperative continue/abort signal returned by callbacks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CallbackControl {
    #[default]
    Continue,
    Abort,
}

impl CallbackControl {
    /// Map an integer return code: zero continues, anything else aborts.
    pub fn from_code(code: i32) -> Self {
        if code == 0 {
            CallbackControl::Continue
        } else {
            CallbackControl::Abort
        }
    }

    pub fn code(self) -> i32 {
        match self {
            CallbackControl::Continue => 0,
            CallbackControl::Abort => 1,
        }
    }

    pub fn is_abort(self) -> bool {
        matches!(self, CallbackControl::Abort)
    }
}

/// One simplex iteration of an LP solve.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct LpIterationEvent {
    pub iteration: u64,
    pub objective_value: f64,
    pub is_feasible: bool,
    /// Sum of infeasibilities; zero once feasible.
    pub infeasibility: f64,
}

/// One branch-and-bound node of a MIP solve.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MipNodeEvent {
    pub iteration: u64,
    pub node: u64,
    pub best_bound: f64,
    /// Incumbent objective; infinite in the worsening direction until found.
    pub best_integer: f64,
    /// Whether this node produced a new incumbent.
    pub is_improved: bool,
}

/// Receives diagnostic text.
pub trait MessageLogCallback {
    fn on_message(&mut self, message: &str) -> CallbackControl;
}

/// Receives one event per simplex iteration.
pub trait LpIterationCallback {
    fn on_iteration(&mut self, event: &LpIterationEvent) -> CallbackControl;
}

/// Receives one event per branch-and-bound node.
pub trait MipNodeCallback {
    fn on_node(&mut self, event: &MipNodeEvent) -> CallbackControl;
}

impl<F> MessageLogCallback for F
where
    F: FnMut(&str) -> CallbackControl,
{
    fn on_message(&mut self, message: &str) -> CallbackControl {
        self(message)
    }
}

impl<F> LpIterationCallback for F
where
    F: FnMut(&LpIterationEvent) -> CallbackControl,
{
    fn on_iteration(&mut self, event: &LpIterationEvent) -> CallbackControl {
        self(event)
    }
}

impl<F> MipNodeCallback for F
where
    F: FnMut(&MipNodeEvent) -> CallbackControl,
{
    fn on_node(&mut self, event: &MipNodeEvent) -> CallbackControl {
        self(event)
    }
}

/// Sink through which an engine reports progress.
pub trait SolveEvents {
    fn message(&mut self, text: &str) -> CallbackControl;

    fn lp_iteration(&mut self, event: &LpIterationEvent) -> CallbackControl;

    fn mip_node(&mut self, event: &MipNodeEvent) -> CallbackControl;
}

/// Event sink that ignores everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct SilentEvents;

impl SolveEvents for SilentEvents {
    fn message(&mut self, _text: &str) -> CallbackControl {
        CallbackControl::Continue
    }

    fn lp_iteration(&mut self, _event: &LpIterationEvent) -> CallbackControl {
        CallbackControl::Continue
    }

    fn mip_node(&mut self, _event: &MipNodeEvent) -> CallbackControl {
        CallbackControl::Continue
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_control_from_code() {
        assert_eq!(CallbackControl::from_code(0), CallbackControl::Continue);
        assert_eq!(CallbackControl::from_code(1), CallbackControl::Abort);
        assert_eq!(CallbackControl::from_code(-7), CallbackControl::Abort);
        assert!(CallbackControl::Abort.is_abort());
        assert_eq!(CallbackControl::Continue.code(), 0);
    }

    #[test]
    fn test_closures_are_callbacks() {
        let mut seen = Vec::new();
        {
            let mut callback = |event: &LpIterationEvent| {
                seen.push(event.iteration);
                CallbackControl::from_code(i32::from(event.iteration >= 2))
            };
            for iteration in 1..=3 {
                let control = callback.on_iteration(&LpIterationEvent {
                    iteration,
                    objective_value: 0.0,
                    is_feasible: true,
                    infeasibility: 0.0,
                });
                if control.is_abort() {
                    break;
                }
            }
        }
        assert_eq!(seen, vec![1, 2]);
    }

    #[test]
    fn test_silent_events_continue() {
        let mut events = SilentEvents;
        assert_eq!(events.message("hello"), CallbackControl::Continue);
        let node = MipNodeEvent {
            iteration: 4,
            node: 1,
            best_bound: 10.0,
            best_integer: f64::INFINITY,
            is_improved: false,
        };
        assert_eq!(events.mip_node(&node), CallbackControl::Continue);
    }
}
