//! Per-handle callback slots.

use mpsolve_solver::{
    CallbackControl, LpIterationCallback, LpIterationEvent, MessageLogCallback, MipNodeCallback,
    MipNodeEvent, SolveEvents,
};
use tracing::trace;

/// Which progress callback shape is registered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProgressKind {
    LpIteration,
    MipNode,
}

impl ProgressKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ProgressKind::LpIteration => "lp_iteration",
            ProgressKind::MipNode => "mip_node",
        }
    }
}

enum ProgressSlot {
    LpIteration(Box<dyn LpIterationCallback>),
    MipNode(Box<dyn MipNodeCallback>),
}

/// One message-log slot and one progress slot.
///
/// Registering into an occupied slot replaces the previous callback. The
/// progress slot holds either an LP-iteration or a MIP-node callback, never
/// both; events of the other shape are acknowledged with `Continue` and
/// dropped.
#[derive(Default)]
pub struct CallbackRegistry {
    message_log: Option<Box<dyn MessageLogCallback>>,
    progress: Option<ProgressSlot>,
}

impl CallbackRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_message_log(&mut self, callback: impl MessageLogCallback + 'static) {
        self.message_log = Some(Box::new(callback));
    }

    pub fn set_lp_iteration(&mut self, callback: impl LpIterationCallback + 'static) {
        self.progress = Some(ProgressSlot::LpIteration(Box::new(callback)));
    }

    pub fn set_mip_node(&mut self, callback: impl MipNodeCallback + 'static) {
        self.progress = Some(ProgressSlot::MipNode(Box::new(callback)));
    }

    pub fn clear_message_log(&mut self) {
        self.message_log = None;
    }

    pub fn clear_progress(&mut self) {
        self.progress = None;
    }

    pub fn has_message_log(&self) -> bool {
        self.message_log.is_some()
    }

    pub fn progress_kind(&self) -> Option<ProgressKind> {
        self.progress.as_ref().map(|slot| match slot {
            ProgressSlot::LpIteration(_) => ProgressKind::LpIteration,
            ProgressSlot::MipNode(_) => ProgressKind::MipNode,
        })
    }

    /// Route handle diagnostics to the message-log slot.
    ///
    /// Outside a solve there is nothing to abort, so the return value is
    /// dropped.
    pub(crate) fn log(&mut self, text: &str) {
        if let Some(callback) = self.message_log.as_mut() {
            let _ = callback.on_message(text);
        }
    }
}

impl SolveEvents for CallbackRegistry {
    fn message(&mut self, text: &str) -> CallbackControl {
        match self.message_log.as_mut() {
            Some(callback) => callback.on_message(text),
            None => CallbackControl::Continue,
        }
    }

    fn lp_iteration(&mut self, event: &LpIterationEvent) -> CallbackControl {
        match self.progress.as_mut() {
            Some(ProgressSlot::LpIteration(callback)) => {
                let control = callback.on_iteration(event);
                if control.is_abort() {
                    trace!(
                        component = "callbacks",
                        operation = "lp_iteration",
                        status = "success",
                        iteration = event.iteration,
                        "Callback requested abort"
                    );
                }
                control
            }
            _ => CallbackControl::Continue,
        }
    }

    fn mip_node(&mut self, event: &MipNodeEvent) -> CallbackControl {
        match self.progress.as_mut() {
            Some(ProgressSlot::MipNode(callback)) => {
                let control = callback.on_node(event);
                if control.is_abort() {
                    trace!(
                        component = "callbacks",
                        operation = "mip_node",
                        status = "success",
                        node = event.node,
                        "Callback requested abort"
                    );
                }
                control
            }
            _ => CallbackControl::Continue,
        }
    }
}

impl std::fmt::Debug for CallbackRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CallbackRegistry")
            .field("message_log", &self.has_message_log())
            .field("progress", &self.progress_kind())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn lp_event(iteration: u64) -> LpIterationEvent {
        LpIterationEvent {
            iteration,
            objective_value: 1.0,
            is_feasible: true,
            infeasibility: 0.0,
        }
    }

    fn node_event(node: u64) -> MipNodeEvent {
        MipNodeEvent {
            iteration: 3,
            node,
            best_bound: 2.0,
            best_integer: 1.0,
            is_improved: false,
        }
    }

    #[test]
    fn test_empty_registry_continues() {
        let mut registry = CallbackRegistry::new();
        assert_eq!(registry.message("hello"), CallbackControl::Continue);
        assert_eq!(registry.lp_iteration(&lp_event(1)), CallbackControl::Continue);
        assert_eq!(registry.mip_node(&node_event(1)), CallbackControl::Continue);
        assert_eq!(registry.progress_kind(), None);
    }

    #[test]
    fn test_last_registrant_wins() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let mut registry = CallbackRegistry::new();

        let first = Rc::clone(&seen);
        registry.set_lp_iteration(move |event: &LpIterationEvent| {
            first.borrow_mut().push(("lp", event.iteration));
            CallbackControl::Continue
        });
        let second = Rc::clone(&seen);
        registry.set_mip_node(move |event: &MipNodeEvent| {
            second.borrow_mut().push(("node", event.node));
            CallbackControl::Abort
        });
        assert_eq!(registry.progress_kind(), Some(ProgressKind::MipNode));

        // LP events no longer reach anyone once the node callback replaced it.
        assert_eq!(registry.lp_iteration(&lp_event(7)), CallbackControl::Continue);
        assert_eq!(registry.mip_node(&node_event(4)), CallbackControl::Abort);
        assert_eq!(*seen.borrow(), vec![("node", 4)]);
    }

    #[test]
    fn test_message_log_receives_handle_diagnostics() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        let mut registry = CallbackRegistry::new();
        registry.set_message_log(move |text: &str| {
            sink.borrow_mut().push(text.to_string());
            CallbackControl::Abort
        });
        registry.log("loaded");
        assert_eq!(registry.message("solving"), CallbackControl::Abort);
        assert_eq!(*seen.borrow(), vec!["loaded".to_string(), "solving".to_string()]);

        registry.clear_message_log();
        assert!(!registry.has_message_log());
        assert_eq!(registry.message("quiet"), CallbackControl::Continue);
    }
}
