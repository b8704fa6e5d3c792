//! Iteration and time budget shared by every LP solved in one run.

use std::time::{Duration, Instant};

#[derive(Debug, Clone)]
pub(crate) struct Budget {
    iteration_limit: Option<u64>,
    deadline: Option<Instant>,
    iterations: u64,
}

impl Budget {
    pub(crate) fn new(iteration_limit: Option<u64>, time_limit: Option<f64>) -> Self {
        Self {
            iteration_limit,
            deadline: time_limit
                .and_then(|seconds| Duration::try_from_secs_f64(seconds).ok())
                .map(|limit| Instant::now() + limit),
            iterations: 0,
        }
    }

    #[cfg(test)]
    pub(crate) fn unlimited() -> Self {
        Self::new(None, None)
    }

    pub(crate) fn iterations(&self) -> u64 {
        self.iterations
    }

    pub(crate) fn count_iteration(&mut self) {
        self.iterations += 1;
    }

    /// Whether another pivot would exceed a limit.
    pub(crate) fn exhausted(&self) -> bool {
        self.iteration_limit
            .is_some_and(|limit| self.iterations >= limit)
            || self.deadline.is_some_and(|deadline| Instant::now() >= deadline)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_iteration_limit_exhausts() {
        let mut budget = Budget::new(Some(2), None);
        assert!(!budget.exhausted());
        budget.count_iteration();
        budget.count_iteration();
        assert!(budget.exhausted());
        assert_eq!(budget.iterations(), 2);
    }

    #[test]
    fn test_zero_time_limit_exhausts() {
        let budget = Budget::new(None, Some(0.0));
        assert!(budget.exhausted());
        assert!(!Budget::unlimited().exhausted());
    }
}
