//! Solver handle: one problem, one engine, one lifecycle.

use std::borrow::Cow;
use std::path::Path;
use std::time::Instant;

use mpsolve_core::format::{self, FileFormat};
use mpsolve_core::{BranchPriority, ColumnType, MatrixInput, Problem, ProblemClass, SosInput, SosSet};
use mpsolve_simplex::SimplexEngine;
use mpsolve_solver::{
    Engine, LpIterationCallback, MessageLogCallback, MipNodeCallback, Solution, SolutionStatus,
    SolverConfig,
};
use serde::Serialize;
use tracing::{debug, warn};

use crate::callbacks::{CallbackRegistry, ProgressKind};
use crate::error::HandleError;

/// Lifecycle position of a [`SolverHandle`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum HandleState {
    /// Named but empty.
    Created,
    /// Matrix loaded; names and annotations may still change.
    Loaded,
    /// Last check passed and nothing was loaded since.
    Checked,
    /// Optimize ran to completion.
    Optimized,
}

impl HandleState {
    pub fn as_str(self) -> &'static str {
        match self {
            HandleState::Created => "created",
            HandleState::Loaded => "loaded",
            HandleState::Checked => "checked",
            HandleState::Optimized => "optimized",
        }
    }
}

/// Owned session over one [`Problem`].
///
/// The handle moves through `Created → Loaded → Checked → Optimized`;
/// operations called out of order fail with [`HandleError::InvalidState`].
/// Dropping the handle, or calling [`unload`](Self::unload), releases the
/// problem, the solution and every registered callback.
pub struct SolverHandle<E: Engine = SimplexEngine> {
    problem: Problem,
    engine: E,
    config: SolverConfig,
    callbacks: CallbackRegistry,
    state: HandleState,
    solution: Option<Solution>,
}

impl SolverHandle<SimplexEngine> {
    /// Create an empty handle on the built-in engine.
    pub fn new(name: impl Into<String>) -> Self {
        Self::with_engine(name, SimplexEngine::new())
    }

    /// Wrap an already loaded problem, for example one read from a file.
    pub fn from_problem(problem: Problem) -> Self {
        Self::from_problem_with_engine(problem, SimplexEngine::new())
    }
}

impl<E: Engine> SolverHandle<E> {
    pub fn with_engine(name: impl Into<String>, engine: E) -> Self {
        let problem = Problem::new(name);
        debug!(
            component = "handle",
            operation = "create",
            status = "success",
            problem = %problem.name(),
            engine = engine.name(),
            "Created solver handle"
        );
        Self {
            problem,
            engine,
            config: SolverConfig::new(),
            callbacks: CallbackRegistry::new(),
            state: HandleState::Created,
            solution: None,
        }
    }

    pub fn from_problem_with_engine(problem: Problem, engine: E) -> Self {
        let state = if problem.is_loaded() {
            HandleState::Loaded
        } else {
            HandleState::Created
        };
        debug!(
            component = "handle",
            operation = "create",
            status = "success",
            problem = %problem.name(),
            engine = engine.name(),
            state = state.as_str(),
            "Created solver handle from problem"
        );
        Self {
            problem,
            engine,
            config: SolverConfig::new(),
            callbacks: CallbackRegistry::new(),
            state,
            solution: None,
        }
    }

    pub fn state(&self) -> HandleState {
        self.state
    }

    pub fn problem(&self) -> &Problem {
        &self.problem
    }

    pub fn engine_name(&self) -> &'static str {
        self.engine.name()
    }

    pub fn config(&self) -> &SolverConfig {
        &self.config
    }

    pub fn set_config(&mut self, config: SolverConfig) {
        self.config = config;
    }

    pub fn callbacks(&self) -> &CallbackRegistry {
        &self.callbacks
    }

    pub fn set_message_log(&mut self, callback: impl MessageLogCallback + 'static) {
        self.callbacks.set_message_log(callback);
    }

    pub fn set_lp_iteration_callback(&mut self, callback: impl LpIterationCallback + 'static) {
        self.callbacks.set_lp_iteration(callback);
    }

    pub fn set_mip_node_callback(&mut self, callback: impl MipNodeCallback + 'static) {
        self.callbacks.set_mip_node(callback);
    }

    fn require(
        &self,
        operation: &'static str,
        allowed: &[HandleState],
    ) -> Result<(), HandleError> {
        if allowed.contains(&self.state) {
            Ok(())
        } else {
            warn!(
                component = "handle",
                operation,
                status = "error",
                state = self.state.as_str(),
                "Operation not allowed in current state"
            );
            Err(HandleError::InvalidState {
                operation,
                state: self.state,
            })
        }
    }

    /// Run an annotation loader; a passed check must be redone afterwards.
    fn annotate(
        &mut self,
        operation: &'static str,
        load: impl FnOnce(&mut Problem) -> Result<(), mpsolve_core::ProblemError>,
    ) -> Result<(), HandleError> {
        self.require(operation, &[HandleState::Loaded, HandleState::Checked])?;
        load(&mut self.problem)?;
        self.state = HandleState::Loaded;
        self.callbacks.log(&format!("{operation}: ok"));
        Ok(())
    }

    /// Load the matrix. Allowed once, on a freshly created handle.
    ///
    /// # Errors
    ///
    /// `InvalidState` after a previous load, `Load` when the data is
    /// malformed (the handle stays `Created`).
    pub fn load_matrix(&mut self, input: MatrixInput<'_>) -> Result<(), HandleError> {
        self.require("load_matrix", &[HandleState::Created])?;
        self.problem.load_matrix(input)?;
        self.state = HandleState::Loaded;
        self.callbacks.log(&format!(
            "load_matrix: {} columns, {} rows, {} nonzeros",
            self.problem.num_columns(),
            self.problem.num_rows(),
            self.problem.num_nonzeros()
        ));
        Ok(())
    }

    pub fn load_names<S: AsRef<str>>(
        &mut self,
        column_names: Option<&[S]>,
        row_names: Option<&[S]>,
        objective_name: Option<&str>,
    ) -> Result<(), HandleError> {
        self.annotate("load_names", |problem| {
            problem.load_names(column_names, row_names, objective_name)
        })
    }

    pub fn load_names_packed(
        &mut self,
        column_buffer: Option<&str>,
        row_buffer: Option<&str>,
        objective_name: Option<&str>,
    ) -> Result<(), HandleError> {
        self.annotate("load_names_packed", |problem| {
            problem.load_names_packed(column_buffer, row_buffer, objective_name)
        })
    }

    pub fn load_column_types(&mut self, types: &[ColumnType]) -> Result<(), HandleError> {
        self.annotate("load_column_types", |problem| {
            problem.load_column_types(types)
        })
    }

    /// Load integrality markers from one-letter codes (`C`, `I`, `B`).
    pub fn load_column_type_codes(&mut self, codes: &str) -> Result<(), HandleError> {
        self.annotate("load_column_types", |problem| {
            problem.load_column_type_codes(codes)
        })
    }

    pub fn load_priorities(&mut self, priorities: &[BranchPriority]) -> Result<(), HandleError> {
        self.annotate("load_priorities", |problem| {
            problem.load_priorities(priorities)
        })
    }

    pub fn load_priority_arrays(
        &mut self,
        index: &[usize],
        values: &[i32],
        branch: Option<&[i32]>,
    ) -> Result<(), HandleError> {
        self.annotate("load_priorities", |problem| {
            problem.load_priority_arrays(index, values, branch)
        })
    }

    pub fn load_sos(&mut self, sets: Vec<SosSet>) -> Result<(), HandleError> {
        self.annotate("load_sos", |problem| problem.load_sos(sets))
    }

    pub fn load_sos_packed(&mut self, input: SosInput<'_>) -> Result<(), HandleError> {
        self.annotate("load_sos", |problem| problem.load_sos_packed(input))
    }

    pub fn load_semi_continuous(&mut self, columns: &[usize]) -> Result<(), HandleError> {
        self.annotate("load_semi_continuous", |problem| {
            problem.load_semi_continuous(columns)
        })
    }

    pub fn load_initial_values(&mut self, values: &[f64]) -> Result<(), HandleError> {
        self.annotate("load_initial_values", |problem| {
            problem.load_initial_values(values)
        })
    }

    /// Validate the loaded problem without changing it.
    ///
    /// On failure the state is left as it was, so a caller may still
    /// optimize. Each issue is also sent to the message log.
    pub fn check(&mut self) -> Result<(), HandleError> {
        self.require("check", &[HandleState::Loaded, HandleState::Checked])?;
        match self.problem.check() {
            Ok(()) => {
                self.state = HandleState::Checked;
                self.callbacks.log("check: ok");
                debug!(
                    component = "handle",
                    operation = "check",
                    status = "success",
                    problem = %self.problem.name(),
                    "Problem check passed"
                );
                Ok(())
            }
            Err(err) => {
                for issue in &err.issues {
                    self.callbacks.log(&format!("check: {issue}"));
                }
                warn!(
                    component = "handle",
                    operation = "check",
                    status = "warn",
                    problem = %self.problem.name(),
                    issues = err.issues.len(),
                    "Problem check failed"
                );
                Err(err.into())
            }
        }
    }

    /// Run the engine to a terminal status.
    ///
    /// `Ok` carries the solution status, which may be non-optimal. `Err`
    /// means the solve could not run; the handle keeps its state and no
    /// solution is stored.
    pub fn optimize(&mut self) -> Result<SolutionStatus, HandleError> {
        self.require("optimize", &[HandleState::Loaded, HandleState::Checked])?;
        let class = self.problem.class();
        let expected = match class {
            ProblemClass::Linear => ProgressKind::LpIteration,
            ProblemClass::Mixed => ProgressKind::MipNode,
        };
        if let Some(kind) = self.callbacks.progress_kind().filter(|kind| *kind != expected) {
            warn!(
                component = "handle",
                operation = "optimize",
                status = "warn",
                class = class.as_str(),
                registered = kind.as_str(),
                "Progress callback shape does not match problem class; it will not fire"
            );
        }

        let started = Instant::now();
        let solution = match self
            .engine
            .solve(&self.problem, &self.config, &mut self.callbacks)
        {
            Ok(solution) => solution,
            Err(err) => {
                warn!(
                    component = "handle",
                    operation = "optimize",
                    status = "error",
                    problem = %self.problem.name(),
                    engine = self.engine.name(),
                    error_code = err.code(),
                    "Optimize failed"
                );
                self.callbacks.log(&format!("optimize: {err}"));
                return Err(err.into());
            }
        };
        let status = solution.status;
        debug!(
            component = "handle",
            operation = "optimize",
            status = "success",
            problem = %self.problem.name(),
            engine = self.engine.name(),
            class = class.as_str(),
            solution_status = status.as_str(),
            duration_ms = started.elapsed().as_secs_f64() * 1000.0,
            "Optimize finished"
        );
        self.solution = Some(solution);
        self.state = HandleState::Optimized;
        Ok(status)
    }

    /// Write the problem in `format` to `path`.
    pub fn write_file(&mut self, format: FileFormat, path: &Path) -> Result<(), HandleError> {
        self.require(
            "write_file",
            &[
                HandleState::Loaded,
                HandleState::Checked,
                HandleState::Optimized,
            ],
        )?;
        match format::write_file(&self.problem, format, path) {
            Ok(()) => {
                self.callbacks.log(&format!(
                    "write_file: {} written as {}",
                    path.display(),
                    format.as_str()
                ));
                Ok(())
            }
            Err(err) => {
                warn!(
                    component = "handle",
                    operation = "write_file",
                    status = "error",
                    path = %path.display(),
                    error_code = err.code(),
                    "Writing problem file failed"
                );
                self.callbacks.log(&format!("write_file: {err}"));
                Err(err.into())
            }
        }
    }

    /// Release everything held by the handle.
    pub fn unload(self) {
        debug!(
            component = "handle",
            operation = "unload",
            status = "success",
            problem = %self.problem.name(),
            "Unloading solver handle"
        );
    }

    fn solved(&self, operation: &'static str) -> Result<&Solution, HandleError> {
        self.solution
            .as_ref()
            .ok_or(HandleError::SolutionUnavailable { operation })
    }

    /// Solved state with primal values.
    fn with_values(&self, operation: &'static str) -> Result<&Solution, HandleError> {
        self.solved(operation)
            .ok()
            .filter(|solution| solution.has_values())
            .ok_or(HandleError::SolutionUnavailable { operation })
    }

    /// Complete solution record of the last optimize.
    pub fn solution(&self) -> Result<&Solution, HandleError> {
        self.solved("solution")
    }

    /// Status of the last optimize, `NotSolved` before one.
    pub fn solution_status(&self) -> SolutionStatus {
        self.solution
            .as_ref()
            .map_or(SolutionStatus::NotSolved, |solution| solution.status)
    }

    pub fn solution_text(&self) -> &'static str {
        self.solution_status().text()
    }

    /// Objective value, constant included, in the problem's sense.
    pub fn objective_value(&self) -> Result<f64, HandleError> {
        self.with_values("objective_value")
            .map(|solution| solution.objective_value)
    }

    pub fn solution_values(&self) -> Result<&[f64], HandleError> {
        self.with_values("solution_values")
            .map(|solution| solution.values.as_slice())
    }

    pub fn row_activities(&self) -> Result<&[f64], HandleError> {
        self.with_values("row_activities")
            .map(|solution| solution.row_activities.as_slice())
    }

    /// Row duals when the engine computed them.
    pub fn row_duals(&self) -> Result<Option<&[f64]>, HandleError> {
        self.with_values("row_duals")
            .map(|solution| solution.row_duals.as_deref())
    }

    /// Reduced costs when the engine computed them.
    pub fn reduced_costs(&self) -> Result<Option<&[f64]>, HandleError> {
        self.with_values("reduced_costs")
            .map(|solution| solution.reduced_costs.as_deref())
    }

    pub fn iteration_count(&self) -> Result<u64, HandleError> {
        self.solved("iteration_count").map(|solution| solution.iterations)
    }

    pub fn node_count(&self) -> Result<u64, HandleError> {
        self.solved("node_count").map(|solution| solution.nodes)
    }

    pub fn problem_name(&self) -> &str {
        self.problem.name()
    }

    pub fn column_count(&self) -> usize {
        self.problem.num_columns()
    }

    pub fn row_count(&self) -> usize {
        self.problem.num_rows()
    }

    pub fn column_name(&self, column: usize) -> Option<Cow<'_, str>> {
        (column < self.problem.num_columns()).then(|| self.problem.column_name(column))
    }

    pub fn row_name(&self, row: usize) -> Option<Cow<'_, str>> {
        (row < self.problem.num_rows()).then(|| self.problem.row_name(row))
    }

    /// `(name, value)` for every column whose value is not exactly zero.
    pub fn nonzero_values(&self) -> Result<Vec<(Cow<'_, str>, f64)>, HandleError> {
        let solution = self.with_values("nonzero_values")?;
        Ok(solution
            .nonzero_columns()
            .map(|(column, value)| (self.problem.column_name(column), value))
            .collect())
    }
}

impl<E: Engine> Drop for SolverHandle<E> {
    fn drop(&mut self) {
        debug!(
            component = "handle",
            operation = "release",
            status = "success",
            problem = %self.problem.name(),
            state = self.state.as_str(),
            "Released solver handle"
        );
    }
}

impl<E: Engine> std::fmt::Debug for SolverHandle<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SolverHandle")
            .field("problem", &self.problem.name())
            .field("engine", &self.engine.name())
            .field("state", &self.state)
            .field("callbacks", &self.callbacks)
            .finish_non_exhaustive()
    }
}
