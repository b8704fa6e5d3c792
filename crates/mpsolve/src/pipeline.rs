//! Owned solve pipeline: load, check, register callbacks, optimize, report.

use std::cell::RefCell;
use std::path::PathBuf;
use std::rc::Rc;

use mpsolve_core::format::FileFormat;
use mpsolve_core::{BranchPriority, MatrixInput, ProblemClass, RowType, Sense, SosSet};
use mpsolve_simplex::SimplexEngine;
use mpsolve_solver::{
    CallbackControl, Engine, LpIterationEvent, MipNodeEvent, SolutionStatus, SolverConfig,
};
use serde::Serialize;
use tracing::{debug, warn};

use crate::error::HandleError;
use crate::handle::SolverHandle;

/// Owned counterpart of [`MatrixInput`].
#[derive(Debug, Clone, PartialEq, Default)]
pub struct MatrixData {
    pub col_count: usize,
    pub row_count: usize,
    pub nonzero_count: usize,
    pub range_count: usize,
    pub sense: Sense,
    pub objective_constant: f64,
    pub objective: Vec<f64>,
    pub lower_bounds: Option<Vec<f64>>,
    pub upper_bounds: Option<Vec<f64>>,
    pub row_types: Vec<RowType>,
    pub rhs: Vec<f64>,
    pub ranges: Option<Vec<f64>>,
    pub begin: Vec<usize>,
    pub count: Option<Vec<usize>>,
    pub index: Vec<usize>,
    pub value: Vec<f64>,
}

impl MatrixData {
    pub fn as_input(&self) -> MatrixInput<'_> {
        MatrixInput {
            col_count: self.col_count,
            row_count: self.row_count,
            nonzero_count: self.nonzero_count,
            range_count: self.range_count,
            sense: self.sense,
            objective_constant: self.objective_constant,
            objective: &self.objective,
            lower_bounds: self.lower_bounds.as_deref(),
            upper_bounds: self.upper_bounds.as_deref(),
            row_types: &self.row_types,
            rhs: &self.rhs,
            ranges: self.ranges.as_deref(),
            begin: &self.begin,
            count: self.count.as_deref(),
            index: &self.index,
            value: &self.value,
        }
    }
}

/// Where the pipeline takes names from.
#[derive(Debug, Clone, PartialEq)]
pub enum NameSource {
    /// One string per column and per row.
    Arrays {
        columns: Vec<String>,
        rows: Vec<String>,
        objective: Option<String>,
    },
    /// NUL-delimited buffers.
    Packed {
        columns: String,
        rows: String,
        objective: Option<String>,
    },
}

/// When the problem file is written relative to optimize.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WriteStage {
    BeforeOptimize,
    #[default]
    AfterOptimize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct WriteTarget {
    pub format: FileFormat,
    pub path: PathBuf,
    pub stage: WriteStage,
}

/// Progress event forwarded to a pipeline observer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ProgressEvent {
    LpIteration(LpIterationEvent),
    MipNode(MipNodeEvent),
}

type Observer = Box<dyn FnMut(&ProgressEvent) -> CallbackControl>;

/// Everything needed to take one problem from raw arrays to a report.
pub struct SolveRequest {
    pub name: String,
    pub matrix: MatrixData,
    pub names: Option<NameSource>,
    /// One-letter column type codes.
    pub column_types: Option<String>,
    pub priorities: Vec<BranchPriority>,
    pub sos: Vec<SosSet>,
    pub semi_continuous: Vec<usize>,
    pub initial_values: Option<Vec<f64>>,
    pub config: SolverConfig,
    pub write: Option<WriteTarget>,
    observer: Option<Observer>,
}

impl SolveRequest {
    pub fn new(name: impl Into<String>, matrix: MatrixData) -> Self {
        Self {
            name: name.into(),
            matrix,
            names: None,
            column_types: None,
            priorities: Vec::new(),
            sos: Vec::new(),
            semi_continuous: Vec::new(),
            initial_values: None,
            config: SolverConfig::new(),
            write: None,
            observer: None,
        }
    }

    pub fn with_names(mut self, names: NameSource) -> Self {
        self.names = Some(names);
        self
    }

    pub fn with_column_types(mut self, codes: impl Into<String>) -> Self {
        self.column_types = Some(codes.into());
        self
    }

    pub fn with_priorities(mut self, priorities: Vec<BranchPriority>) -> Self {
        self.priorities = priorities;
        self
    }

    pub fn with_sos(mut self, sets: Vec<SosSet>) -> Self {
        self.sos = sets;
        self
    }

    pub fn with_semi_continuous(mut self, columns: Vec<usize>) -> Self {
        self.semi_continuous = columns;
        self
    }

    pub fn with_initial_values(mut self, values: Vec<f64>) -> Self {
        self.initial_values = Some(values);
        self
    }

    pub fn with_config(mut self, config: SolverConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_write(mut self, target: WriteTarget) -> Self {
        self.write = Some(target);
        self
    }

    /// Observe progress events; returning `Abort` stops the solve.
    pub fn with_observer(
        mut self,
        observer: impl FnMut(&ProgressEvent) -> CallbackControl + 'static,
    ) -> Self {
        self.observer = Some(Box::new(observer));
        self
    }

    /// Run on the built-in engine.
    pub fn run(self) -> Result<SolveReport, HandleError> {
        self.run_with_engine(SimplexEngine::new())
    }

    /// Run the full pipeline on `engine`.
    ///
    /// A failed check is logged and recorded in the report; the pipeline
    /// still optimizes. Load, call and file errors stop it.
    pub fn run_with_engine<E: Engine>(self, engine: E) -> Result<SolveReport, HandleError> {
        let SolveRequest {
            name,
            matrix,
            names,
            column_types,
            priorities,
            sos,
            semi_continuous,
            initial_values,
            config,
            write,
            observer,
        } = self;

        let mut handle = SolverHandle::with_engine(name, engine);
        handle.set_config(config);
        let tally = Rc::new(RefCell::new(Tally::default()));
        register_message_log(&mut handle, &tally);
        handle.load_matrix(matrix.as_input())?;
        match names {
            Some(NameSource::Arrays {
                columns,
                rows,
                objective,
            }) => handle.load_names(
                Some(columns.as_slice()),
                Some(rows.as_slice()),
                objective.as_deref(),
            )?,
            Some(NameSource::Packed {
                columns,
                rows,
                objective,
            }) => handle.load_names_packed(
                Some(columns.as_str()),
                Some(rows.as_str()),
                objective.as_deref(),
            )?,
            None => {}
        }
        if let Some(codes) = column_types.as_deref() {
            handle.load_column_type_codes(codes)?;
        }
        if !priorities.is_empty() {
            handle.load_priorities(&priorities)?;
        }
        if !sos.is_empty() {
            handle.load_sos(sos)?;
        }
        if !semi_continuous.is_empty() {
            handle.load_semi_continuous(&semi_continuous)?;
        }
        if let Some(values) = initial_values.as_deref() {
            handle.load_initial_values(values)?;
        }

        let check_issues = match handle.check() {
            Ok(()) => Vec::new(),
            Err(HandleError::Consistency(err)) => {
                err.issues.iter().map(ToString::to_string).collect()
            }
            Err(err) => return Err(err),
        };

        register_progress(&mut handle, &tally, observer);

        if let Some(target) = write.as_ref().filter(|t| t.stage == WriteStage::BeforeOptimize) {
            handle.write_file(target.format, &target.path)?;
        }
        handle.optimize()?;
        if let Some(target) = write.as_ref().filter(|t| t.stage == WriteStage::AfterOptimize) {
            handle.write_file(target.format, &target.path)?;
        }

        let tally = tally.borrow().clone();
        let mut report = SolveReport::from_handle(&handle)?;
        report.check_issues = check_issues;
        report.messages = tally.messages;
        report.progress_events = tally.progress_events;
        report.written = write.map(|target| target.path);
        if !report.status.is_optimal() {
            warn!(
                component = "pipeline",
                operation = "run",
                status = "warn",
                problem = %report.problem,
                solution_status = report.status.as_str(),
                "Solve finished without an optimal solution"
            );
        }
        handle.unload();
        Ok(report)
    }
}

impl std::fmt::Debug for SolveRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SolveRequest")
            .field("name", &self.name)
            .field("columns", &self.matrix.col_count)
            .field("rows", &self.matrix.row_count)
            .field("config", &self.config)
            .field("write", &self.write)
            .field("observer", &self.observer.is_some())
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Clone, Default)]
struct Tally {
    messages: Vec<String>,
    progress_events: u64,
}

/// Collect every handle and engine message into the tally.
fn register_message_log<E: Engine>(handle: &mut SolverHandle<E>, tally: &Rc<RefCell<Tally>>) {
    let messages = Rc::clone(tally);
    handle.set_message_log(move |text: &str| {
        debug!(
            component = "pipeline",
            operation = "message",
            status = "success",
            text,
            "Solver message"
        );
        messages.borrow_mut().messages.push(text.to_string());
        CallbackControl::Continue
    });
}

/// Progress callback matching the declared class.
fn register_progress<E: Engine>(
    handle: &mut SolverHandle<E>,
    tally: &Rc<RefCell<Tally>>,
    observer: Option<Observer>,
) {
    let observer = Rc::new(RefCell::new(observer));
    let forward = move |tally: &Rc<RefCell<Tally>>, event: ProgressEvent| {
        tally.borrow_mut().progress_events += 1;
        match observer.borrow_mut().as_mut() {
            Some(observe) => observe(&event),
            None => CallbackControl::Continue,
        }
    };
    let progress = Rc::clone(tally);
    match handle.problem().class() {
        ProblemClass::Linear => handle.set_lp_iteration_callback(move |event: &LpIterationEvent| {
            forward(&progress, ProgressEvent::LpIteration(*event))
        }),
        ProblemClass::Mixed => handle.set_mip_node_callback(move |event: &MipNodeEvent| {
            forward(&progress, ProgressEvent::MipNode(*event))
        }),
    }
}

/// Name and value of one non-zero column.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NamedValue {
    pub name: String,
    pub value: f64,
}

/// What a finished pipeline run reports.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SolveReport {
    pub problem: String,
    pub engine: &'static str,
    pub class: ProblemClass,
    #[serde(serialize_with = "serialize_status")]
    pub status: SolutionStatus,
    pub status_code: i32,
    pub status_text: &'static str,
    /// Absent when the solve produced no primal values.
    pub objective_value: Option<f64>,
    pub values: Vec<NamedValue>,
    pub iterations: u64,
    pub nodes: u64,
    pub solve_time_seconds: f64,
    pub check_issues: Vec<String>,
    pub messages: Vec<String>,
    pub progress_events: u64,
    pub written: Option<PathBuf>,
}

fn serialize_status<S: serde::Serializer>(
    status: &SolutionStatus,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(status.as_str())
}

impl SolveReport {
    /// Summarize an optimized handle.
    pub fn from_handle<E: Engine>(handle: &SolverHandle<E>) -> Result<Self, HandleError> {
        let solution = handle.solution()?;
        let values = if solution.has_values() {
            handle
                .nonzero_values()?
                .into_iter()
                .map(|(name, value)| NamedValue {
                    name: name.into_owned(),
                    value,
                })
                .collect()
        } else {
            Vec::new()
        };
        Ok(Self {
            problem: handle.problem_name().to_string(),
            engine: handle.engine_name(),
            class: handle.problem().class(),
            status: solution.status,
            status_code: solution.status.code(),
            status_text: solution.status.text(),
            objective_value: solution.has_values().then_some(solution.objective_value),
            values,
            iterations: solution.iterations,
            nodes: solution.nodes,
            solve_time_seconds: solution.solve_time_seconds,
            check_issues: Vec::new(),
            messages: Vec::new(),
            progress_events: 0,
            written: None,
        })
    }
}

#[cfg(test)]
#[allow(clippy::float_cmp)]
mod tests {
    use super::*;

    fn tiny() -> MatrixData {
        MatrixData {
            col_count: 1,
            row_count: 1,
            nonzero_count: 1,
            sense: Sense::Maximize,
            objective: vec![2.0],
            upper_bounds: Some(vec![4.0]),
            row_types: vec![RowType::LessEqual],
            rhs: vec![3.0],
            begin: vec![0, 1],
            index: vec![0],
            value: vec![1.0],
            ..MatrixData::default()
        }
    }

    #[test]
    fn test_matrix_data_borrows_every_field() {
        let data = tiny();
        let input = data.as_input();
        assert_eq!(input.col_count, 1);
        assert_eq!(input.objective, &[2.0]);
        assert_eq!(input.upper_bounds, Some(&[4.0][..]));
        assert!(input.lower_bounds.is_none());
        assert!(input.count.is_none());
    }

    #[test]
    fn test_tiny_pipeline() {
        let report = SolveRequest::new("tiny", tiny()).run().unwrap();
        assert_eq!(report.status, SolutionStatus::Optimal);
        assert_eq!(report.status_code, 0);
        assert_eq!(report.objective_value, Some(6.0));
        assert_eq!(
            report.values,
            vec![NamedValue {
                name: "C1".to_string(),
                value: 3.0
            }]
        );
        assert!(report.check_issues.is_empty());
        assert_eq!(report.progress_events, report.iterations);
    }
}
