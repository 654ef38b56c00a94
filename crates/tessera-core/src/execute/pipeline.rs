//! Sequential full-notebook run.
//!
//! Visits cells front to back, awaiting each code cell's execution before
//! advancing. The next cell is looked up live after every step rather than
//! from a snapshot, so cells inserted or removed during a run affect the
//! rest of it. Removing the cell being executed ends the run after it.
//!
//! Live widget text is synced into the registry before each code cell runs.
//! The resulting changes are left on the registry's change stream for the
//! owning notebook to drain once the run ends.

use std::time::Instant;

use crate::cell::{Cell, CellId, CellKey};
use crate::error::{Error, Result};
use crate::state::{Caret, SharedState, lock_state};

use super::context::{ExecutionContext, ExecutionObserver, ExecutionSummary};

/// Where a pipeline is in its run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineState {
    Idle,
    Running { cell: CellKey },
}

/// Marks the notebook as executing for the lifetime of a run.
///
/// Clears the flag on drop, so a run future dropped mid-flight does not
/// leave cell-level `execute` events disabled.
struct RunGuard<'a> {
    state: &'a SharedState,
}

impl<'a> RunGuard<'a> {
    fn enter(state: &'a SharedState) -> Result<Self> {
        let mut guard = lock_state(state);
        if guard.is_executing {
            return Err(Error::ExecutionInProgress);
        }
        guard.is_executing = true;
        Ok(Self { state })
    }
}

impl Drop for RunGuard<'_> {
    fn drop(&mut self) {
        lock_state(self.state).is_executing = false;
    }
}

/// One full-notebook run.
pub struct ExecutionPipeline<'a> {
    state: &'a SharedState,
    context: &'a dyn ExecutionContext,
    observer: Option<&'a dyn ExecutionObserver>,
    phase: PipelineState,
}

impl<'a> ExecutionPipeline<'a> {
    pub fn new(state: &'a SharedState, context: &'a dyn ExecutionContext) -> Self {
        Self {
            state,
            context,
            observer: None,
            phase: PipelineState::Idle,
        }
    }

    /// Report progress to `observer`.
    pub fn with_observer(mut self, observer: &'a dyn ExecutionObserver) -> Self {
        self.observer = Some(observer);
        self
    }

    pub fn state(&self) -> PipelineState {
        self.phase
    }

    /// Run every code cell in order.
    ///
    /// Returns `Error::ExecutionInProgress` if another run holds the
    /// notebook. Execution failures never stop the run.
    pub async fn run(mut self) -> Result<ExecutionSummary> {
        let started = Instant::now();
        let guard = RunGuard::enter(self.state)?;
        let mut summary = ExecutionSummary::default();

        tracing::info!("notebook run started");

        let mut next = first_cell(self.state);
        while let Some(key) = next {
            self.phase = PipelineState::Running { cell: key };

            if let Some((cell_id, source)) = visit(self.state, key) {
                self.execute_cell(cell_id, &source, &mut summary).await;
            }

            next = next_cell(self.state, key);
        }

        drop(guard);
        self.phase = PipelineState::Idle;
        summary.elapsed = started.elapsed();

        tracing::info!(
            executed = summary.executed.len(),
            failed = summary.failed.len(),
            "notebook run completed in {:.2}s",
            summary.elapsed.as_secs_f64()
        );
        if let Some(observer) = self.observer {
            observer.on_run_completed(&summary);
        }

        Ok(summary)
    }

    async fn execute_cell(&self, cell_id: CellId, source: &str, summary: &mut ExecutionSummary) {
        if let Some(observer) = self.observer {
            observer.on_cell_started(cell_id);
        }

        match self.context.execute(source).await {
            Ok(output) => {
                tracing::debug!(%cell_id, "cell completed");
                summary.executed.push(cell_id);
                if let Some(observer) = self.observer {
                    observer.on_cell_completed(cell_id, &output);
                }
            }
            Err(e) => {
                tracing::debug!(%cell_id, "cell failed: {}", e);
                summary.failed.push(cell_id);
                if let Some(observer) = self.observer {
                    observer.on_cell_error(cell_id, &e);
                }
            }
        }
    }
}

fn first_cell(state: &SharedState) -> Option<CellKey> {
    lock_state(state).registry.first().map(Cell::key)
}

fn next_cell(state: &SharedState, key: CellKey) -> Option<CellKey> {
    lock_state(state).registry.get_next(key).map(Cell::key)
}

/// Focus a cell and, for code cells, return what to execute.
fn visit(state: &SharedState, key: CellKey) -> Option<(CellId, String)> {
    let mut guard = lock_state(state);
    guard.focus_cell(key, Caret::End);

    let cell_id = guard.registry.get(key)?.id()?;
    let source = guard.sync_content(key)?;
    Some((cell_id, source))
}
