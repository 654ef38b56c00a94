//! Execution context and callbacks for notebook runs.

use std::time::Duration;

use async_trait::async_trait;

use crate::cell::CellId;
use crate::error::{Error, Result};

/// Isolated facility that runs code-cell source.
///
/// One instance is shared by every code cell of a notebook, so state left
/// behind by one cell is visible to the next. Calls never overlap within a
/// run.
#[async_trait]
pub trait ExecutionContext: Send + Sync {
    /// Run `source`, returning its output or a failure.
    async fn execute(&self, source: &str) -> Result<String>;

    /// Free the context's resources. Called once, on notebook teardown.
    fn release(&self) {}
}

/// Callback trait for execution progress reporting.
pub trait ExecutionObserver: Send + Sync {
    /// Called when a code cell is handed to the context.
    fn on_cell_started(&self, _cell_id: CellId) {}

    /// Called when a code cell's execution returned a result.
    fn on_cell_completed(&self, _cell_id: CellId, _output: &str) {}

    /// Called when a code cell's execution failed.
    fn on_cell_error(&self, _cell_id: CellId, _error: &Error) {}

    /// Called exactly once, after the last cell of a run.
    fn on_run_completed(&self, _summary: &ExecutionSummary) {}
}

/// Outcome of one full-notebook run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExecutionSummary {
    /// Code cells whose execution returned a result, in run order.
    pub executed: Vec<CellId>,
    /// Code cells whose execution failed, in run order.
    pub failed: Vec<CellId>,
    /// Wall time of the run.
    pub elapsed: Duration,
}

impl ExecutionSummary {
    /// Number of code cells handed to the context.
    pub fn visited(&self) -> usize {
        self.executed.len() + self.failed.len()
    }

    pub fn is_clean(&self) -> bool {
        self.failed.is_empty()
    }
}
