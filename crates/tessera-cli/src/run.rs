//! Run command implementation for Tessera CLI.
//!
//! Loads a notebook and executes its code cells in order.

use std::path::Path;

use tessera_core::{CellId, ExecutionSummary, RenderOutcome};

use crate::colors;
use crate::session::{PrintObserver, Session, SessionOptions, print_summary};

/// Execute a notebook.
pub async fn execute(
    notebook_path: &str,
    cell: Option<usize>,
    options: &SessionOptions,
) -> anyhow::Result<()> {
    let path = Path::new(notebook_path);
    if !path.exists() {
        anyhow::bail!("Notebook not found: {}", notebook_path);
    }

    let session = Session::open(path, options)?;
    let summary = run_session(&session, cell).await?;
    session.notebook.teardown();

    if let Some(summary) = summary.filter(|s| !s.is_clean()) {
        anyhow::bail!("{} cell(s) failed", summary.failed.len());
    }
    Ok(())
}

/// Load and run an opened notebook, printing outputs as they arrive.
///
/// Returns `None` when there was nothing to run.
pub async fn run_session(
    session: &Session,
    cell: Option<usize>,
) -> anyhow::Result<Option<ExecutionSummary>> {
    session.print_header("Running");

    match session.notebook.render().await {
        RenderOutcome::Loaded { .. } => {}
        RenderOutcome::Created | RenderOutcome::Unavailable => {
            anyhow::bail!("Could not load notebook {}", session.path.display());
        }
    }

    let records = session.notebook.records();
    if records.iter().all(|r| r.content.trim().is_empty()) {
        println!(
            "\n{}No cells found in notebook.{}",
            colors::YELLOW,
            colors::RESET
        );
        return Ok(None);
    }

    println!("\n{}Outputs:{}", colors::BOLD, colors::RESET);
    println!("{}", "─".repeat(50));

    match cell {
        Some(index) => run_single(session, CellId::new(index)).await.map(|_| None),
        None => {
            let summary = session.notebook.execute_with(&PrintObserver).await?;
            print_summary(&summary);
            Ok(Some(summary))
        }
    }
}

async fn run_single(session: &Session, cell_id: CellId) -> anyhow::Result<()> {
    let Some(cell) = session
        .notebook
        .cells()
        .into_iter()
        .find(|c| c.id() == Some(cell_id))
    else {
        anyhow::bail!("No code cell {} in notebook", cell_id);
    };

    let output = session.notebook.execute_cell(cell.key()).await?;
    for line in output.unwrap_or_default().lines() {
        println!("  {line}");
    }
    println!(
        "\n{}Completed{} {}",
        colors::GREEN,
        colors::RESET,
        cell_id
    );
    Ok(())
}
