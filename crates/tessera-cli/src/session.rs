//! Headless notebook sessions for the CLI.
//!
//! Wires a `Notebook` to a file store, the serializer picked by extension,
//! an interpreter process and an in-memory presentation.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tessera_core::{
    CellId, CommandConfig, CommandContext, Error, ExecutionObserver, ExecutionSummary,
    LogNavigator, MemoryPresentation, Notebook, SessionIdentity, UserId,
};
use tessera_sync::{FileStore, Format};

use crate::colors;

/// Options shared by the commands that open notebooks.
#[derive(Debug, Clone)]
pub struct SessionOptions {
    /// Interpreter command line, e.g. `sh -c` or `python3 -c`.
    pub shell: String,
    /// Language tag for code fences and kernel metadata.
    pub language: String,
}

/// An opened notebook and its headless presentation.
pub struct Session {
    pub notebook: Notebook,
    pub presentation: MemoryPresentation,
    pub path: PathBuf,
}

impl Session {
    /// Open the notebook at `path`. Nothing is loaded until `render`.
    pub fn open(path: &Path, options: &SessionOptions) -> anyhow::Result<Self> {
        let Some(format) = Format::from_path(path) else {
            anyhow::bail!(
                "Unsupported notebook format: {} (expected .md or .ipynb)",
                path.display()
            );
        };

        let working_dir = path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."));

        let mut parts = options.shell.split_whitespace();
        let Some(program) = parts.next() else {
            anyhow::bail!("--shell must name a program");
        };
        let config = CommandConfig::new(program, parts).with_working_dir(working_dir);

        let presentation = MemoryPresentation::new();
        let notebook = Notebook::builder(
            Arc::new(FileStore::open(path)),
            format.serializer(&options.language),
        )
        .context(Arc::new(CommandContext::new(config)))
        .presentation(presentation.clone())
        .identity(Arc::new(SessionIdentity::new(Some(local_user()))))
        .navigator(Arc::new(LogNavigator))
        .build();

        Ok(Self {
            notebook,
            presentation,
            path: path.to_path_buf(),
        })
    }

    pub fn name(&self) -> String {
        self.path
            .file_name()
            .unwrap_or_default()
            .to_string_lossy()
            .to_string()
    }

    /// Print the standard header for an action on this notebook.
    pub fn print_header(&self, action: &str) {
        println!(
            "\n{}{}{} {}{}{}",
            colors::BOLD,
            action,
            colors::RESET,
            colors::CYAN,
            self.name(),
            colors::RESET
        );
    }
}

/// The user running the CLI.
fn local_user() -> UserId {
    let name = std::env::var("USER")
        .or_else(|_| std::env::var("USERNAME"))
        .unwrap_or_else(|_| "local".to_string());
    UserId::new(name)
}

/// Prints each cell's output as it completes.
pub struct PrintObserver;

impl ExecutionObserver for PrintObserver {
    fn on_cell_started(&self, cell_id: CellId) {
        print!("{}▶ {}{}", colors::DIM, cell_id, colors::RESET);
        colors::flush_stdout();
    }

    fn on_cell_completed(&self, _cell_id: CellId, output: &str) {
        println!(" {}✓{}", colors::GREEN, colors::RESET);
        for line in output.lines() {
            println!("  {line}");
        }
    }

    fn on_cell_error(&self, _cell_id: CellId, error: &Error) {
        println!(" {}✗{}", colors::RED, colors::RESET);
        for line in error.to_string().lines() {
            eprintln!("  {}{}{}", colors::RED, line, colors::RESET);
        }
    }
}

/// Print the closing summary line of a run.
pub fn print_summary(summary: &ExecutionSummary) {
    println!("\n{}", "─".repeat(50));
    if summary.is_clean() {
        println!(
            "{}Completed{} {} cells in {:.2}s",
            colors::GREEN,
            colors::RESET,
            summary.executed.len(),
            summary.elapsed.as_secs_f64()
        );
    } else {
        println!(
            "{}Completed with errors{}: {} succeeded, {} failed in {:.2}s",
            colors::RED,
            colors::RESET,
            summary.executed.len(),
            summary.failed.len(),
            summary.elapsed.as_secs_f64()
        );
    }
}
