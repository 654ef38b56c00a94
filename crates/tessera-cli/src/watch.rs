//! Watch command implementation for Tessera CLI.
//!
//! Re-runs a notebook whenever its file changes.

use std::path::{Path, PathBuf};
use std::time::Duration;

use notify_debouncer_mini::{DebounceEventResult, new_debouncer, notify::RecursiveMode};
use tokio::sync::mpsc;

use crate::colors;
use crate::run::run_session;
use crate::session::{Session, SessionOptions};

/// File change event.
#[derive(Debug, Clone)]
pub enum FileEvent {
    /// File was written.
    Modified(PathBuf),
    /// File was removed.
    Removed(PathBuf),
}

/// Debounced watcher for a single notebook file.
pub struct FileWatcher {
    /// Debouncer handle (kept alive to maintain watcher).
    _debouncer: notify_debouncer_mini::Debouncer<notify::RecommendedWatcher>,
    rx: mpsc::UnboundedReceiver<FileEvent>,
}

impl FileWatcher {
    /// Watch `path`, which must be an existing file.
    pub fn new(path: &Path) -> anyhow::Result<Self> {
        let target = path.to_path_buf();
        let watch_dir = target
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."));

        let (tx, rx) = mpsc::unbounded_channel();

        let mut debouncer = new_debouncer(
            Duration::from_millis(200),
            move |result: DebounceEventResult| {
                let Ok(events) = result else {
                    return;
                };
                for event in events {
                    if event.path != target {
                        continue;
                    }
                    let file_event = if event.path.exists() {
                        FileEvent::Modified(event.path)
                    } else {
                        FileEvent::Removed(event.path)
                    };
                    let _ = tx.send(file_event);
                }
            },
        )
        .map_err(|e| anyhow::anyhow!("Failed to create file watcher: {}", e))?;

        debouncer
            .watcher()
            .watch(&watch_dir, RecursiveMode::NonRecursive)
            .map_err(|e| anyhow::anyhow!("Failed to watch {}: {}", watch_dir.display(), e))?;

        Ok(Self {
            _debouncer: debouncer,
            rx,
        })
    }

    /// Receive the next file event.
    pub async fn recv(&mut self) -> Option<FileEvent> {
        self.rx.recv().await
    }
}

/// Execute the watch command.
pub async fn execute(
    notebook_path: &str,
    options: &SessionOptions,
    clear_screen: bool,
) -> anyhow::Result<()> {
    let path = Path::new(notebook_path);
    if !path.exists() {
        anyhow::bail!("Notebook not found: {}", notebook_path);
    }
    let abs_path = path.canonicalize()?;

    println!(
        "\n{}Tessera Watch{} - {}{}{}",
        colors::BOLD,
        colors::RESET,
        colors::CYAN,
        path.file_name().unwrap_or_default().to_string_lossy(),
        colors::RESET
    );
    println!("{}", "─".repeat(50));
    println!(
        "{}Watching for changes... (Ctrl+C to stop){}",
        colors::DIM,
        colors::RESET
    );

    if clear_screen {
        clear_terminal();
    }
    if let Err(e) = run_once(&abs_path, options).await {
        eprintln!("{}Error:{} {}", colors::RED, colors::RESET, e);
    }

    let mut watcher = FileWatcher::new(&abs_path)?;

    loop {
        tokio::select! {
            event = watcher.recv() => match event {
                Some(FileEvent::Modified(_)) => {
                    println!(
                        "\n{}File changed, re-running...{}",
                        colors::YELLOW,
                        colors::RESET
                    );
                    if clear_screen {
                        clear_terminal();
                    }
                    if let Err(e) = run_once(&abs_path, options).await {
                        eprintln!("{}Error:{} {}", colors::RED, colors::RESET, e);
                    }
                }
                Some(FileEvent::Removed(path)) => {
                    eprintln!(
                        "\n{}Warning:{} Notebook file removed: {}",
                        colors::YELLOW,
                        colors::RESET,
                        path.display()
                    );
                }
                None => break,
            },
            _ = tokio::signal::ctrl_c() => {
                println!("\n{}Stopped watching.{}", colors::DIM, colors::RESET);
                break;
            }
        }
    }

    Ok(())
}

/// Clear the terminal screen.
fn clear_terminal() {
    print!("\x1B[2J\x1B[1;1H");
    colors::flush_stdout();
}

/// Open, run and tear down the notebook once.
async fn run_once(path: &Path, options: &SessionOptions) -> anyhow::Result<()> {
    let session = Session::open(path, options)?;
    let result = run_session(&session, None).await;
    session.notebook.teardown();
    result.map(|_| ())
}
