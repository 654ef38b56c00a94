//! Tessera CLI - run, convert and create cell notebooks.

mod colors;
mod convert;
mod run;
mod session;
mod watch;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tessera_core::{CellEvent, RenderOutcome, SaveOutcome};

use session::{Session, SessionOptions};

#[derive(Parser)]
#[command(name = "tessera")]
#[command(about = "Cell notebooks backed by plain files")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a notebook headlessly
    Run {
        /// Path to the notebook (.md or .ipynb)
        notebook: String,

        /// Run only the code cell with this id (0 is the first code cell)
        #[arg(long)]
        cell: Option<usize>,

        /// Interpreter each code cell is passed to
        #[arg(long, default_value = "sh -c")]
        shell: String,
    },

    /// Convert between Markdown and Jupyter notebooks
    Convert {
        /// Notebook to convert
        input: String,

        /// Output path (default: input with the other extension)
        output: Option<String>,

        /// Language tag for code cells
        #[arg(long, default_value = "sh")]
        lang: String,
    },

    /// Create a new notebook from template
    New {
        /// Name of the notebook (.md is added when no extension is given)
        name: String,

        /// Language tag for code cells
        #[arg(long, default_value = "sh")]
        lang: String,
    },

    /// Watch notebook and auto-run on changes
    Watch {
        /// Path to the notebook (.md or .ipynb)
        notebook: String,

        /// Interpreter each code cell is passed to
        #[arg(long, default_value = "sh -c")]
        shell: String,

        /// Clear screen before each run
        #[arg(long, default_value = "true")]
        clear: bool,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose {
        tracing_subscriber::EnvFilter::from_default_env()
            .add_directive(tracing::Level::DEBUG.into())
    } else {
        tracing_subscriber::EnvFilter::from_default_env().add_directive(tracing::Level::WARN.into())
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    match cli.command {
        Commands::Run {
            notebook,
            cell,
            shell,
        } => {
            let options = SessionOptions {
                shell,
                language: "sh".to_string(),
            };
            run::execute(&notebook, cell, &options).await?;
        }

        Commands::Convert {
            input,
            output,
            lang,
        } => {
            convert::execute(&input, output.as_deref(), &lang).await?;
        }

        Commands::New { name, lang } => {
            create_new_notebook(&name, &lang).await?;
        }

        Commands::Watch {
            notebook,
            shell,
            clear,
        } => {
            let options = SessionOptions {
                shell,
                language: "sh".to_string(),
            };
            watch::execute(&notebook, &options, clear).await?;
        }
    }

    Ok(())
}

/// Create a new notebook through the notebook's own first-save path.
async fn create_new_notebook(name: &str, language: &str) -> anyhow::Result<()> {
    let mut path = PathBuf::from(name);
    if path.extension().is_none() {
        path.set_extension("md");
    }
    if path.exists() {
        anyhow::bail!("File {} already exists", path.display());
    }
    let title = path
        .file_stem()
        .unwrap_or_default()
        .to_string_lossy()
        .to_string();

    let session = Session::open(
        &path,
        &SessionOptions {
            shell: "sh -c".to_string(),
            language: language.to_string(),
        },
    )?;
    let notebook = &session.notebook;

    if notebook.render().await != RenderOutcome::Created {
        anyhow::bail!("File {} already exists", path.display());
    }

    let Some(&code) = notebook.keys().first() else {
        anyhow::bail!("New notebook has no cells");
    };
    let greeting = "echo \"Hello from Tessera!\"";
    session.presentation.type_text(code, greeting);
    notebook.dispatch(
        code,
        &CellEvent::Change {
            content: greeting.to_string(),
        },
    );
    let intro = notebook.append_text(format!("# {title}\n\nA Tessera notebook."), None);
    notebook.dispatch(intro, &CellEvent::MoveUp);

    match notebook.save_now().await {
        SaveOutcome::Saved => {}
        SaveOutcome::Skipped(reason) => anyhow::bail!("Notebook was not saved ({:?})", reason),
        SaveOutcome::Failed(message) => anyhow::bail!("Failed to write notebook: {}", message),
    }
    notebook.teardown();

    println!("Created new notebook: {}", path.display());
    Ok(())
}
