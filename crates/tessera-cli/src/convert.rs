//! Convert command implementation for Tessera CLI.

use std::path::{Path, PathBuf};

use crate::colors;

/// Convert `input` to `output`, or to the other format next to the input.
pub async fn execute(input: &str, output: Option<&str>, language: &str) -> anyhow::Result<()> {
    let input = Path::new(input);
    if !input.exists() {
        anyhow::bail!("Notebook not found: {}", input.display());
    }

    let output = match output {
        Some(output) => PathBuf::from(output),
        None => tessera_sync::default_output_path(input).ok_or_else(|| {
            anyhow::anyhow!(
                "Unsupported notebook format: {} (expected .md or .ipynb)",
                input.display()
            )
        })?,
    };

    let cells = tessera_sync::convert(input, &output, language).await?;

    println!(
        "{}Converted{} {} → {} ({} cells)",
        colors::GREEN,
        colors::RESET,
        input.display(),
        output.display(),
        cells
    );
    Ok(())
}
