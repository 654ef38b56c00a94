//! Exchange formats and storage for Tessera notebooks.
//!
//! Provides the serializers and the file-backed store that plug into
//! `tessera-core`, plus conversion between formats.
//!
//! # Architecture
//!
//! ```text
//! notebook.md ────► MarkdownSerializer ──┐                ┌──► IpynbSerializer ────► notebook.ipynb
//!                                        ├─► CellRecords ─┤
//! notebook.ipynb ─► IpynbSerializer ─────┘                └──► MarkdownSerializer ─► notebook.md
//!
//! FileStore: fetch / save (temp + rename) / fork (<stem>-<id>.<ext>)
//! ```

mod error;
mod format;
mod ipynb;
mod markdown;
mod store;

pub use error::{SyncError, SyncResult};
pub use format::Format;
pub use ipynb::{IpynbSerializer, JupyterCell, JupyterMetadata, JupyterNotebook, Source};
pub use markdown::MarkdownSerializer;
pub use store::FileStore;

use std::path::{Path, PathBuf};

/// Convert a notebook between formats, picking both by extension.
///
/// Returns the number of cells written.
pub async fn convert(
    input: impl AsRef<Path>,
    output: impl AsRef<Path>,
    language: &str,
) -> SyncResult<usize> {
    let input = input.as_ref();
    let output = output.as_ref();

    let from = Format::from_path(input)
        .ok_or_else(|| SyncError::UnsupportedFormat(input.to_path_buf()))?;
    let to = Format::from_path(output)
        .ok_or_else(|| SyncError::UnsupportedFormat(output.to_path_buf()))?;

    let text = tokio::fs::read_to_string(input)
        .await
        .map_err(|e| SyncError::ReadError {
            path: input.to_path_buf(),
            message: e.to_string(),
        })?;

    let cells = from
        .serializer(language)
        .deserialize(&text)
        .map_err(|e| SyncError::ParseError(e.to_string()))?;
    let converted = to
        .serializer(language)
        .serialize(&cells)
        .map_err(|e| SyncError::InvalidNotebook(e.to_string()))?;

    store::write_atomic(output, &converted).await?;

    tracing::info!(
        "Converted {} → {} ({} cells)",
        input.display(),
        output.display(),
        cells.len()
    );

    Ok(cells.len())
}

/// Default conversion target: the same path with the other format's extension.
pub fn default_output_path(input: impl AsRef<Path>) -> Option<PathBuf> {
    let input = input.as_ref();
    let format = Format::from_path(input)?;
    Some(input.with_extension(format.counterpart().extension()))
}
