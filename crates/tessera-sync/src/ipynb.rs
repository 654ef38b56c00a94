//! Jupyter notebook (.ipynb) exchange format.
//!
//! Text cells map to `markdown` cells, code cells to `code` cells. Outputs
//! are never written and ignored on read. `raw` cells are read as text.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tessera_core::{CellRecord, CellVariant, Serializer};

use crate::error::{SyncError, SyncResult};

/// A Jupyter notebook.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JupyterNotebook {
    /// Notebook metadata
    #[serde(default)]
    pub metadata: JupyterMetadata,

    /// Format version (always 4)
    pub nbformat: u32,

    /// Minor format version
    pub nbformat_minor: u32,

    /// Notebook cells
    pub cells: Vec<JupyterCell>,
}

/// Jupyter notebook metadata.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct JupyterMetadata {
    /// Kernel specification
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kernelspec: Option<KernelSpec>,

    /// Language info
    #[serde(skip_serializing_if = "Option::is_none")]
    pub language_info: Option<LanguageInfo>,
}

/// Kernel specification.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KernelSpec {
    pub display_name: String,
    pub language: String,
    pub name: String,
}

/// Language information.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LanguageInfo {
    pub name: String,
}

/// Cell source: nbformat allows a single string or a list of lines.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Source {
    Text(String),
    Lines(Vec<String>),
}

impl Source {
    /// Split into lines, each but the last keeping its newline.
    fn from_text(text: &str) -> Self {
        Source::Lines(text.split_inclusive('\n').map(str::to_string).collect())
    }

    fn into_text(self) -> String {
        match self {
            Source::Text(text) => text,
            Source::Lines(lines) => lines.concat(),
        }
    }
}

/// A Jupyter cell.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JupyterCell {
    /// Cell type: `code`, `markdown` or `raw`
    pub cell_type: String,

    /// Cell id (nbformat 4.5)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    #[serde(default)]
    pub metadata: serde_json::Map<String, serde_json::Value>,

    pub source: Source,

    /// Cell outputs (for code cells)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub outputs: Option<Vec<serde_json::Value>>,

    /// Execution count (for code cells)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub execution_count: Option<u32>,
}

impl JupyterNotebook {
    /// Create a new empty notebook.
    pub fn new() -> Self {
        Self {
            metadata: JupyterMetadata::default(),
            nbformat: 4,
            nbformat_minor: 5,
            cells: Vec::new(),
        }
    }

    /// Parse a notebook, rejecting formats other than nbformat 4.
    pub fn parse(json: &str) -> SyncResult<Self> {
        let notebook: Self = serde_json::from_str(json)?;
        if notebook.nbformat != 4 {
            return Err(SyncError::InvalidNotebook(format!(
                "unsupported nbformat {}",
                notebook.nbformat
            )));
        }
        Ok(notebook)
    }

    /// Write the notebook to a file.
    pub fn write_to_file(&self, path: impl AsRef<Path>) -> SyncResult<()> {
        let path = path.as_ref();
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json).map_err(|e| SyncError::WriteError {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        Ok(())
    }

    /// Read a notebook from a file.
    pub fn read_from_file(path: impl AsRef<Path>) -> SyncResult<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| SyncError::ReadError {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        Self::parse(&content)
    }
}

impl Default for JupyterNotebook {
    fn default() -> Self {
        Self::new()
    }
}

/// Serializer for the Jupyter format.
#[derive(Debug, Clone)]
pub struct IpynbSerializer {
    language: String,
}

impl IpynbSerializer {
    pub fn new(language: impl Into<String>) -> Self {
        Self {
            language: language.into(),
        }
    }

    /// Build a notebook from cells. Blank cells are left out.
    pub fn build_notebook(&self, cells: &[CellRecord]) -> JupyterNotebook {
        let mut notebook = JupyterNotebook::new();
        notebook.metadata = JupyterMetadata {
            kernelspec: Some(KernelSpec {
                display_name: self.language.clone(),
                language: self.language.clone(),
                name: self.language.clone(),
            }),
            language_info: Some(LanguageInfo {
                name: self.language.clone(),
            }),
        };

        notebook.cells = cells
            .iter()
            .filter(|cell| !cell.content.trim().is_empty())
            .enumerate()
            .map(|(index, cell)| {
                let is_code = cell.variant == CellVariant::Code;
                JupyterCell {
                    cell_type: if is_code { "code" } else { "markdown" }.to_string(),
                    id: Some(format!("cell-{index}")),
                    metadata: serde_json::Map::new(),
                    source: Source::from_text(&cell.content),
                    outputs: is_code.then(Vec::new),
                    execution_count: None,
                }
            })
            .collect();

        notebook
    }

    /// Extract cells from a notebook.
    pub fn extract_cells(&self, notebook: JupyterNotebook) -> Vec<CellRecord> {
        notebook
            .cells
            .into_iter()
            .filter_map(|cell| {
                let variant = match cell.cell_type.as_str() {
                    "code" => CellVariant::Code,
                    "markdown" | "raw" => CellVariant::Text,
                    other => {
                        tracing::warn!("skipping cell of unknown type {:?}", other);
                        return None;
                    }
                };
                Some(CellRecord {
                    variant,
                    content: cell.source.into_text(),
                })
            })
            .collect()
    }
}

impl Default for IpynbSerializer {
    fn default() -> Self {
        Self::new("sh")
    }
}

impl Serializer for IpynbSerializer {
    /// An all-blank notebook serializes to empty text, so it is never saved.
    fn serialize(&self, cells: &[CellRecord]) -> tessera_core::Result<String> {
        let notebook = self.build_notebook(cells);
        if notebook.cells.is_empty() {
            return Ok(String::new());
        }
        let mut json = serde_json::to_string_pretty(&notebook)
            .map_err(|e| tessera_core::Error::Serialization(e.to_string()))?;
        json.push('\n');
        Ok(json)
    }

    fn deserialize(&self, text: &str) -> tessera_core::Result<Vec<CellRecord>> {
        if text.trim().is_empty() {
            return Ok(Vec::new());
        }
        let notebook = JupyterNotebook::parse(text)?;
        Ok(self.extract_cells(notebook))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_notebook() {
        let notebook = JupyterNotebook::new();
        assert_eq!(notebook.nbformat, 4);
        assert_eq!(notebook.nbformat_minor, 5);
        assert!(notebook.cells.is_empty());
    }

    #[test]
    fn test_cells_map_to_jupyter_types() {
        let notebook = IpynbSerializer::new("python").build_notebook(&[
            CellRecord::text("# Hello"),
            CellRecord::code("x = 1\nprint(x)"),
            CellRecord::code("   "),
        ]);

        assert_eq!(notebook.cells.len(), 2);
        assert_eq!(notebook.cells[0].cell_type, "markdown");
        assert!(notebook.cells[0].outputs.is_none());
        assert_eq!(notebook.cells[1].cell_type, "code");
        assert_eq!(notebook.cells[1].outputs.as_deref(), Some(&[][..]));
        assert!(matches!(
            &notebook.cells[1].source,
            Source::Lines(lines) if lines == &["x = 1\n", "print(x)"]
        ));
    }

    #[test]
    fn test_reads_string_and_list_sources() {
        let json = r##"{
            "metadata": {},
            "nbformat": 4,
            "nbformat_minor": 2,
            "cells": [
                {"cell_type": "markdown", "metadata": {}, "source": "# Title"},
                {"cell_type": "code", "metadata": {}, "source": ["a = 1\n", "b = 2"],
                 "outputs": [{"output_type": "stream", "name": "stdout", "text": ["1"]}],
                 "execution_count": 3},
                {"cell_type": "raw", "metadata": {}, "source": []}
            ]
        }"##;

        let cells = IpynbSerializer::default().deserialize(json).unwrap();

        assert_eq!(
            cells,
            vec![
                CellRecord::text("# Title"),
                CellRecord::code("a = 1\nb = 2"),
                CellRecord::text(""),
            ]
        );
    }

    #[test]
    fn test_rejects_other_nbformat() {
        let json = r#"{"metadata": {}, "nbformat": 3, "nbformat_minor": 0, "cells": []}"#;
        assert!(matches!(
            JupyterNotebook::parse(json),
            Err(SyncError::InvalidNotebook(_))
        ));
    }

    #[test]
    fn test_blank_notebook_serializes_to_nothing() {
        let text = IpynbSerializer::default()
            .serialize(&[CellRecord::code("")])
            .unwrap();
        assert!(text.is_empty());
    }

    #[test]
    fn test_serialized_notebook_reads_back() {
        let serializer = IpynbSerializer::new("python");
        let cells = vec![CellRecord::text("Intro\n\nMore"), CellRecord::code("print(1)\n")];

        let text = serializer.serialize(&cells).unwrap();

        assert!(text.contains("\"nbformat\": 4"));
        assert_eq!(serializer.deserialize(&text).unwrap(), cells);
    }
}
