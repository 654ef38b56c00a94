//! Notebook file formats.

use std::path::Path;
use std::sync::Arc;

use tessera_core::Serializer;

use crate::ipynb::IpynbSerializer;
use crate::markdown::MarkdownSerializer;

/// On-disk notebook format, chosen by file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Markdown,
    Jupyter,
}

impl Format {
    /// `.md`/`.markdown` → Markdown, `.ipynb` → Jupyter.
    pub fn from_path(path: impl AsRef<Path>) -> Option<Self> {
        let ext = path.as_ref().extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "md" | "markdown" => Some(Format::Markdown),
            "ipynb" => Some(Format::Jupyter),
            _ => None,
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            Format::Markdown => "md",
            Format::Jupyter => "ipynb",
        }
    }

    /// The other format; conversions go one way or the other.
    pub fn counterpart(&self) -> Self {
        match self {
            Format::Markdown => Format::Jupyter,
            Format::Jupyter => Format::Markdown,
        }
    }

    /// Serializer for this format, tagging code with `language`.
    pub fn serializer(&self, language: &str) -> Arc<dyn Serializer> {
        match self {
            Format::Markdown => Arc::new(MarkdownSerializer::new(language)),
            Format::Jupyter => Arc::new(IpynbSerializer::new(language)),
        }
    }
}

impl std::fmt::Display for Format {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Format::Markdown => write!(f, "markdown"),
            Format::Jupyter => write!(f, "jupyter"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_path() {
        assert_eq!(Format::from_path("notes.md"), Some(Format::Markdown));
        assert_eq!(Format::from_path("NOTES.Markdown"), Some(Format::Markdown));
        assert_eq!(Format::from_path("/tmp/nb.ipynb"), Some(Format::Jupyter));
        assert_eq!(Format::from_path("script.rs"), None);
        assert_eq!(Format::from_path("README"), None);
    }

    #[test]
    fn test_counterpart() {
        assert_eq!(Format::Markdown.counterpart(), Format::Jupyter);
        assert_eq!(Format::Jupyter.counterpart().extension(), "md");
    }
}
