//! Cell types shared by the registry, the event router and the serializers.

use serde::{Deserialize, Serialize};

use crate::router::HandlerSet;

/// Opaque identity of a cell within one notebook.
///
/// Every cell gets a key, regardless of variant. Keys are never reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CellKey(pub(crate) u64);

impl CellKey {
    pub fn new(key: u64) -> Self {
        Self(key)
    }

    pub fn as_u64(&self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for CellKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "key_{}", self.0)
    }
}

/// Execution identifier handed out to code cells only.
///
/// Monotonic per notebook, starting at 0.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CellId(pub(crate) usize);

impl CellId {
    pub fn new(id: usize) -> Self {
        Self(id)
    }

    pub fn as_usize(&self) -> usize {
        self.0
    }
}

impl std::fmt::Display for CellId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "cell_{}", self.0)
    }
}

/// Kind of cell in the notebook.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CellVariant {
    /// Executable source.
    Code,
    /// Prose, never executed.
    Text,
}

impl CellVariant {
    /// The variant a `switch` turns this one into.
    pub fn opposite(self) -> Self {
        match self {
            Self::Code => Self::Text,
            Self::Text => Self::Code,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Code => "code",
            Self::Text => "text",
        }
    }
}

impl std::fmt::Display for CellVariant {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One cell as exchanged with a serializer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CellRecord {
    pub variant: CellVariant,
    pub content: String,
}

impl CellRecord {
    pub fn code(content: impl Into<String>) -> Self {
        Self {
            variant: CellVariant::Code,
            content: content.into(),
        }
    }

    pub fn text(content: impl Into<String>) -> Self {
        Self {
            variant: CellVariant::Text,
            content: content.into(),
        }
    }
}

/// A cell owned by the registry.
#[derive(Debug, Clone)]
pub struct Cell {
    key: CellKey,
    id: Option<CellId>,
    variant: CellVariant,
    pub(crate) content: String,
    /// Last code cell located by a browse event, if any.
    pub(crate) browse: Option<CellKey>,
    handlers: &'static HandlerSet,
}

impl Cell {
    /// Build a cell. Only code cells carry an id.
    pub(crate) fn new(
        key: CellKey,
        id: Option<CellId>,
        variant: CellVariant,
        content: String,
    ) -> Self {
        Self {
            key,
            id,
            variant,
            content,
            browse: None,
            handlers: HandlerSet::for_variant(variant),
        }
    }

    pub fn key(&self) -> CellKey {
        self.key
    }

    pub fn id(&self) -> Option<CellId> {
        self.id
    }

    pub fn variant(&self) -> CellVariant {
        self.variant
    }

    pub fn is_code(&self) -> bool {
        self.variant == CellVariant::Code
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn browse_position(&self) -> Option<CellKey> {
        self.browse
    }

    pub(crate) fn handlers(&self) -> &'static HandlerSet {
        self.handlers
    }

    pub fn record(&self) -> CellRecord {
        CellRecord {
            variant: self.variant,
            content: self.content.clone(),
        }
    }
}
