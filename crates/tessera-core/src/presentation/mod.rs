//! Presentation layer seam.
//!
//! The presentation owns the rendered cell widgets and their visual order.
//! The orchestrator never holds a widget; it addresses them by [`CellKey`]
//! through this trait, which acts as the lookup table between cell records
//! and widgets.

mod memory;

pub use memory::{MemoryPresentation, WidgetSnapshot};

use crate::cell::{CellKey, CellVariant};

/// Rendered widgets for one notebook, addressed by cell key.
///
/// Every per-widget operation silently ignores unknown keys.
pub trait Presentation: Send {
    /// Remove every widget.
    fn clear(&mut self);

    /// Mount a widget for a new cell, right after `after` or at the end.
    fn mount(&mut self, key: CellKey, variant: CellVariant, content: &str, after: Option<CellKey>);

    /// Remove a widget.
    fn unmount(&mut self, key: CellKey);

    /// Swap the visual positions of two widgets.
    fn swap(&mut self, a: CellKey, b: CellKey);

    /// Current visual order. Authoritative for registry reconciliation.
    fn order(&self) -> Vec<CellKey>;

    fn focus(&mut self, key: CellKey);

    /// Place the cursor at the end of the widget, or at its start.
    fn move_cursor_to_end(&mut self, key: CellKey, to_start: bool);

    /// Cursor offset in characters.
    fn cursor(&self, key: CellKey) -> Option<usize>;

    fn set_cursor(&mut self, key: CellKey, offset: usize);

    /// Live text of the widget.
    fn value(&self, key: CellKey) -> Option<String>;

    fn set_value(&mut self, key: CellKey, value: &str);

    /// Re-render a widget, e.g. after an identity change.
    fn render(&mut self, key: CellKey, editable: bool);
}
