//! Ordered cell registry.
//!
//! The registry owns the cells of one notebook in document order. The
//! presentation decides visual order; whenever the two can diverge (an
//! insertion in the middle, a drag, a swap) the registry is reconciled with
//! [`CellRegistry::sort`] before any navigation query.

use rustc_hash::FxHashMap;

use crate::cell::{Cell, CellKey, CellRecord};

/// A change observed on the registry.
///
/// Drained by the orchestrator to drive persistence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegistryChange {
    /// A cell was appended.
    Added(CellKey),
    /// A cell was removed.
    Removed(CellKey),
    /// The order was re-derived and actually changed.
    Reordered,
    /// A cell's content changed.
    Changed(CellKey),
}

impl RegistryChange {
    /// Whether this change should schedule a save.
    ///
    /// Appends alone do not. A cell appended with content also reports
    /// [`Changed`](Self::Changed).
    pub fn triggers_save(&self) -> bool {
        !matches!(self, Self::Added(_))
    }
}

/// Ordered container of cells.
#[derive(Debug, Default)]
pub struct CellRegistry {
    cells: Vec<Cell>,
    /// Set when an insertion point was visual rather than positional.
    unreconciled: bool,
    changes: Vec<RegistryChange>,
}

impl CellRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a cell at the end, or right after `after`.
    ///
    /// Inserting anywhere but the end leaves the registry unreconciled until
    /// the next [`sort`](Self::sort). A cell seeded with content is reported
    /// as changed as well as added.
    pub fn append(&mut self, cell: Cell, after: Option<CellKey>) {
        let key = cell.key();
        let seeded = !cell.content().is_empty();
        let at_end = match after {
            None => true,
            Some(after) => self.last().is_some_and(|last| last.key() == after),
        };
        self.cells.push(cell);
        if !at_end {
            self.unreconciled = true;
        }
        self.changes.push(RegistryChange::Added(key));
        if seeded {
            self.changes.push(RegistryChange::Changed(key));
        }
    }

    /// Remove a cell by identity. Absent cells are ignored.
    pub fn remove(&mut self, key: CellKey) -> Option<Cell> {
        let index = self.position(key)?;
        let cell = self.cells.remove(index);
        self.changes.push(RegistryChange::Removed(key));
        Some(cell)
    }

    /// Re-derive order from the live presentation order.
    ///
    /// Cells the presentation does not know about keep their relative order
    /// at the end.
    pub fn sort(&mut self, presentation_order: &[CellKey]) {
        let before: Vec<CellKey> = self.keys();
        let mut by_key: FxHashMap<CellKey, Cell> =
            self.cells.drain(..).map(|cell| (cell.key(), cell)).collect();

        let mut ordered = Vec::with_capacity(by_key.len());
        for key in presentation_order {
            if let Some(cell) = by_key.remove(key) {
                ordered.push(cell);
            }
        }

        if !by_key.is_empty() {
            tracing::warn!(
                "{} cell(s) missing from presentation during reconciliation",
                by_key.len()
            );
            for key in &before {
                if let Some(cell) = by_key.remove(key) {
                    ordered.push(cell);
                }
            }
        }

        self.cells = ordered;
        self.unreconciled = false;

        if self.keys() != before {
            self.changes.push(RegistryChange::Reordered);
        }
    }

    /// Whether registry order is known to match presentation order.
    pub fn is_reconciled(&self) -> bool {
        !self.unreconciled
    }

    pub fn get_next(&self, key: CellKey) -> Option<&Cell> {
        self.debug_check_reconciled();
        let index = self.position(key)?;
        self.cells.get(index + 1)
    }

    pub fn get_prev(&self, key: CellKey) -> Option<&Cell> {
        self.debug_check_reconciled();
        let index = self.position(key)?;
        index.checked_sub(1).and_then(|i| self.cells.get(i))
    }

    pub fn first(&self) -> Option<&Cell> {
        self.cells.first()
    }

    pub fn last(&self) -> Option<&Cell> {
        self.cells.last()
    }

    pub fn at(&self, index: usize) -> Option<&Cell> {
        self.cells.get(index)
    }

    pub fn get(&self, key: CellKey) -> Option<&Cell> {
        self.cells.iter().find(|c| c.key() == key)
    }

    pub fn get_mut(&mut self, key: CellKey) -> Option<&mut Cell> {
        self.cells.iter_mut().find(|c| c.key() == key)
    }

    pub fn position(&self, key: CellKey) -> Option<usize> {
        self.cells.iter().position(|c| c.key() == key)
    }

    pub fn is_last(&self, key: CellKey) -> bool {
        self.last().is_some_and(|c| c.key() == key)
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Visit every cell in order.
    pub fn each(&self, mut f: impl FnMut(&Cell)) {
        for cell in &self.cells {
            f(cell);
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &Cell> {
        self.cells.iter()
    }

    pub fn keys(&self) -> Vec<CellKey> {
        self.cells.iter().map(Cell::key).collect()
    }

    /// Snapshot of the cells in exchange form.
    pub fn records(&self) -> Vec<CellRecord> {
        self.cells.iter().map(Cell::record).collect()
    }

    /// Set a cell's content, recording a change only if it differs.
    pub fn set_content(&mut self, key: CellKey, content: &str) -> bool {
        let Some(cell) = self.get_mut(key) else {
            return false;
        };
        if cell.content == content {
            return false;
        }
        cell.content = content.to_string();
        self.changes.push(RegistryChange::Changed(key));
        true
    }

    /// Drop every cell without recording removals.
    pub fn clear(&mut self) {
        self.cells.clear();
        self.unreconciled = false;
    }

    /// Drain the change stream.
    pub fn take_changes(&mut self) -> Vec<RegistryChange> {
        std::mem::take(&mut self.changes)
    }

    fn debug_check_reconciled(&self) {
        debug_assert!(
            !self.unreconciled,
            "navigation query on an unreconciled registry"
        );
    }
}
