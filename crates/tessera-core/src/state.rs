//! Mutable state of one notebook.
//!
//! Everything in here is mutated synchronously while the orchestrator holds
//! the state lock; no method suspends.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::cell::{Cell, CellId, CellKey, CellVariant};
use crate::presentation::Presentation;
use crate::registry::CellRegistry;

/// Notebook state shared between the orchestrator, running pipelines and
/// pending saves. Never locked across an `.await`.
pub type SharedState = Arc<Mutex<NotebookState>>;

/// Acquire the state lock. Poisoning is not propagated.
pub(crate) fn lock_state(state: &SharedState) -> MutexGuard<'_, NotebookState> {
    state.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Where to leave the cursor when focusing a cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Caret {
    Start,
    End,
}

/// Registry, presentation and run flags for one notebook.
pub struct NotebookState {
    pub(crate) registry: CellRegistry,
    pub(crate) presentation: Box<dyn Presentation>,
    /// True only while a freshly loaded notebook is being populated.
    pub(crate) is_rendering: bool,
    /// True only during a full-notebook run.
    pub(crate) is_executing: bool,
    next_code_id: usize,
    next_key: u64,
}

impl NotebookState {
    pub fn new(presentation: Box<dyn Presentation>) -> Self {
        Self {
            registry: CellRegistry::new(),
            presentation,
            is_rendering: false,
            is_executing: false,
            next_code_id: 0,
            next_key: 0,
        }
    }

    pub fn registry(&self) -> &CellRegistry {
        &self.registry
    }

    pub fn is_rendering(&self) -> bool {
        self.is_rendering
    }

    pub fn is_executing(&self) -> bool {
        self.is_executing
    }

    /// Allocate a key, and an id for code cells.
    fn create_cell(&mut self, variant: CellVariant, content: String) -> Cell {
        let key = CellKey::new(self.next_key);
        self.next_key += 1;

        let id = match variant {
            CellVariant::Code => {
                let id = CellId::new(self.next_code_id);
                self.next_code_id += 1;
                Some(id)
            }
            CellVariant::Text => None,
        };

        Cell::new(key, id, variant, content)
    }

    /// Create a cell, mount its widget and register it.
    ///
    /// An insertion after a given cell is visual, so the registry is
    /// reconciled with the presentation before returning.
    pub(crate) fn insert_cell(
        &mut self,
        variant: CellVariant,
        content: String,
        after: Option<CellKey>,
    ) -> CellKey {
        let cell = self.create_cell(variant, content);
        let key = cell.key();

        self.presentation.mount(key, variant, cell.content(), after);
        self.registry.append(cell, after);
        if !self.registry.is_reconciled() {
            self.sort();
        }

        tracing::debug!(%key, %variant, "cell inserted");
        key
    }

    /// Reconcile registry order with the presentation.
    pub(crate) fn sort(&mut self) {
        let order = self.presentation.order();
        self.registry.sort(&order);
    }

    /// Remove a cell from registry and presentation, without touching focus.
    pub(crate) fn detach(&mut self, key: CellKey) -> Option<Cell> {
        let cell = self.registry.remove(key)?;
        self.presentation.unmount(key);
        Some(cell)
    }

    /// Restore the "at least one cell" guarantee.
    ///
    /// Returns the key of the synthesized code cell, focused, if one was needed.
    pub(crate) fn ensure_not_empty(&mut self) -> Option<CellKey> {
        if !self.registry.is_empty() {
            return None;
        }
        let key = self.insert_cell(CellVariant::Code, String::new(), None);
        self.focus_cell(key, Caret::Start);
        Some(key)
    }

    /// Remove a cell and move focus to its neighbour.
    ///
    /// Focus goes to the next cell (cursor at start), else the previous one
    /// (cursor at end). An emptied notebook gets a fresh code cell.
    pub(crate) fn remove_cell(&mut self, key: CellKey) {
        if self.registry.get(key).is_none() {
            return;
        }
        let next = self.registry.get_next(key).map(Cell::key);
        let prev = self.registry.get_prev(key).map(Cell::key);

        self.detach(key);
        if self.ensure_not_empty().is_some() {
            return;
        }

        match (next, prev) {
            (Some(next), _) => self.focus_cell(next, Caret::Start),
            (None, Some(prev)) => self.focus_cell(prev, Caret::End),
            (None, None) => {}
        }
    }

    pub(crate) fn focus_cell(&mut self, key: CellKey, caret: Caret) {
        self.presentation.focus(key);
        self.presentation.move_cursor_to_end(key, caret == Caret::Start);
    }

    /// Pull the widget's live text into the registry and return it.
    ///
    /// Falls back to the registry content when the widget is not mounted.
    pub(crate) fn sync_content(&mut self, key: CellKey) -> Option<String> {
        let stored = self.registry.get(key)?.content().to_string();
        match self.presentation.value(key) {
            Some(live) => {
                self.registry.set_content(key, &live);
                Some(live)
            }
            None => Some(stored),
        }
    }

    /// Drop every cell and widget. Not reported on the change stream.
    pub(crate) fn clear(&mut self) {
        self.presentation.clear();
        self.registry.clear();
        self.registry.take_changes();
    }
}
