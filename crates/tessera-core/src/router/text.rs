//! Handlers only text cells accept.

use crate::cell::{Cell, CellKey, CellVariant};
use crate::state::{Caret, NotebookState};

use super::CellEvent;

/// Move trailing code out of a text cell into a new code cell.
///
/// An empty payload still creates a code cell when this is the last cell,
/// so the user always has somewhere to type code.
pub(super) fn split_code(state: &mut NotebookState, key: CellKey, event: &CellEvent) {
    let CellEvent::Code { payload } = event else {
        return;
    };

    if !payload.is_empty() || state.registry.is_last(key) {
        state.insert_cell(CellVariant::Code, payload.clone(), Some(key));
    }
    if let Some(next) = state.registry.get_next(key).map(Cell::key) {
        state.focus_cell(next, Caret::Start);
    }

    if state.sync_content(key).is_some_and(|c| c.is_empty()) {
        state.detach(key);
        state.ensure_not_empty();
    }
}
