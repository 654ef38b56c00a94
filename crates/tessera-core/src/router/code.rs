//! Handlers only code cells accept.

use crate::cell::{Cell, CellKey, CellVariant};
use crate::state::{Caret, NotebookState};

use super::CellEvent;

/// The cell was run from the editor: move on to the next cell, growing the
/// notebook when at the end. Ignored during a full run, whose own focus
/// changes would otherwise feed back into here.
pub(super) fn execute(state: &mut NotebookState, key: CellKey, _event: &CellEvent) {
    if state.is_executing {
        tracing::debug!(%key, "execute event ignored during notebook run");
        return;
    }

    if state.registry.is_last(key) {
        let fresh = state.insert_cell(CellVariant::Code, String::new(), None);
        state.focus_cell(fresh, Caret::Start);
    } else if let Some(next) = state.registry.get_next(key).map(Cell::key) {
        state.focus_cell(next, Caret::Start);
    }
}

/// Move trailing prose out of a code cell into a new text cell.
pub(super) fn split_text(state: &mut NotebookState, key: CellKey, event: &CellEvent) {
    let CellEvent::Text { payload } = event else {
        return;
    };

    let text = state.insert_cell(CellVariant::Text, payload.clone(), Some(key));
    state.focus_cell(text, Caret::Start);

    if state.sync_content(key).is_some_and(|c| c.is_empty()) {
        state.detach(key);
        state.ensure_not_empty();
    }
}

pub(super) fn browse_up(state: &mut NotebookState, key: CellKey, event: &CellEvent) {
    if let CellEvent::BrowseUp { from } = event {
        browse(state, key, *from, Direction::Up);
    }
}

pub(super) fn browse_down(state: &mut NotebookState, key: CellKey, event: &CellEvent) {
    if let CellEvent::BrowseDown { from } = event {
        browse(state, key, *from, Direction::Down);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Direction {
    Up,
    Down,
}

/// Show the nearest code cell past `from` in the raising cell.
fn browse(state: &mut NotebookState, key: CellKey, from: CellKey, direction: Direction) {
    let Some(found) = scan_for_code(state, from, direction) else {
        tracing::debug!(%key, %from, "browse found no code cell");
        return;
    };
    let Some(content) = state.sync_content(found) else {
        return;
    };

    state.presentation.set_value(key, &content);
    state.registry.set_content(key, &content);
    if let Some(cell) = state.registry.get_mut(key) {
        cell.browse = Some(found);
    }
    state
        .presentation
        .move_cursor_to_end(key, direction == Direction::Down);
}

/// Linear scan from `from` (exclusive), skipping non-code cells.
fn scan_for_code(state: &NotebookState, from: CellKey, direction: Direction) -> Option<CellKey> {
    let mut current = from;
    loop {
        let candidate = match direction {
            Direction::Up => state.registry.get_prev(current),
            Direction::Down => state.registry.get_next(current),
        }?;
        if candidate.is_code() {
            return Some(candidate.key());
        }
        current = candidate.key();
    }
}
