//! Handlers shared by code and text cells.

use crate::cell::{Cell, CellKey};
use crate::state::{Caret, NotebookState};

use super::CellEvent;

pub(super) fn navigate_up(state: &mut NotebookState, key: CellKey, _event: &CellEvent) {
    if let Some(prev) = state.registry.get_prev(key).map(Cell::key) {
        state.focus_cell(prev, Caret::End);
    }
}

pub(super) fn navigate_down(state: &mut NotebookState, key: CellKey, _event: &CellEvent) {
    if let Some(next) = state.registry.get_next(key).map(Cell::key) {
        state.focus_cell(next, Caret::Start);
    }
}

pub(super) fn move_up(state: &mut NotebookState, key: CellKey, _event: &CellEvent) {
    let Some(prev) = state.registry.get_prev(key).map(Cell::key) else {
        return;
    };
    swap_and_reconcile(state, key, prev);
}

pub(super) fn move_down(state: &mut NotebookState, key: CellKey, _event: &CellEvent) {
    let Some(next) = state.registry.get_next(key).map(Cell::key) else {
        return;
    };
    swap_and_reconcile(state, key, next);
}

/// Visual swap first; the registry follows the presentation.
fn swap_and_reconcile(state: &mut NotebookState, key: CellKey, neighbour: CellKey) {
    state.presentation.swap(key, neighbour);
    state.presentation.focus(key);
    state.sort();
}

pub(super) fn duplicate(state: &mut NotebookState, key: CellKey, _event: &CellEvent) {
    let Some(variant) = state.registry.get(key).map(Cell::variant) else {
        return;
    };
    let content = state.sync_content(key).unwrap_or_default();
    let cursor = state.presentation.cursor(key).unwrap_or(0);

    let copy = state.insert_cell(variant, content, Some(key));
    state.presentation.focus(copy);
    state.presentation.set_cursor(copy, cursor);
}

pub(super) fn remove(state: &mut NotebookState, key: CellKey, _event: &CellEvent) {
    state.remove_cell(key);
}

pub(super) fn switch(state: &mut NotebookState, key: CellKey, _event: &CellEvent) {
    let Some(variant) = state.registry.get(key).map(|c| c.variant().opposite()) else {
        return;
    };
    let content = state.sync_content(key).unwrap_or_default();
    let cursor = state.presentation.cursor(key).unwrap_or(0);

    let replacement = state.insert_cell(variant, content, Some(key));
    state.detach(key);
    state.presentation.focus(replacement);
    state.presentation.set_cursor(replacement, cursor);
}

pub(super) fn change(state: &mut NotebookState, key: CellKey, event: &CellEvent) {
    if let CellEvent::Change { content } = event {
        state.registry.set_content(key, content);
    }
}
