//! Cell event routing.
//!
//! A cell widget raises named events (navigate, move, clone, ...). Each
//! variant declares the events it accepts in a static dispatch table, keyed
//! by [`EventKind`]. A cell picks its table once, when it is constructed;
//! dispatch never re-inspects the variant.
//!
//! # Tables
//!
//! | Event | Code | Text |
//! |---|---|---|
//! | `navigateUp` / `navigateDown` | yes | yes |
//! | `moveUp` / `moveDown` | yes | yes |
//! | `clone`, `remove`, `switch`, `change` | yes | yes |
//! | `execute`, `text`, `browseUp`, `browseDown` | yes | no |
//! | `code` | no | yes |

mod code;
mod common;
mod text;

use serde::{Deserialize, Serialize};

use crate::cell::{CellKey, CellVariant};
use crate::state::NotebookState;

/// An event raised by a cell widget.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "camelCase")]
pub enum CellEvent {
    /// Focus the previous cell, cursor at its end.
    NavigateUp,
    /// Focus the next cell, cursor at its start.
    NavigateDown,
    /// Swap with the previous cell.
    MoveUp,
    /// Swap with the next cell.
    MoveDown,
    /// Insert a copy right after this cell.
    #[serde(rename = "clone")]
    Duplicate,
    /// Delete this cell.
    Remove,
    /// Replace with a cell of the opposite variant.
    Switch,
    /// The widget's text changed.
    Change { content: String },
    /// Text cell: split trailing code into a new code cell.
    Code { payload: String },
    /// Code cell: the cell was executed from the editor.
    Execute,
    /// Code cell: split trailing prose into a new text cell.
    Text { payload: String },
    /// Code cell: show the nearest earlier code cell before `from`.
    BrowseUp { from: CellKey },
    /// Code cell: show the nearest later code cell after `from`.
    BrowseDown { from: CellKey },
}

impl CellEvent {
    pub fn kind(&self) -> EventKind {
        match self {
            Self::NavigateUp => EventKind::NavigateUp,
            Self::NavigateDown => EventKind::NavigateDown,
            Self::MoveUp => EventKind::MoveUp,
            Self::MoveDown => EventKind::MoveDown,
            Self::Duplicate => EventKind::Duplicate,
            Self::Remove => EventKind::Remove,
            Self::Switch => EventKind::Switch,
            Self::Change { .. } => EventKind::Change,
            Self::Code { .. } => EventKind::Code,
            Self::Execute => EventKind::Execute,
            Self::Text { .. } => EventKind::Text,
            Self::BrowseUp { .. } => EventKind::BrowseUp,
            Self::BrowseDown { .. } => EventKind::BrowseDown,
        }
    }
}

/// Name of a cell event, without payload. Key of the dispatch tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    NavigateUp,
    NavigateDown,
    MoveUp,
    MoveDown,
    Duplicate,
    Remove,
    Switch,
    Change,
    Code,
    Execute,
    Text,
    BrowseUp,
    BrowseDown,
}

impl EventKind {
    /// Wire name of the event, as raised by widgets.
    pub fn name(&self) -> &'static str {
        match self {
            Self::NavigateUp => "navigateUp",
            Self::NavigateDown => "navigateDown",
            Self::MoveUp => "moveUp",
            Self::MoveDown => "moveDown",
            Self::Duplicate => "clone",
            Self::Remove => "remove",
            Self::Switch => "switch",
            Self::Change => "change",
            Self::Code => "code",
            Self::Execute => "execute",
            Self::Text => "text",
            Self::BrowseUp => "browseUp",
            Self::BrowseDown => "browseDown",
        }
    }
}

impl std::fmt::Display for EventKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// A structural mutation run in response to an event.
///
/// Handlers run to completion under the state lock and never fail; no-ops
/// (boundaries, missing cells) are silent.
pub(crate) type Handler = fn(&mut NotebookState, CellKey, &CellEvent);

/// Events accepted by one cell variant.
#[derive(Debug)]
pub struct HandlerSet {
    variant: CellVariant,
    entries: &'static [(EventKind, Handler)],
}

static CODE_HANDLERS: [(EventKind, Handler); 12] = [
    (EventKind::NavigateUp, common::navigate_up),
    (EventKind::NavigateDown, common::navigate_down),
    (EventKind::MoveUp, common::move_up),
    (EventKind::MoveDown, common::move_down),
    (EventKind::Duplicate, common::duplicate),
    (EventKind::Remove, common::remove),
    (EventKind::Switch, common::switch),
    (EventKind::Change, common::change),
    (EventKind::Execute, code::execute),
    (EventKind::Text, code::split_text),
    (EventKind::BrowseUp, code::browse_up),
    (EventKind::BrowseDown, code::browse_down),
];

static TEXT_HANDLERS: [(EventKind, Handler); 9] = [
    (EventKind::NavigateUp, common::navigate_up),
    (EventKind::NavigateDown, common::navigate_down),
    (EventKind::MoveUp, common::move_up),
    (EventKind::MoveDown, common::move_down),
    (EventKind::Duplicate, common::duplicate),
    (EventKind::Remove, common::remove),
    (EventKind::Switch, common::switch),
    (EventKind::Change, common::change),
    (EventKind::Code, text::split_code),
];

static CODE_SET: HandlerSet = HandlerSet {
    variant: CellVariant::Code,
    entries: &CODE_HANDLERS,
};

static TEXT_SET: HandlerSet = HandlerSet {
    variant: CellVariant::Text,
    entries: &TEXT_HANDLERS,
};

impl HandlerSet {
    /// Table for a variant. Called once per cell, at construction.
    pub(crate) fn for_variant(variant: CellVariant) -> &'static HandlerSet {
        match variant {
            CellVariant::Code => &CODE_SET,
            CellVariant::Text => &TEXT_SET,
        }
    }

    pub fn variant(&self) -> CellVariant {
        self.variant
    }

    pub fn accepts(&self, kind: EventKind) -> bool {
        self.get(kind).is_some()
    }

    /// Event names this variant accepts, in table order.
    pub fn events(&self) -> impl Iterator<Item = EventKind> + '_ {
        self.entries.iter().map(|(kind, _)| *kind)
    }

    fn get(&self, kind: EventKind) -> Option<Handler> {
        self.entries
            .iter()
            .find(|(k, _)| *k == kind)
            .map(|(_, handler)| *handler)
    }
}

/// What happened to a dispatched event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dispatch {
    /// A handler ran.
    Handled,
    /// The cell's variant does not declare this event.
    Unsupported,
    /// No such cell in the registry.
    MissingCell,
}

/// Route an event raised by `key` to its variant's handler.
pub fn dispatch(state: &mut NotebookState, key: CellKey, event: &CellEvent) -> Dispatch {
    let Some(cell) = state.registry.get(key) else {
        tracing::debug!(%key, event = %event.kind(), "event for unknown cell ignored");
        return Dispatch::MissingCell;
    };
    let handlers = cell.handlers();

    let Some(handler) = handlers.get(event.kind()) else {
        tracing::debug!(
            %key,
            event = %event.kind(),
            variant = %handlers.variant(),
            "event not declared for variant"
        );
        return Dispatch::Unsupported;
    };

    tracing::debug!(%key, event = %event.kind(), "dispatching cell event");
    handler(state, key, event);
    Dispatch::Handled
}
