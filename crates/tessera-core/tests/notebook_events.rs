//! Integration tests for cell events routed through the notebook.

mod common;

use common::{FakeStore, harness, loaded};
use tessera_core::{
    CellEvent, CellId, CellKey, CellRecord, CellVariant, Dispatch, Presentation, RenderOutcome,
};

fn code(content: &str) -> CellRecord {
    CellRecord::code(content)
}

fn text(content: &str) -> CellRecord {
    CellRecord::text(content)
}

// =============================================================================
// Rendering
// =============================================================================

#[tokio::test]
async fn test_render_new_notebook_creates_one_code_cell() {
    let h = harness(FakeStore::fresh("ada"), Some("ada"));

    assert_eq!(h.notebook.render().await, RenderOutcome::Created);

    let cells = h.notebook.cells();
    assert_eq!(cells.len(), 1);
    assert_eq!(cells[0].variant(), CellVariant::Code);
    assert_eq!(cells[0].content(), "");
    assert_eq!(h.presentation.focused(), Some(cells[0].key()));
    assert!(!h.notebook.is_rendering());
}

#[tokio::test]
async fn test_render_loads_records_and_focuses_last_cell() {
    let h = loaded(&[code("1+1"), text("note"), code("2+2")]).await;

    assert_eq!(h.notebook.records(), vec![code("1+1"), text("note"), code("2+2")]);

    let last = h.notebook.keys()[2];
    assert_eq!(h.presentation.focused(), Some(last));
    assert_eq!(h.presentation.widget(last).unwrap().cursor, 3);
}

#[tokio::test]
async fn test_render_empty_document_yields_one_code_cell() {
    let h = loaded(&[]).await;
    assert_eq!(h.notebook.records(), vec![code("")]);
}

#[tokio::test]
async fn test_render_marks_editors_read_only_for_other_users() {
    let h = harness(FakeStore::existing("nb-7", "ada", &[code("x")]), Some("grace"));
    h.notebook.render().await;

    let widgets = h.presentation.widgets();
    assert!(widgets.iter().all(|w| !w.editable));
}

// =============================================================================
// Identity and ordering
// =============================================================================

#[tokio::test]
async fn test_code_ids_are_sequential() {
    let h = harness(FakeStore::fresh("ada"), Some("ada"));

    let keys: Vec<CellKey> = (0..4).map(|i| h.notebook.append_code(format!("{i}"), None)).collect();
    let prose = h.notebook.append_text("prose", None);

    let ids: Vec<Option<CellId>> = keys
        .iter()
        .map(|k| h.notebook.cell(*k).unwrap().id())
        .collect();
    assert_eq!(
        ids,
        (0..4).map(|i| Some(CellId::new(i))).collect::<Vec<_>>()
    );
    assert_eq!(h.notebook.cell(prose).unwrap().id(), None);
}

#[tokio::test]
async fn test_append_after_inserts_visually() {
    let h = loaded(&[code("a"), code("b")]).await;
    let keys = h.notebook.keys();

    let inserted = h.notebook.append_text("between", Some(keys[0]));

    assert_eq!(h.notebook.keys(), vec![keys[0], inserted, keys[1]]);
    assert_eq!(h.notebook.keys(), h.presentation.order());
}

#[tokio::test]
async fn test_removing_only_cell_leaves_one_code_cell() {
    let h = harness(FakeStore::fresh("ada"), Some("ada"));
    h.notebook.render().await;
    let only = h.notebook.keys()[0];

    h.notebook.remove(only);

    let cells = h.notebook.cells();
    assert_eq!(cells.len(), 1);
    assert_ne!(cells[0].key(), only);
    assert_eq!(cells[0].variant(), CellVariant::Code);
    assert_eq!(cells[0].content(), "");
    assert_eq!(h.presentation.focused(), Some(cells[0].key()));
}

#[tokio::test]
async fn test_removing_only_text_cell_leaves_one_code_cell() {
    let h = loaded(&[text("note")]).await;
    let only = h.notebook.keys()[0];

    h.notebook.dispatch(only, &CellEvent::Remove);

    assert_eq!(h.notebook.records(), vec![code("")]);
}

#[tokio::test]
async fn test_remove_focuses_next_then_previous() {
    let h = loaded(&[code("a"), code("b"), code("c")]).await;
    let keys = h.notebook.keys();

    h.notebook.remove(keys[1]);
    assert_eq!(h.presentation.focused(), Some(keys[2]));
    assert_eq!(h.presentation.widget(keys[2]).unwrap().cursor, 0);

    h.notebook.remove(keys[2]);
    assert_eq!(h.presentation.focused(), Some(keys[0]));
    assert_eq!(h.presentation.widget(keys[0]).unwrap().cursor, 1);
}

#[tokio::test]
async fn test_move_at_boundaries_is_noop() {
    let h = loaded(&[code("a"), code("b"), code("c")]).await;
    let keys = h.notebook.keys();

    h.notebook.dispatch(keys[0], &CellEvent::MoveUp);
    h.notebook.dispatch(keys[2], &CellEvent::MoveDown);

    assert_eq!(h.notebook.keys(), keys);
    assert_eq!(h.presentation.order(), keys);
}

#[tokio::test]
async fn test_moves_keep_registry_and_presentation_aligned() {
    let h = loaded(&[code("a"), text("b"), code("c"), text("d")]).await;
    let keys = h.notebook.keys();

    h.notebook.dispatch(keys[0], &CellEvent::MoveDown);
    h.notebook.dispatch(keys[0], &CellEvent::MoveDown);
    h.notebook.dispatch(keys[3], &CellEvent::MoveUp);
    h.notebook.dispatch(keys[1], &CellEvent::MoveUp);

    assert_eq!(h.notebook.keys(), h.presentation.order());
    assert_eq!(h.notebook.keys(), vec![keys[1], keys[2], keys[3], keys[0]]);
}

// =============================================================================
// Structural events
// =============================================================================

#[tokio::test]
async fn test_switch_preserves_content_position_and_cursor() {
    let h = loaded(&[text("intro"), code("x=1"), code("y")]).await;
    let keys = h.notebook.keys();
    let mut presentation = h.presentation.clone();
    presentation.set_cursor(keys[1], 2);

    assert_eq!(h.notebook.dispatch(keys[1], &CellEvent::Switch), Dispatch::Handled);

    let cells = h.notebook.cells();
    let switched = &cells[1];
    assert_ne!(switched.key(), keys[1]);
    assert_eq!(switched.variant(), CellVariant::Text);
    assert_eq!(switched.content(), "x=1");
    assert!(h.notebook.cell(keys[1]).is_none());
    assert_eq!(h.presentation.focused(), Some(switched.key()));
    assert_eq!(h.presentation.widget(switched.key()).unwrap().cursor, 2);
}

#[tokio::test]
async fn test_duplicate_copies_live_content() {
    let h = loaded(&[code("a"), code("b")]).await;
    let keys = h.notebook.keys();
    h.presentation.type_text(keys[0], "edited");

    h.notebook.dispatch(keys[0], &CellEvent::Duplicate);

    let records = h.notebook.records();
    assert_eq!(records, vec![code("edited"), code("edited"), code("b")]);
    assert_eq!(h.presentation.focused(), Some(h.notebook.keys()[1]));
}

#[tokio::test]
async fn test_navigation_places_cursor() {
    let h = loaded(&[code("abc"), code("de")]).await;
    let keys = h.notebook.keys();

    h.notebook.dispatch(keys[1], &CellEvent::NavigateUp);
    assert_eq!(h.presentation.focused(), Some(keys[0]));
    assert_eq!(h.presentation.widget(keys[0]).unwrap().cursor, 3);

    h.notebook.dispatch(keys[0], &CellEvent::NavigateDown);
    assert_eq!(h.presentation.focused(), Some(keys[1]));
    assert_eq!(h.presentation.widget(keys[1]).unwrap().cursor, 0);
}

#[tokio::test]
async fn test_execute_event_on_last_cell_grows_notebook() {
    let h = loaded(&[code("a")]).await;
    let first = h.notebook.keys()[0];

    h.notebook.dispatch(first, &CellEvent::Execute);

    let keys = h.notebook.keys();
    assert_eq!(keys.len(), 2);
    assert_eq!(h.notebook.records()[1], code(""));
    assert_eq!(h.presentation.focused(), Some(keys[1]));
}

#[tokio::test]
async fn test_text_payload_splits_code_cell() {
    let h = loaded(&[code("x = 1")]).await;
    let first = h.notebook.keys()[0];

    h.notebook.dispatch(
        first,
        &CellEvent::Text {
            payload: "Some prose".into(),
        },
    );

    assert_eq!(h.notebook.records(), vec![code("x = 1"), text("Some prose")]);
    assert_eq!(h.presentation.focused(), Some(h.notebook.keys()[1]));
}

#[tokio::test]
async fn test_empty_code_payload_on_last_empty_text_cell() {
    let h = loaded(&[code("x"), text("")]).await;
    let prose = h.notebook.keys()[1];

    h.notebook.dispatch(
        prose,
        &CellEvent::Code {
            payload: String::new(),
        },
    );

    assert_eq!(h.notebook.records(), vec![code("x"), code("")]);
    assert!(h.notebook.cell(prose).is_none());
    assert_eq!(h.presentation.focused(), Some(h.notebook.keys()[1]));
}

#[tokio::test]
async fn test_browse_up_locates_previous_code_cell() {
    let h = loaded(&[code("a"), code("b"), code("c"), code("d")]).await;
    let keys = h.notebook.keys();

    h.notebook.dispatch(keys[2], &CellEvent::BrowseUp { from: keys[3] });

    let raised = h.notebook.cell(keys[2]).unwrap();
    assert_eq!(raised.browse_position(), Some(keys[2]));
    assert_eq!(raised.content(), "c");
    assert_eq!(h.presentation.widget(keys[2]).unwrap().value, "c");
}

#[tokio::test]
async fn test_browse_skips_text_cells() {
    let h = loaded(&[code("first"), text("note"), code("last")]).await;
    let keys = h.notebook.keys();

    h.notebook.dispatch(keys[2], &CellEvent::BrowseUp { from: keys[2] });
    assert_eq!(h.notebook.cell(keys[2]).unwrap().browse_position(), Some(keys[0]));
    assert_eq!(h.presentation.widget(keys[2]).unwrap().value, "first");

    h.notebook.dispatch(keys[2], &CellEvent::BrowseDown { from: keys[0] });
    assert_eq!(h.notebook.cell(keys[2]).unwrap().browse_position(), Some(keys[2]));
}

#[tokio::test]
async fn test_browse_without_match_changes_nothing() {
    let h = loaded(&[code("only")]).await;
    let only = h.notebook.keys()[0];

    h.notebook.dispatch(only, &CellEvent::BrowseUp { from: only });

    let cell = h.notebook.cell(only).unwrap();
    assert_eq!(cell.browse_position(), None);
    assert_eq!(cell.content(), "only");
}

#[tokio::test]
async fn test_undeclared_and_unknown_events() {
    let h = loaded(&[text("note")]).await;
    let prose = h.notebook.keys()[0];

    assert_eq!(h.notebook.dispatch(prose, &CellEvent::Execute), Dispatch::Unsupported);
    assert_eq!(
        h.notebook.dispatch(CellKey::new(999), &CellEvent::Remove),
        Dispatch::MissingCell
    );
    assert_eq!(h.notebook.records(), vec![text("note")]);
}
