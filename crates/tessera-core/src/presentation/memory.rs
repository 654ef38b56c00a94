//! Headless presentation.
//!
//! Keeps widget state in memory. Used by the CLI to drive notebooks without
//! an editor, and by tests to observe focus, cursor and visual order.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::cell::{CellKey, CellVariant};

use super::Presentation;

/// Observable state of one headless widget.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WidgetSnapshot {
    pub key: CellKey,
    pub variant: CellVariant,
    pub value: String,
    pub cursor: usize,
    pub editable: bool,
    /// Number of times the widget was re-rendered after mounting.
    pub renders: usize,
}

#[derive(Debug, Default)]
struct Inner {
    widgets: Vec<WidgetSnapshot>,
    focused: Option<CellKey>,
}

impl Inner {
    fn index(&self, key: CellKey) -> Option<usize> {
        self.widgets.iter().position(|w| w.key == key)
    }

    fn widget_mut(&mut self, key: CellKey) -> Option<&mut WidgetSnapshot> {
        self.widgets.iter_mut().find(|w| w.key == key)
    }
}

/// In-memory presentation. Clones share the same widgets.
#[derive(Debug, Clone, Default)]
pub struct MemoryPresentation {
    inner: Arc<Mutex<Inner>>,
}

impl MemoryPresentation {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Key of the focused widget.
    pub fn focused(&self) -> Option<CellKey> {
        self.lock().focused
    }

    pub fn widget(&self, key: CellKey) -> Option<WidgetSnapshot> {
        let inner = self.lock();
        inner.widgets.iter().find(|w| w.key == key).cloned()
    }

    pub fn widgets(&self) -> Vec<WidgetSnapshot> {
        self.lock().widgets.clone()
    }

    /// Simulate the user typing: replace the widget's text without going
    /// through the orchestrator.
    pub fn type_text(&self, key: CellKey, value: &str) {
        let mut inner = self.lock();
        if let Some(widget) = inner.widget_mut(key) {
            widget.value = value.to_string();
            widget.cursor = value.chars().count();
        }
    }

    /// Simulate a drag: move `key` so it sits at `index` in visual order.
    /// The registry is not told; callers must reconcile.
    pub fn drag_to(&self, key: CellKey, index: usize) {
        let mut inner = self.lock();
        if let Some(from) = inner.index(key) {
            let widget = inner.widgets.remove(from);
            let index = index.min(inner.widgets.len());
            inner.widgets.insert(index, widget);
        }
    }
}

impl Presentation for MemoryPresentation {
    fn clear(&mut self) {
        let mut inner = self.lock();
        inner.widgets.clear();
        inner.focused = None;
    }

    fn mount(&mut self, key: CellKey, variant: CellVariant, content: &str, after: Option<CellKey>) {
        let mut inner = self.lock();
        let widget = WidgetSnapshot {
            key,
            variant,
            value: content.to_string(),
            cursor: 0,
            editable: true,
            renders: 0,
        };
        match after.and_then(|after| inner.index(after)) {
            Some(index) => inner.widgets.insert(index + 1, widget),
            None => inner.widgets.push(widget),
        }
    }

    fn unmount(&mut self, key: CellKey) {
        let mut inner = self.lock();
        inner.widgets.retain(|w| w.key != key);
        if inner.focused == Some(key) {
            inner.focused = None;
        }
    }

    fn swap(&mut self, a: CellKey, b: CellKey) {
        let mut inner = self.lock();
        if let (Some(i), Some(j)) = (inner.index(a), inner.index(b)) {
            inner.widgets.swap(i, j);
        }
    }

    fn order(&self) -> Vec<CellKey> {
        self.lock().widgets.iter().map(|w| w.key).collect()
    }

    fn focus(&mut self, key: CellKey) {
        let mut inner = self.lock();
        if inner.index(key).is_some() {
            inner.focused = Some(key);
        }
    }

    fn move_cursor_to_end(&mut self, key: CellKey, to_start: bool) {
        let mut inner = self.lock();
        if let Some(widget) = inner.widget_mut(key) {
            widget.cursor = if to_start {
                0
            } else {
                widget.value.chars().count()
            };
        }
    }

    fn cursor(&self, key: CellKey) -> Option<usize> {
        let inner = self.lock();
        inner.widgets.iter().find(|w| w.key == key).map(|w| w.cursor)
    }

    fn set_cursor(&mut self, key: CellKey, offset: usize) {
        let mut inner = self.lock();
        if let Some(widget) = inner.widget_mut(key) {
            widget.cursor = offset.min(widget.value.chars().count());
        }
    }

    fn value(&self, key: CellKey) -> Option<String> {
        let inner = self.lock();
        inner.widgets.iter().find(|w| w.key == key).map(|w| w.value.clone())
    }

    fn set_value(&mut self, key: CellKey, value: &str) {
        let mut inner = self.lock();
        if let Some(widget) = inner.widget_mut(key) {
            widget.value = value.to_string();
            widget.cursor = widget.cursor.min(value.chars().count());
        }
    }

    fn render(&mut self, key: CellKey, editable: bool) {
        let mut inner = self.lock();
        if let Some(widget) = inner.widget_mut(key) {
            widget.editable = editable;
            widget.renders += 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(k: u64) -> CellKey {
        CellKey::new(k)
    }

    #[test]
    fn test_mount_after_inserts_visually() {
        let mut p = MemoryPresentation::new();
        p.mount(key(0), CellVariant::Code, "a", None);
        p.mount(key(1), CellVariant::Code, "b", None);
        p.mount(key(2), CellVariant::Text, "c", Some(key(0)));
        assert_eq!(p.order(), vec![key(0), key(2), key(1)]);
    }

    #[test]
    fn test_clones_share_state() {
        let mut p = MemoryPresentation::new();
        let observer = p.clone();
        p.mount(key(0), CellVariant::Code, "abc", None);
        p.focus(key(0));
        p.move_cursor_to_end(key(0), false);

        assert_eq!(observer.focused(), Some(key(0)));
        assert_eq!(observer.cursor(key(0)), Some(3));
    }

    #[test]
    fn test_unknown_keys_are_ignored() {
        let mut p = MemoryPresentation::new();
        p.focus(key(5));
        p.set_value(key(5), "x");
        p.unmount(key(5));
        assert!(p.focused().is_none());
        assert!(p.value(key(5)).is_none());
    }

    #[test]
    fn test_drag_reorders_without_registry() {
        let mut p = MemoryPresentation::new();
        for k in 0..3 {
            p.mount(key(k), CellVariant::Code, "", None);
        }
        p.drag_to(key(2), 0);
        assert_eq!(p.order(), vec![key(2), key(0), key(1)]);
    }
}
