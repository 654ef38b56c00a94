//! Notebook orchestrator.
//!
//! Owns the shared state, the execution context and the persistence
//! collaborators for one notebook, and drives its lifecycle: render, edit,
//! execute, save, teardown.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, Weak};

use tokio::task::JoinHandle;

use crate::cell::{Cell, CellKey, CellRecord, CellVariant};
use crate::config::NotebookConfig;
use crate::error::{Error, Result};
use crate::execute::{
    CommandContext, ExecutionContext, ExecutionObserver, ExecutionPipeline, ExecutionSummary,
};
use crate::identity::{IdentityProvider, SessionIdentity, UserId};
use crate::navigation::{LogNavigator, NavigateOptions, Navigator};
use crate::persist::PersistenceTrigger;
use crate::presentation::{MemoryPresentation, Presentation};
use crate::registry::RegistryChange;
use crate::router::{self, CellEvent, Dispatch};
use crate::state::{Caret, NotebookState, SharedState, lock_state};
use crate::store::{PersistedStore, Serializer};

/// Result of [`Notebook::render`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderOutcome {
    /// The store was new; one empty code cell was synthesized.
    Created,
    /// The persisted notebook was loaded into `cells` cells.
    Loaded { cells: usize },
    /// Fetch or parse failed; the host was sent to the home route.
    Unavailable,
}

/// Why a save did not reach the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    Rendering,
    Anonymous,
    NotOwner,
    Empty,
}

/// Result of [`Notebook::save_now`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SaveOutcome {
    Saved,
    Skipped(SkipReason),
    /// Serialization or the store failed. Logged, never raised.
    Failed(String),
}

struct Inner {
    state: SharedState,
    context: Arc<dyn ExecutionContext>,
    store: Arc<dyn PersistedStore>,
    serializer: Arc<dyn Serializer>,
    identity: Arc<dyn IdentityProvider>,
    navigator: Arc<dyn Navigator>,
    trigger: PersistenceTrigger,
    config: NotebookConfig,
    torn_down: AtomicBool,
}

impl Drop for Inner {
    fn drop(&mut self) {
        if !self.torn_down.load(Ordering::SeqCst) {
            self.trigger.cancel();
            self.context.release();
        }
    }
}

/// Handle to one notebook. Clones share the same notebook.
#[derive(Clone)]
pub struct Notebook {
    inner: Arc<Inner>,
}

/// Builder for [`Notebook`].
///
/// Only the store and the serializer are required. Defaults: a
/// [`CommandContext`] running `sh -c`, a headless [`MemoryPresentation`],
/// an anonymous [`SessionIdentity`] and a [`LogNavigator`].
pub struct NotebookBuilder {
    store: Arc<dyn PersistedStore>,
    serializer: Arc<dyn Serializer>,
    context: Option<Arc<dyn ExecutionContext>>,
    presentation: Option<Box<dyn Presentation>>,
    identity: Option<Arc<dyn IdentityProvider>>,
    navigator: Option<Arc<dyn Navigator>>,
    config: NotebookConfig,
}

impl NotebookBuilder {
    pub fn context(mut self, context: Arc<dyn ExecutionContext>) -> Self {
        self.context = Some(context);
        self
    }

    pub fn presentation(mut self, presentation: impl Presentation + 'static) -> Self {
        self.presentation = Some(Box::new(presentation));
        self
    }

    pub fn identity(mut self, identity: Arc<dyn IdentityProvider>) -> Self {
        self.identity = Some(identity);
        self
    }

    pub fn navigator(mut self, navigator: Arc<dyn Navigator>) -> Self {
        self.navigator = Some(navigator);
        self
    }

    pub fn config(mut self, config: NotebookConfig) -> Self {
        self.config = config;
        self
    }

    pub fn build(self) -> Notebook {
        let presentation = self
            .presentation
            .unwrap_or_else(|| Box::new(MemoryPresentation::new()));

        Notebook {
            inner: Arc::new(Inner {
                state: Arc::new(Mutex::new(NotebookState::new(presentation))),
                context: self
                    .context
                    .unwrap_or_else(|| Arc::new(CommandContext::default())),
                store: self.store,
                serializer: self.serializer,
                identity: self
                    .identity
                    .unwrap_or_else(|| Arc::new(SessionIdentity::anonymous())),
                navigator: self.navigator.unwrap_or_else(|| Arc::new(LogNavigator)),
                trigger: PersistenceTrigger::new(self.config.save_delay),
                config: self.config,
                torn_down: AtomicBool::new(false),
            }),
        }
    }
}

impl Notebook {
    pub fn builder(store: Arc<dyn PersistedStore>, serializer: Arc<dyn Serializer>) -> NotebookBuilder {
        NotebookBuilder {
            store,
            serializer,
            context: None,
            presentation: None,
            identity: None,
            navigator: None,
            config: NotebookConfig::default(),
        }
    }

    pub fn config(&self) -> &NotebookConfig {
        &self.inner.config
    }

    fn lock(&self) -> MutexGuard<'_, NotebookState> {
        lock_state(&self.inner.state)
    }

    /// Snapshot of the cells in registry order.
    pub fn cells(&self) -> Vec<Cell> {
        self.lock().registry.iter().cloned().collect()
    }

    pub fn records(&self) -> Vec<CellRecord> {
        self.lock().registry.records()
    }

    pub fn keys(&self) -> Vec<CellKey> {
        self.lock().registry.keys()
    }

    pub fn cell(&self, key: CellKey) -> Option<Cell> {
        self.lock().registry.get(key).cloned()
    }

    pub fn len(&self) -> usize {
        self.lock().registry.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().registry.is_empty()
    }

    pub fn is_rendering(&self) -> bool {
        self.lock().is_rendering
    }

    pub fn is_executing(&self) -> bool {
        self.lock().is_executing
    }

    pub fn is_save_pending(&self) -> bool {
        self.inner.trigger.is_pending()
    }

    /// Run `f` under the state lock, then request a save if it produced a
    /// change that warrants one.
    fn mutate<R>(&self, f: impl FnOnce(&mut NotebookState) -> R) -> R {
        let (result, dirty) = {
            let mut state = self.lock();
            let result = f(&mut state);
            let changes = state.registry.take_changes();
            let dirty =
                !state.is_rendering && changes.iter().any(RegistryChange::triggers_save);
            (result, dirty)
        };
        if dirty {
            self.save();
        }
        result
    }

    // =========================================================================
    // Lifecycle
    // =========================================================================

    /// Populate the notebook from its store.
    ///
    /// Saves are suppressed for the duration, and any change produced while
    /// populating is discarded.
    pub async fn render(&self) -> RenderOutcome {
        {
            let mut state = self.lock();
            state.is_rendering = true;
            state.clear();
        }
        self.inner.trigger.cancel();

        let outcome = if self.inner.store.is_new() {
            self.populate(Vec::new());
            self.update_user();
            RenderOutcome::Created
        } else {
            match self.load_records().await {
                Ok(records) => {
                    let cells = self.populate(records);
                    self.render_editors();
                    RenderOutcome::Loaded { cells }
                }
                Err(e) => {
                    tracing::warn!("notebook unavailable: {}", e);
                    self.inner.navigator.navigate(
                        &self.inner.config.home_route,
                        NavigateOptions { trigger: true },
                    );
                    RenderOutcome::Unavailable
                }
            }
        };

        {
            let mut state = self.lock();
            state.registry.take_changes();
            state.is_rendering = false;
        }

        tracing::info!(?outcome, "notebook rendered");
        outcome
    }

    async fn load_records(&self) -> Result<Vec<CellRecord>> {
        self.inner.store.fetch().await?;
        let text = self.inner.store.exchange_representation();
        self.inner.serializer.deserialize(&text)
    }

    /// Mount one cell per record and focus the last one.
    fn populate(&self, records: Vec<CellRecord>) -> usize {
        let mut state = self.lock();
        for record in records {
            state.insert_cell(record.variant, record.content, None);
        }
        if state.registry.is_empty() {
            state.insert_cell(CellVariant::Code, String::new(), None);
        }
        if let Some(last) = state.registry.last().map(Cell::key) {
            state.focus_cell(last, Caret::End);
        }
        state.registry.len()
    }

    /// Copy the notebook through the store and navigate to the copy.
    pub async fn fork(&self) -> Result<String> {
        let id = self.inner.store.fork().await?;
        tracing::info!(%id, "notebook forked");
        self.inner
            .navigator
            .navigate(&self.inner.config.route_for(&id), NavigateOptions { trigger: true });
        Ok(id)
    }

    /// Request a debounced save.
    pub fn save(&self) {
        if self.is_rendering() {
            tracing::debug!("save suppressed while rendering");
            return;
        }
        let weak: Weak<Inner> = Arc::downgrade(&self.inner);
        self.inner.trigger.touch(async move {
            if let Some(inner) = weak.upgrade() {
                Notebook { inner }.save_now().await;
            }
        });
    }

    /// Save immediately, bypassing the debounce.
    pub async fn save_now(&self) -> SaveOutcome {
        let text = match self.prepare_save() {
            Ok(text) => text,
            Err(outcome) => {
                tracing::debug!(?outcome, "save skipped");
                return outcome;
            }
        };

        let store = &self.inner.store;
        let first_save = store.is_new();
        store.set_exchange_representation(text);

        if let Err(e) = store.save(true).await {
            tracing::warn!("save failed: {}", e);
            return SaveOutcome::Failed(e.to_string());
        }

        if first_save {
            if let Some(id) = store.id() {
                self.inner
                    .navigator
                    .navigate(&self.inner.config.route_for(&id), NavigateOptions { trigger: false });
            }
        }
        tracing::info!("notebook saved");
        SaveOutcome::Saved
    }

    fn prepare_save(&self) -> std::result::Result<String, SaveOutcome> {
        let records = {
            let mut state = self.lock();
            if state.is_rendering {
                return Err(SaveOutcome::Skipped(SkipReason::Rendering));
            }
            for key in state.registry.keys() {
                state.sync_content(key);
            }
            // Whatever the sync changed is about to be saved.
            state.registry.take_changes();
            state.registry.records()
        };

        let Some(user) = self.inner.identity.current() else {
            return Err(SaveOutcome::Skipped(SkipReason::Anonymous));
        };
        if !self.owns(&user) {
            return Err(SaveOutcome::Skipped(SkipReason::NotOwner));
        }

        let text = self.inner.serializer.serialize(&records).map_err(|e| {
            tracing::warn!("serialization failed: {}", e);
            SaveOutcome::Failed(e.to_string())
        })?;
        if text.trim().is_empty() {
            return Err(SaveOutcome::Skipped(SkipReason::Empty));
        }
        Ok(text)
    }

    /// A new store belongs to whoever saves it first.
    fn owns(&self, user: &UserId) -> bool {
        self.inner.store.is_new() || self.inner.store.is_owner(user)
    }

    fn can_edit(&self) -> bool {
        self.inner.store.is_new()
            || self
                .inner
                .identity
                .current()
                .is_some_and(|user| self.inner.store.is_owner(&user))
    }

    fn render_editors(&self) {
        let editable = self.can_edit();
        let mut state = self.lock();
        let NotebookState {
            registry,
            presentation,
            ..
        } = &mut *state;
        registry.each(|cell| presentation.render(cell.key(), editable));
    }

    /// Re-render every editor for the current identity, then request a save.
    pub fn update_user(&self) {
        self.render_editors();
        self.save();
    }

    /// Call [`update_user`](Self::update_user) on every identity change.
    ///
    /// The task ends when the notebook is dropped or the provider goes away.
    pub fn follow_identity(&self) -> JoinHandle<()> {
        let mut rx = self.inner.identity.subscribe();
        let weak = Arc::downgrade(&self.inner);
        tokio::spawn(async move {
            while rx.changed().await.is_ok() {
                let Some(inner) = weak.upgrade() else {
                    break;
                };
                tracing::debug!("identity changed");
                Notebook { inner }.update_user();
            }
        })
    }

    /// Cancel pending saves, release the context and drop every cell.
    pub fn teardown(&self) {
        if self.inner.torn_down.swap(true, Ordering::SeqCst) {
            return;
        }
        self.inner.trigger.cancel();
        self.inner.context.release();
        self.lock().clear();
        tracing::info!("notebook torn down");
    }

    // =========================================================================
    // Editing
    // =========================================================================

    pub fn append_code(&self, content: impl Into<String>, after: Option<CellKey>) -> CellKey {
        self.append(CellVariant::Code, content.into(), after)
    }

    pub fn append_text(&self, content: impl Into<String>, after: Option<CellKey>) -> CellKey {
        self.append(CellVariant::Text, content.into(), after)
    }

    fn append(&self, variant: CellVariant, content: String, after: Option<CellKey>) -> CellKey {
        self.mutate(|state| state.insert_cell(variant, content, after))
    }

    /// Remove a cell; the last remaining cell is replaced by an empty code cell.
    pub fn remove(&self, key: CellKey) {
        self.mutate(|state| state.remove_cell(key));
    }

    /// Bring registry order back in line with the presentation.
    ///
    /// Hosts call this after reordering widgets themselves, e.g. on a drag.
    /// An actual reorder schedules a save.
    pub fn reconcile(&self) {
        self.mutate(NotebookState::sort);
    }

    /// Route a cell event to the cell's handler set.
    pub fn dispatch(&self, key: CellKey, event: &CellEvent) -> Dispatch {
        self.mutate(|state| router::dispatch(state, key, event))
    }

    // =========================================================================
    // Execution
    // =========================================================================

    /// Run every code cell in order.
    pub async fn execute(&self) -> Result<ExecutionSummary> {
        let result = ExecutionPipeline::new(&self.inner.state, self.inner.context.as_ref())
            .run()
            .await;
        self.flush_changes();
        result
    }

    /// Run every code cell in order, reporting progress to `observer`.
    pub async fn execute_with(&self, observer: &dyn ExecutionObserver) -> Result<ExecutionSummary> {
        let result = ExecutionPipeline::new(&self.inner.state, self.inner.context.as_ref())
            .with_observer(observer)
            .run()
            .await;
        self.flush_changes();
        result
    }

    /// Drain changes a run recorded while syncing live widget text.
    fn flush_changes(&self) {
        self.mutate(|_| ());
    }

    /// Run one code cell, then advance focus as its `execute` event does.
    ///
    /// Text cells are not executed and yield `Ok(None)`.
    pub async fn execute_cell(&self, key: CellKey) -> Result<Option<String>> {
        let source = {
            let mut state = self.lock();
            let cell = state.registry.get(key).ok_or(Error::CellNotFound(key))?;
            if !cell.is_code() {
                return Ok(None);
            }
            state.sync_content(key).ok_or(Error::CellNotFound(key))?
        };

        let result = self.inner.context.execute(&source).await;
        self.dispatch(key, &CellEvent::Execute);
        result.map(Some)
    }
}

impl std::fmt::Debug for Notebook {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.lock();
        f.debug_struct("Notebook")
            .field("cells", &state.registry.len())
            .field("is_rendering", &state.is_rendering)
            .field("is_executing", &state.is_executing)
            .field("store", &self.inner.store.id())
            .finish()
    }
}
