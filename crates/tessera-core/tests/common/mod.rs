//! In-memory collaborators shared by the integration tests.

#![allow(dead_code)]

use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::Notify;

use tessera_core::{
    CellRecord, Error, ExecutionContext, MemoryPresentation, NavigateOptions, Navigator, Notebook,
    NotebookConfig, PersistedStore, Result, Serializer, SessionIdentity, UserId,
};

// =============================================================================
// Store
// =============================================================================

#[derive(Debug, Default)]
struct StoreState {
    id: Option<String>,
    owner: Option<UserId>,
    text: String,
    saves: Vec<String>,
    fetch_fails: bool,
    save_fails: bool,
    fetch_gate: Option<Arc<Notify>>,
}

/// Store keeping its representation in memory and recording every save.
#[derive(Debug, Default)]
pub struct FakeStore {
    state: Mutex<StoreState>,
}

impl FakeStore {
    /// A store that has never been saved.
    pub fn fresh(owner: &str) -> Arc<Self> {
        Arc::new(Self {
            state: Mutex::new(StoreState {
                owner: Some(UserId::new(owner)),
                ..StoreState::default()
            }),
        })
    }

    /// A saved store holding `records`.
    pub fn existing(id: &str, owner: &str, records: &[CellRecord]) -> Arc<Self> {
        Arc::new(Self {
            state: Mutex::new(StoreState {
                id: Some(id.to_string()),
                owner: Some(UserId::new(owner)),
                text: serde_json::to_string(records).unwrap(),
                ..StoreState::default()
            }),
        })
    }

    /// A saved store whose fetch fails.
    pub fn unavailable(id: &str) -> Arc<Self> {
        Arc::new(Self {
            state: Mutex::new(StoreState {
                id: Some(id.to_string()),
                fetch_fails: true,
                ..StoreState::default()
            }),
        })
    }

    /// Hold every fetch until the returned gate is notified.
    pub fn gate_fetch(&self) -> Arc<Notify> {
        let gate = Arc::new(Notify::new());
        self.state.lock().unwrap().fetch_gate = Some(gate.clone());
        gate
    }

    pub fn fail_saves(&self) {
        self.state.lock().unwrap().save_fails = true;
    }

    pub fn saves(&self) -> Vec<String> {
        self.state.lock().unwrap().saves.clone()
    }

    /// Records of the last save.
    pub fn saved_records(&self) -> Vec<CellRecord> {
        self.saves()
            .last()
            .map(|text| serde_json::from_str(text).unwrap())
            .unwrap_or_default()
    }
}

#[async_trait]
impl PersistedStore for FakeStore {
    fn id(&self) -> Option<String> {
        self.state.lock().unwrap().id.clone()
    }

    fn is_new(&self) -> bool {
        self.state.lock().unwrap().id.is_none()
    }

    fn is_owner(&self, user: &UserId) -> bool {
        self.state.lock().unwrap().owner.as_ref() == Some(user)
    }

    async fn fetch(&self) -> Result<()> {
        let gate = self.state.lock().unwrap().fetch_gate.clone();
        if let Some(gate) = gate {
            gate.notified().await;
        }
        if self.state.lock().unwrap().fetch_fails {
            return Err(Error::Load("not found".into()));
        }
        Ok(())
    }

    async fn save(&self, _partial: bool) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        if state.save_fails {
            return Err(Error::Store("quota exceeded".into()));
        }
        let text = state.text.clone();
        state.saves.push(text);
        if state.id.is_none() {
            state.id = Some("nb-1".to_string());
        }
        Ok(())
    }

    fn exchange_representation(&self) -> String {
        self.state.lock().unwrap().text.clone()
    }

    fn set_exchange_representation(&self, text: String) {
        self.state.lock().unwrap().text = text;
    }

    async fn fork(&self) -> Result<String> {
        let state = self.state.lock().unwrap();
        let id = state.id.clone().unwrap_or_else(|| "new".to_string());
        Ok(format!("{id}-fork"))
    }
}

// =============================================================================
// Serializer
// =============================================================================

/// JSON list of the non-blank cells; empty text when there are none.
pub struct JsonSerializer;

impl Serializer for JsonSerializer {
    fn serialize(&self, cells: &[CellRecord]) -> Result<String> {
        let cells: Vec<&CellRecord> = cells
            .iter()
            .filter(|c| !c.content.trim().is_empty())
            .collect();
        if cells.is_empty() {
            return Ok(String::new());
        }
        serde_json::to_string(&cells).map_err(|e| Error::Serialization(e.to_string()))
    }

    fn deserialize(&self, text: &str) -> Result<Vec<CellRecord>> {
        if text.trim().is_empty() {
            return Ok(Vec::new());
        }
        serde_json::from_str(text).map_err(|e| Error::Deserialization(e.to_string()))
    }
}

// =============================================================================
// Navigator and context
// =============================================================================

#[derive(Debug, Default)]
pub struct RecordingNavigator {
    pub visits: Mutex<Vec<(String, bool)>>,
}

impl RecordingNavigator {
    pub fn visits(&self) -> Vec<(String, bool)> {
        self.visits.lock().unwrap().clone()
    }
}

impl Navigator for RecordingNavigator {
    fn navigate(&self, path: &str, options: NavigateOptions) {
        self.visits
            .lock()
            .unwrap()
            .push((path.to_string(), options.trigger));
    }
}

/// Context recording every source it is asked to run.
///
/// Sources containing "fail" fail; each call takes `delay` of (virtual) time.
#[derive(Debug, Default)]
pub struct RecordingContext {
    pub calls: Mutex<Vec<String>>,
    pub delay: Duration,
    pub released: Mutex<bool>,
}

impl RecordingContext {
    pub fn with_delay(delay: Duration) -> Self {
        Self {
            delay,
            ..Self::default()
        }
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn is_released(&self) -> bool {
        *self.released.lock().unwrap()
    }
}

#[async_trait]
impl ExecutionContext for RecordingContext {
    async fn execute(&self, source: &str) -> Result<String> {
        self.calls.lock().unwrap().push(source.to_string());
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        if source.contains("fail") {
            return Err(Error::Execution(format!("{source} failed")));
        }
        Ok(format!("out:{source}"))
    }

    fn release(&self) {
        *self.released.lock().unwrap() = true;
    }
}

// =============================================================================
// Harness
// =============================================================================

pub struct Harness {
    pub notebook: Notebook,
    pub store: Arc<FakeStore>,
    pub presentation: MemoryPresentation,
    pub navigator: Arc<RecordingNavigator>,
    pub context: Arc<RecordingContext>,
    pub identity: Arc<SessionIdentity>,
}

pub fn harness(store: Arc<FakeStore>, user: Option<&str>) -> Harness {
    harness_with(store, user, RecordingContext::default())
}

pub fn harness_with(store: Arc<FakeStore>, user: Option<&str>, context: RecordingContext) -> Harness {
    let presentation = MemoryPresentation::new();
    let navigator = Arc::new(RecordingNavigator::default());
    let context = Arc::new(context);
    let identity = Arc::new(SessionIdentity::new(user.map(UserId::new)));

    let notebook = Notebook::builder(store.clone(), Arc::new(JsonSerializer))
        .context(context.clone())
        .presentation(presentation.clone())
        .identity(identity.clone())
        .navigator(navigator.clone())
        .config(NotebookConfig::default().with_notebook_route("/notebooks"))
        .build();

    Harness {
        notebook,
        store,
        presentation,
        navigator,
        context,
        identity,
    }
}

/// A rendered notebook holding `records`, owned and edited by "ada".
pub async fn loaded(records: &[CellRecord]) -> Harness {
    let h = harness(FakeStore::existing("nb-7", "ada", records), Some("ada"));
    h.notebook.render().await;
    h
}
