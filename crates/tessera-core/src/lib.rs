//! Core engine for Tessera notebooks.
//!
//! This crate provides:
//! - Ordered cell registry reconciled with a presentation layer
//! - Per-variant event routing (navigation, reordering, splitting, browsing)
//! - Sequential execution of code cells through a shared context
//! - Debounced, ownership-checked persistence
//! - The `Notebook` orchestrator tying these together

pub mod cell;
pub mod config;
pub mod error;
pub mod execute;
pub mod identity;
pub mod navigation;
pub mod notebook;
pub mod persist;
pub mod presentation;
pub mod registry;
pub mod router;
pub mod state;
pub mod store;

pub use cell::{Cell, CellId, CellKey, CellRecord, CellVariant};
pub use config::{DEFAULT_SAVE_DELAY, NotebookConfig};
pub use error::{Error, Result};
pub use execute::{
    CommandConfig, CommandContext, ExecutionContext, ExecutionObserver, ExecutionPipeline,
    ExecutionSummary, PipelineState,
};
pub use identity::{IdentityProvider, SessionIdentity, UserId};
pub use navigation::{LogNavigator, NavigateOptions, Navigator};
pub use notebook::{Notebook, NotebookBuilder, RenderOutcome, SaveOutcome, SkipReason};
pub use persist::PersistenceTrigger;
pub use presentation::{MemoryPresentation, Presentation, WidgetSnapshot};
pub use registry::{CellRegistry, RegistryChange};
pub use router::{CellEvent, Dispatch, EventKind, HandlerSet};
pub use state::{Caret, NotebookState, SharedState};
pub use store::{PersistedStore, Serializer};
