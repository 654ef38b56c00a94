//! Persisted store and serializer seams.
//!
//! The store is a gist-like, versioned location holding one notebook's
//! exchange representation: opaque text as far as the core is concerned.
//! The serializer owns the text layout.

use async_trait::async_trait;

use crate::cell::CellRecord;
use crate::error::Result;
use crate::identity::UserId;

/// External versioned storage for one notebook.
#[async_trait]
pub trait PersistedStore: Send + Sync {
    /// Identifier used to build the notebook's route. `None` until first saved.
    fn id(&self) -> Option<String>;

    /// True until the notebook has been saved once.
    fn is_new(&self) -> bool;

    /// Whether `user` may save over this notebook.
    fn is_owner(&self, user: &UserId) -> bool;

    /// Load the persisted representation into the store.
    async fn fetch(&self) -> Result<()>;

    /// Persist the current exchange representation.
    async fn save(&self, partial: bool) -> Result<()>;

    fn exchange_representation(&self) -> String;

    fn set_exchange_representation(&self, text: String);

    /// Copy this notebook to a new location, returning the copy's id.
    async fn fork(&self) -> Result<String>;
}

/// Conversion between ordered cell records and the exchange text.
pub trait Serializer: Send + Sync {
    fn serialize(&self, cells: &[CellRecord]) -> Result<String>;

    fn deserialize(&self, text: &str) -> Result<Vec<CellRecord>>;
}
