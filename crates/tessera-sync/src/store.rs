//! Notebook store backed by a local file.
//!
//! Behaves like a gist: the notebook's id is the file stem, every save bumps a
//! revision counter, and a fork writes a copy next to the original.

use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use tessera_core::{PersistedStore, UserId};

use crate::error::{SyncError, SyncResult};

#[derive(Debug, Default)]
struct FileState {
    text: String,
    revision: u64,
    exists: bool,
}

/// [`PersistedStore`] over one file on disk.
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    owner: Option<UserId>,
    state: Mutex<FileState>,
}

impl FileStore {
    /// Store for `path`. A missing file is a new notebook.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let exists = path.is_file();
        Self {
            path,
            owner: None,
            state: Mutex::new(FileState {
                exists,
                ..FileState::default()
            }),
        }
    }

    /// Only `owner` may save. Without an owner, any identity may.
    pub fn with_owner(mut self, owner: UserId) -> Self {
        self.owner = Some(owner);
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Number of successful saves through this store.
    pub fn revision(&self) -> u64 {
        self.lock().revision
    }

    fn lock(&self) -> MutexGuard<'_, FileState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Path of a fork: `<stem>-<8 hex chars>.<ext>` in the same directory.
    fn fork_path(&self) -> PathBuf {
        let suffix = uuid::Uuid::new_v4().simple().to_string();
        let stem = file_stem(&self.path);
        let name = match self.path.extension() {
            Some(ext) => format!("{}-{}.{}", stem, &suffix[..8], ext.to_string_lossy()),
            None => format!("{}-{}", stem, &suffix[..8]),
        };
        self.path.with_file_name(name)
    }
}

fn file_stem(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// Write `text` to `path` through a temporary sibling and a rename.
pub(crate) async fn write_atomic(path: &Path, text: &str) -> SyncResult<()> {
    let mut tmp = path.as_os_str().to_owned();
    tmp.push(".tmp");
    let tmp = PathBuf::from(tmp);

    let write_error = |e: std::io::Error| SyncError::WriteError {
        path: path.to_path_buf(),
        message: e.to_string(),
    };
    tokio::fs::write(&tmp, text).await.map_err(write_error)?;
    tokio::fs::rename(&tmp, path).await.map_err(write_error)?;
    Ok(())
}

#[async_trait]
impl PersistedStore for FileStore {
    fn id(&self) -> Option<String> {
        self.lock().exists.then(|| file_stem(&self.path))
    }

    fn is_new(&self) -> bool {
        !self.lock().exists
    }

    fn is_owner(&self, user: &UserId) -> bool {
        self.owner.as_ref().is_none_or(|owner| owner == user)
    }

    async fn fetch(&self) -> tessera_core::Result<()> {
        let text = tokio::fs::read_to_string(&self.path)
            .await
            .map_err(|e| SyncError::ReadError {
                path: self.path.clone(),
                message: e.to_string(),
            })?;

        let mut state = self.lock();
        state.text = text;
        state.exists = true;
        Ok(())
    }

    async fn save(&self, partial: bool) -> tessera_core::Result<()> {
        let text = self.lock().text.clone();
        write_atomic(&self.path, &text).await?;

        let revision = {
            let mut state = self.lock();
            state.exists = true;
            state.revision += 1;
            state.revision
        };
        tracing::debug!(path = %self.path.display(), revision, partial, "notebook written");
        Ok(())
    }

    fn exchange_representation(&self) -> String {
        self.lock().text.clone()
    }

    fn set_exchange_representation(&self, text: String) {
        self.lock().text = text;
    }

    async fn fork(&self) -> tessera_core::Result<String> {
        if self.is_new() {
            return Err(SyncError::Unsaved.into());
        }
        let text = self.lock().text.clone();
        let target = self.fork_path();
        write_atomic(&target, &text).await?;

        tracing::info!("Forked {} → {}", self.path.display(), target.display());
        Ok(file_stem(&target))
    }
}
