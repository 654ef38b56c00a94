//! Debounced save trigger.
//!
//! Registry changes arrive in bursts (typing, a drag that reorders several
//! cells). The trigger coalesces them: every [`touch`](PersistenceTrigger::touch)
//! pushes the deadline back, and only the last one fires. A save that has
//! started firing is never aborted by a later touch.

use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use tokio::runtime::Handle;
use tokio::task::JoinHandle;

#[derive(Debug, Default)]
struct Pending {
    generation: u64,
    task: Option<JoinHandle<()>>,
}

/// Coalescing timer with reset and cancel.
#[derive(Debug)]
pub struct PersistenceTrigger {
    delay: Duration,
    pending: Arc<Mutex<Pending>>,
}

fn lock(pending: &Mutex<Pending>) -> MutexGuard<'_, Pending> {
    pending.lock().unwrap_or_else(PoisonError::into_inner)
}

impl PersistenceTrigger {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            pending: Arc::new(Mutex::new(Pending::default())),
        }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// (Re)start the timer; `fire` runs when it expires without another touch.
    ///
    /// Outside a tokio runtime the request is dropped.
    pub fn touch<F>(&self, fire: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let Ok(runtime) = Handle::try_current() else {
            tracing::warn!("save requested outside a runtime; ignored");
            return;
        };

        let mut pending = lock(&self.pending);
        if let Some(task) = pending.task.take() {
            task.abort();
        }
        pending.generation += 1;

        let generation = pending.generation;
        let slot = Arc::clone(&self.pending);
        let delay = self.delay;

        pending.task = Some(runtime.spawn(async move {
            tokio::time::sleep(delay).await;
            {
                let mut pending = lock(&slot);
                if pending.generation != generation {
                    return;
                }
                // From here on a touch schedules a new timer instead of
                // aborting this save.
                pending.task = None;
            }
            fire.await;
        }));
    }

    /// Drop any pending (not yet firing) save.
    pub fn cancel(&self) {
        let mut pending = lock(&self.pending);
        pending.generation += 1;
        if let Some(task) = pending.task.take() {
            task.abort();
        }
    }

    /// Whether a save is waiting for its deadline.
    pub fn is_pending(&self) -> bool {
        lock(&self.pending).task.is_some()
    }
}

impl Drop for PersistenceTrigger {
    fn drop(&mut self) {
        self.cancel();
    }
}
