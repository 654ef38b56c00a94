//! Active user identity.

use serde::{Deserialize, Serialize};
use tokio::sync::watch;

/// Identifier of an authenticated user.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UserId(String);

impl UserId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for UserId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Source of the active identity and of change notifications.
pub trait IdentityProvider: Send + Sync {
    /// The authenticated user, if any.
    fn current(&self) -> Option<UserId>;

    /// Receiver notified whenever the active identity changes.
    fn subscribe(&self) -> watch::Receiver<Option<UserId>>;
}

/// Identity held in process, backed by a watch channel.
#[derive(Debug)]
pub struct SessionIdentity {
    tx: watch::Sender<Option<UserId>>,
}

impl SessionIdentity {
    pub fn new(user: Option<UserId>) -> Self {
        let (tx, _rx) = watch::channel(user);
        Self { tx }
    }

    pub fn anonymous() -> Self {
        Self::new(None)
    }

    /// Sign in as `user`, or sign out with `None`. Subscribers are notified.
    pub fn set(&self, user: Option<UserId>) {
        self.tx.send_replace(user);
    }
}

impl IdentityProvider for SessionIdentity {
    fn current(&self) -> Option<UserId> {
        self.tx.borrow().clone()
    }

    fn subscribe(&self) -> watch::Receiver<Option<UserId>> {
        self.tx.subscribe()
    }
}
