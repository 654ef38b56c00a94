//! Route changes requested by the orchestrator.

/// Options for a navigation request.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NavigateOptions {
    /// Whether the target route should be (re)loaded, or only recorded.
    pub trigger: bool,
}

/// External router.
///
/// Invoked when a notebook cannot be loaded, after the first save of a new
/// notebook, and after a fork.
pub trait Navigator: Send + Sync {
    fn navigate(&self, path: &str, options: NavigateOptions);
}

/// Navigator for hosts without routing: requests are only logged.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogNavigator;

impl Navigator for LogNavigator {
    fn navigate(&self, path: &str, options: NavigateOptions) {
        tracing::info!(path, trigger = options.trigger, "navigation requested");
    }
}
