//! Notebook configuration.

use std::time::Duration;

/// Default debounce delay between the last registry change and the save.
pub const DEFAULT_SAVE_DELAY: Duration = Duration::from_millis(500);

/// Settings for one notebook orchestrator.
#[derive(Debug, Clone)]
pub struct NotebookConfig {
    /// Debounce delay for saves.
    pub save_delay: Duration,
    /// Route to navigate to when a notebook cannot be loaded.
    pub home_route: String,
    /// Prefix of notebook routes; a notebook lives at `<prefix>/<id>`.
    pub notebook_route: String,
}

impl Default for NotebookConfig {
    fn default() -> Self {
        Self {
            save_delay: DEFAULT_SAVE_DELAY,
            home_route: "/".to_string(),
            notebook_route: "/notebooks".to_string(),
        }
    }
}

impl NotebookConfig {
    pub fn with_save_delay(mut self, delay: Duration) -> Self {
        self.save_delay = delay;
        self
    }

    pub fn with_home_route(mut self, route: impl Into<String>) -> Self {
        self.home_route = route.into();
        self
    }

    pub fn with_notebook_route(mut self, prefix: impl Into<String>) -> Self {
        self.notebook_route = prefix.into();
        self
    }

    /// Route of the notebook stored under `id`.
    pub fn route_for(&self, id: &str) -> String {
        format!("{}/{}", self.notebook_route.trim_end_matches('/'), id)
    }
}
