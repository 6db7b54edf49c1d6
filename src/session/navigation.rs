use std::sync::Mutex;

/// Where the session layer sends the user after a transition.
pub trait Navigator: Send + Sync {
    fn navigate(&self, path: &str);
}

/// Records every navigation; the last entry is the current view.
#[derive(Debug, Default)]
pub struct NavigationHistory {
    visited: Mutex<Vec<String>>,
}

impl NavigationHistory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current(&self) -> Option<String> {
        self.visited
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .last()
            .cloned()
    }

    pub fn visited(&self) -> Vec<String> {
        self.visited
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }
}

impl Navigator for NavigationHistory {
    fn navigate(&self, path: &str) {
        tracing::debug!(to = path, "navigate");
        self.visited
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(path.to_string());
    }
}
