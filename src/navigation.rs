use std::sync::Mutex;

/// Full-page navigations the session core can force
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Navigation {
    /// Leave the console for an external URL (the portal)
    External(String),
    /// Hard reload into an in-app route
    Internal(String),
}

impl Navigation {
    pub fn target(&self) -> &str {
        match self {
            Navigation::External(url) => url,
            Navigation::Internal(path) => path,
        }
    }
}

pub trait Navigator: Send + Sync {
    fn navigate(&self, to: Navigation);
}

/// Keeps every navigation instead of performing it
#[derive(Debug, Default)]
pub struct RecordingNavigator {
    history: Mutex<Vec<Navigation>>,
}

impl RecordingNavigator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn history(&self) -> Vec<Navigation> {
        self.history.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    pub fn last(&self) -> Option<Navigation> {
        self.history().pop()
    }
}

impl Navigator for RecordingNavigator {
    fn navigate(&self, to: Navigation) {
        tracing::debug!("Navigation requested: {:?}", to);
        self.history.lock().unwrap_or_else(|e| e.into_inner()).push(to);
    }
}
