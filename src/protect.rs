//! Page-level protection.
//!
//! The edge guard only covers a few fixed paths, so every protected page
//! re-checks the primary token itself and leaves for the external portal
//! as soon as it is missing.

use std::sync::Arc;

use crate::navigation::{Navigation, Navigator};
use crate::session::CredentialStore;
use crate::types::Subsystem;

pub struct ProtectionGate {
    credentials: Arc<CredentialStore>,
    navigator: Arc<dyn Navigator>,
    portal_url: String,
}

impl ProtectionGate {
    pub fn new(credentials: Arc<CredentialStore>, navigator: Arc<dyn Navigator>, portal_url: &str) -> Self {
        Self {
            credentials,
            navigator,
            portal_url: portal_url.to_string(),
        }
    }

    /// True when the page may render; otherwise navigates to the portal
    pub fn check(&self) -> bool {
        if self.credentials.get_token(Subsystem::PRIMARY).is_some() {
            return true;
        }
        self.redirect();
        false
    }

    /// Render `content` only while the primary session exists
    pub fn render<T>(&self, content: impl FnOnce() -> T) -> Option<T> {
        if self.check() {
            Some(content())
        } else {
            None
        }
    }

    /// Re-check whenever the primary token changes, until the page is sent away.
    /// Resolves once a redirect happened or the store is gone.
    pub async fn watch(self) {
        let mut changes = self.credentials.subscribe();
        let mut current = changes.borrow_and_update().student_affairs_token.clone();
        if current.is_none() {
            self.redirect();
            return;
        }

        while changes.changed().await.is_ok() {
            let next = changes.borrow_and_update().student_affairs_token.clone();
            if next == current {
                continue;
            }
            current = next;
            if current.is_none() {
                self.redirect();
                return;
            }
        }
    }

    fn redirect(&self) {
        tracing::info!("Primary session missing, leaving for {}", self.portal_url);
        self.navigator.navigate(Navigation::External(self.portal_url.clone()));
    }
}
