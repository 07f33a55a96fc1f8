use std::sync::{Arc, RwLock};

use serde::{Deserialize, Serialize};
use tokio::sync::watch;

use super::storage::{self, Storage};
use crate::types::{Subsystem, UserProfile};

pub const AUTH_NAMESPACE: &str = "auth-storage";

/// Bearer tokens for every subsystem plus the cached profile
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CredentialSet {
    pub student_affairs_token: Option<String>,
    pub finance_token: Option<String>,
    pub library_token: Option<String>,
    pub academic_token: Option<String>,
    pub user: Option<UserProfile>,
}

/// Tokens issued by a bulk login, applied in one step
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TokenSet {
    pub student_affairs: Option<String>,
    pub finance: Option<String>,
    pub library: Option<String>,
    pub academic: Option<String>,
}

impl CredentialSet {
    pub fn token(&self, subsystem: Subsystem) -> Option<&str> {
        match subsystem {
            Subsystem::StudentAffairs => self.student_affairs_token.as_deref(),
            Subsystem::Finance => self.finance_token.as_deref(),
            Subsystem::Library => self.library_token.as_deref(),
            Subsystem::Academic => self.academic_token.as_deref(),
        }
    }

    fn slot(&mut self, subsystem: Subsystem) -> &mut Option<String> {
        match subsystem {
            Subsystem::StudentAffairs => &mut self.student_affairs_token,
            Subsystem::Finance => &mut self.finance_token,
            Subsystem::Library => &mut self.library_token,
            Subsystem::Academic => &mut self.academic_token,
        }
    }
}

/// Persisted holder of the four subsystem tokens.
///
/// Every mutation is written through to storage under [`AUTH_NAMESPACE`] and
/// broadcast to subscribers, so protection gates can react to a token going away.
pub struct CredentialStore {
    state: RwLock<CredentialSet>,
    storage: Arc<dyn Storage>,
    changes: watch::Sender<CredentialSet>,
}

impl CredentialStore {
    /// Open the store, rehydrating whatever was last persisted
    pub fn open(storage: Arc<dyn Storage>) -> Self {
        let state: CredentialSet = storage::rehydrate(storage.as_ref(), AUTH_NAMESPACE);
        let (changes, _) = watch::channel(state.clone());

        Self {
            state: RwLock::new(state),
            storage,
            changes,
        }
    }

    pub fn get_token(&self, subsystem: Subsystem) -> Option<String> {
        self.read().token(subsystem).map(str::to_string)
    }

    pub fn user(&self) -> Option<UserProfile> {
        self.read().user.clone()
    }

    pub fn snapshot(&self) -> CredentialSet {
        self.read().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<CredentialSet> {
        self.changes.subscribe()
    }

    /// Replace all four token fields at once
    pub fn set_tokens(&self, tokens: TokenSet) {
        self.mutate(|set| {
            set.student_affairs_token = tokens.student_affairs;
            set.finance_token = tokens.finance;
            set.library_token = tokens.library;
            set.academic_token = tokens.academic;
        });
        tracing::info!("Stored tokens for all subsystems");
    }

    pub fn set_token(&self, subsystem: Subsystem, token: impl Into<String>) {
        let token = token.into();
        self.mutate(|set| *set.slot(subsystem) = Some(token));
        tracing::debug!("Stored token for {}", subsystem);
    }

    /// Drop one subsystem's token, leaving the others untouched
    pub fn clear_token(&self, subsystem: Subsystem) {
        self.mutate(|set| *set.slot(subsystem) = None);
        tracing::debug!("Cleared token for {}", subsystem);
    }

    pub fn set_user(&self, user: UserProfile) {
        self.mutate(|set| set.user = Some(user));
    }

    /// Null every token and the cached profile
    pub fn clear_tokens(&self) {
        self.mutate(|set| *set = CredentialSet::default());
        tracing::info!("Cleared all subsystem tokens");
    }

    /// Apply, persist and broadcast under one write guard; storage sees mutations in memory order
    fn mutate(&self, apply: impl FnOnce(&mut CredentialSet)) {
        let mut state = self.state.write().unwrap_or_else(|e| e.into_inner());
        apply(&mut state);
        storage::persist(self.storage.as_ref(), AUTH_NAMESPACE, &*state);
        self.changes.send_replace(state.clone());
    }

    fn read(&self) -> std::sync::RwLockReadGuard<'_, CredentialSet> {
        self.state.read().unwrap_or_else(|e| e.into_inner())
    }
}
