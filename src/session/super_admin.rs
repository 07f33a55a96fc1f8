use std::sync::{Arc, RwLock};

use serde::{Deserialize, Serialize};
use tokio::sync::watch;

use super::cookies::{self, CookieStore};
use super::storage::{self, Storage};
use crate::config::SessionConfig;

pub const SUPER_ADMIN_NAMESPACE: &str = "super-admin-storage";

/// Elevated finance session layered on top of the normal finance token
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SuperAdminSession {
    pub is_super_admin: bool,
    pub super_admin_token: Option<String>,
    pub super_admin_email: Option<String>,
}

#[derive(Debug, Clone)]
pub struct CookieSettings {
    pub name: String,
    pub days: i64,
    pub secure: bool,
}

impl From<&SessionConfig> for CookieSettings {
    fn from(config: &SessionConfig) -> Self {
        Self {
            name: config.super_admin_cookie.clone(),
            days: config.super_admin_cookie_days,
            secure: config.secure_cookies,
        }
    }
}

/// Persisted elevation record mirrored into a cookie.
///
/// The cookie decides whether an elevated credential exists at all; the
/// persisted token and email are a cache that `check_super_admin_status`
/// brings back in line with it.
pub struct SuperAdminStore {
    state: RwLock<SuperAdminSession>,
    storage: Arc<dyn Storage>,
    cookies: Arc<dyn CookieStore>,
    settings: CookieSettings,
    changes: watch::Sender<SuperAdminSession>,
}

impl SuperAdminStore {
    pub fn open(storage: Arc<dyn Storage>, cookies: Arc<dyn CookieStore>, settings: CookieSettings) -> Self {
        let state: SuperAdminSession = storage::rehydrate(storage.as_ref(), SUPER_ADMIN_NAMESPACE);
        let (changes, _) = watch::channel(state.clone());

        Self {
            state: RwLock::new(state),
            storage,
            cookies,
            settings,
            changes,
        }
    }

    pub fn session(&self) -> SuperAdminSession {
        self.state.read().unwrap_or_else(|e| e.into_inner()).clone()
    }

    /// Elevation changes, including the forced end after a rejected elevated token
    pub fn subscribe(&self) -> watch::Receiver<SuperAdminSession> {
        self.changes.subscribe()
    }

    pub fn is_super_admin(&self) -> bool {
        self.session().is_super_admin
    }

    pub fn cookie_token(&self) -> Option<String> {
        self.cookies.get(&self.settings.name)
    }

    /// Token to act with while elevated; `None` when not acting as super-admin
    pub fn elevated_token(&self) -> Option<String> {
        let session = self.session();
        if !session.is_super_admin {
            return None;
        }
        self.cookie_token().or(session.super_admin_token)
    }

    pub fn set_super_admin(&self, token: &str, email: &str) {
        self.cookies.set(cookies::session_cookie(
            &self.settings.name,
            token,
            self.settings.days,
            self.settings.secure,
        ));
        self.mutate(|session| {
            session.is_super_admin = true;
            session.super_admin_token = Some(token.to_string());
            session.super_admin_email = Some(email.to_string());
        });
        tracing::info!("Super-admin mode enabled for {}", email);
    }

    /// Remove the cookie and the persisted record; the flag ends up false
    pub fn clear_super_admin(&self) {
        self.cookies.remove(&self.settings.name);
        {
            let mut state = self.state.write().unwrap_or_else(|e| e.into_inner());
            *state = SuperAdminSession::default();
            storage::forget(self.storage.as_ref(), SUPER_ADMIN_NAMESPACE);
            self.changes.send_replace(state.clone());
        }
        tracing::info!("Super-admin session cleared");
    }

    /// Switch between acting as super-admin and as the normal admin.
    /// No-op without an elevated token, persisted or in the cookie.
    pub fn toggle_super_admin_mode(&self, next: bool) -> bool {
        let has_token = self.session().super_admin_token.is_some() || self.cookie_token().is_some();
        if !has_token {
            tracing::debug!("Ignoring super-admin toggle: no elevated token");
            return false;
        }

        self.mutate(|session| session.is_super_admin = next);
        tracing::info!("Super-admin mode {}", if next { "on" } else { "off" });
        true
    }

    /// Reconcile the persisted record with the cookie
    pub fn check_super_admin_status(&self) -> SuperAdminSession {
        match self.cookie_token() {
            None => {
                let stale = self.session() != SuperAdminSession::default();
                self.mutate(|session| *session = SuperAdminSession::default());
                if stale {
                    tracing::info!("Elevated cookie gone, dropping stale super-admin state");
                }
            }
            Some(token) => {
                self.mutate(|session| session.super_admin_token = Some(token));
            }
        }
        self.session()
    }

    fn mutate(&self, apply: impl FnOnce(&mut SuperAdminSession)) {
        let mut state = self.state.write().unwrap_or_else(|e| e.into_inner());
        apply(&mut state);
        storage::persist(self.storage.as_ref(), SUPER_ADMIN_NAMESPACE, &*state);
        self.changes.send_replace(state.clone());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::cookies::{session_cookie, MemoryCookieStore};
    use crate::session::storage::MemoryStorage;

    fn settings() -> CookieSettings {
        CookieSettings {
            name: "super_admin_token".into(),
            days: 7,
            secure: false,
        }
    }

    fn fresh_store() -> (SuperAdminStore, Arc<MemoryStorage>, Arc<MemoryCookieStore>) {
        let storage = Arc::new(MemoryStorage::new());
        let cookies = Arc::new(MemoryCookieStore::new());
        let store = SuperAdminStore::open(storage.clone(), cookies.clone(), settings());
        (store, storage, cookies)
    }

    #[test]
    fn test_set_writes_cookie_and_record() {
        let (store, storage, cookies) = fresh_store();
        store.set_super_admin("elev-tok", "a@b.com");

        assert!(store.is_super_admin());
        assert_eq!(cookies.get("super_admin_token").as_deref(), Some("elev-tok"));
        assert!(storage.contains(SUPER_ADMIN_NAMESPACE));
        assert_eq!(store.elevated_token().as_deref(), Some("elev-tok"));
    }

    #[test]
    fn test_clear_removes_everything() {
        let (store, storage, cookies) = fresh_store();
        store.set_super_admin("elev-tok", "a@b.com");
        store.clear_super_admin();

        assert_eq!(store.session(), SuperAdminSession::default());
        assert!(cookies.get("super_admin_token").is_none());
        assert!(!storage.contains(SUPER_ADMIN_NAMESPACE));
    }

    #[test]
    fn test_clear_after_set_leaves_nothing_on_reload() {
        let (store, storage, cookies) = fresh_store();
        store.set_super_admin("elev-tok", "a@b.com");
        store.clear_super_admin();

        let reopened = SuperAdminStore::open(storage, cookies, settings());
        assert_eq!(reopened.session(), SuperAdminSession::default());
    }

    #[test]
    fn test_subscribers_see_elevation_end() {
        let (store, _, _) = fresh_store();
        let mut rx = store.subscribe();

        store.set_super_admin("elev-tok", "a@b.com");
        assert!(rx.has_changed().unwrap());
        assert!(rx.borrow_and_update().is_super_admin);

        store.clear_super_admin();
        assert!(rx.has_changed().unwrap());
        assert_eq!(*rx.borrow_and_update(), SuperAdminSession::default());
    }

    #[test]
    fn test_toggle_without_token_is_noop() {
        let (store, _, _) = fresh_store();
        assert!(!store.toggle_super_admin_mode(true));
        assert!(!store.is_super_admin());
    }

    #[test]
    fn test_toggle_keeps_token() {
        let (store, _, _) = fresh_store();
        store.set_super_admin("elev-tok", "a@b.com");

        assert!(store.toggle_super_admin_mode(false));
        assert!(!store.is_super_admin());
        assert!(store.elevated_token().is_none());
        assert_eq!(store.session().super_admin_token.as_deref(), Some("elev-tok"));

        assert!(store.toggle_super_admin_mode(true));
        assert_eq!(store.elevated_token().as_deref(), Some("elev-tok"));
    }

    #[test]
    fn test_toggle_accepts_cookie_only_token() {
        let (store, _, cookies) = fresh_store();
        cookies.set(session_cookie("super_admin_token", "from-cookie", 1, false));

        assert!(store.toggle_super_admin_mode(true));
        assert_eq!(store.elevated_token().as_deref(), Some("from-cookie"));
    }

    #[test]
    fn test_check_without_cookie_drops_stale_record() {
        let storage = Arc::new(MemoryStorage::new());
        crate::session::storage::persist(
            storage.as_ref(),
            SUPER_ADMIN_NAMESPACE,
            &SuperAdminSession {
                is_super_admin: true,
                super_admin_token: Some("stale".into()),
                super_admin_email: Some("a@b.com".into()),
            },
        );
        let store = SuperAdminStore::open(storage, Arc::new(MemoryCookieStore::new()), settings());
        assert!(store.is_super_admin());

        let session = store.check_super_admin_status();
        assert!(!session.is_super_admin);
        assert!(session.super_admin_token.is_none());
        assert!(session.super_admin_email.is_none());
    }

    #[test]
    fn test_check_with_cookie_refreshes_token_only() {
        let (store, _, cookies) = fresh_store();
        store.set_super_admin("elev-tok", "a@b.com");
        store.toggle_super_admin_mode(false);
        cookies.set(session_cookie("super_admin_token", "rotated", 1, false));

        let session = store.check_super_admin_status();
        assert!(!session.is_super_admin);
        assert_eq!(session.super_admin_token.as_deref(), Some("rotated"));
        assert_eq!(session.super_admin_email.as_deref(), Some("a@b.com"));
    }

    #[test]
    fn test_check_is_idempotent() {
        let (store, _, cookies) = fresh_store();
        store.set_super_admin("elev-tok", "a@b.com");
        let first = store.check_super_admin_status();
        let second = store.check_super_admin_status();
        assert_eq!(first, second);

        cookies.remove("super_admin_token");
        let first = store.check_super_admin_status();
        let second = store.check_super_admin_status();
        assert_eq!(first, second);
        assert_eq!(second, SuperAdminSession::default());
    }

    #[test]
    fn test_token_present_iff_cookie_present() {
        let (store, _, cookies) = fresh_store();
        store.set_super_admin("elev-tok", "a@b.com");
        assert_eq!(
            store.check_super_admin_status().super_admin_token.is_some(),
            cookies.get("super_admin_token").is_some()
        );

        cookies.remove("super_admin_token");
        assert_eq!(
            store.check_super_admin_status().super_admin_token.is_some(),
            cookies.get("super_admin_token").is_some()
        );
    }
}
