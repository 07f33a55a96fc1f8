use std::sync::Arc;

use crate::auth::{AuthFlow, SuperAdminMode};
use crate::client::{ApiClient, ClientError, ClientFactory};
use crate::config::AppConfig;
use crate::navigation::Navigator;
use crate::protect::ProtectionGate;
use crate::session::{
    CookieSettings, CookieStore, CredentialStore, SessionProvider, Storage, SuperAdminStore,
};
use crate::types::Subsystem;

/// Explicit session container shared by pages, clients and gates.
///
/// Built once per process from injected storage, cookie jar and navigator;
/// nothing in the session core reaches for a global.
#[derive(Clone)]
pub struct Console {
    config: Arc<AppConfig>,
    credentials: Arc<CredentialStore>,
    super_admin: Arc<SuperAdminStore>,
    navigator: Arc<dyn Navigator>,
    clients: ClientFactory,
}

impl Console {
    pub fn open(
        config: Arc<AppConfig>,
        storage: Arc<dyn Storage>,
        cookies: Arc<dyn CookieStore>,
        navigator: Arc<dyn Navigator>,
    ) -> Self {
        let credentials = Arc::new(CredentialStore::open(storage.clone()));
        let super_admin = Arc::new(SuperAdminStore::open(
            storage,
            cookies,
            CookieSettings::from(&config.session),
        ));
        let provider = Arc::new(SessionProvider::new(credentials.clone(), super_admin.clone()));
        let clients = ClientFactory::new(config.clone(), provider, navigator.clone());

        Self {
            config,
            credentials,
            super_admin,
            navigator,
            clients,
        }
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn credentials(&self) -> &Arc<CredentialStore> {
        &self.credentials
    }

    pub fn super_admin(&self) -> &Arc<SuperAdminStore> {
        &self.super_admin
    }

    pub fn navigator(&self) -> &Arc<dyn Navigator> {
        &self.navigator
    }

    pub fn client(&self, subsystem: Subsystem) -> Result<ApiClient, ClientError> {
        self.clients.client(subsystem)
    }

    pub fn auth(&self) -> AuthFlow<'_> {
        AuthFlow::new(self)
    }

    pub fn super_admin_mode(&self) -> SuperAdminMode<'_> {
        SuperAdminMode::new(self)
    }

    pub fn protection(&self) -> ProtectionGate {
        ProtectionGate::new(
            self.credentials.clone(),
            self.navigator.clone(),
            &self.config.routes.portal_url,
        )
    }
}
