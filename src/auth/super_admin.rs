use reqwest::Method;
use serde_json::json;

use super::{unwrap_envelope, LoginResponse};
use crate::client::ClientError;
use crate::console::Console;
use crate::session::SuperAdminSession;
use crate::types::Subsystem;

/// Super-admin controls exposed to pages: elevate, switch modes, log out
pub struct SuperAdminMode<'a> {
    console: &'a Console,
}

impl<'a> SuperAdminMode<'a> {
    pub(crate) fn new(console: &'a Console) -> Self {
        Self { console }
    }

    /// Run on every page load; the cookie decides whether elevation survives
    pub fn mount(&self) -> SuperAdminSession {
        self.console.super_admin().check_super_admin_status()
    }

    pub fn session(&self) -> SuperAdminSession {
        self.console.super_admin().session()
    }

    /// Authenticate as super-admin against the finance backend
    pub async fn elevate(&self, email: &str, password: &str) -> Result<SuperAdminSession, ClientError> {
        let client = self.console.client(Subsystem::Finance)?;
        let body = json!({ "email": email, "password": password });
        let value = client
            .send_public(Method::POST, "super-admin/login", Some(&body))
            .await?;
        let response: LoginResponse = unwrap_envelope(Subsystem::Finance, value)?;

        let account = response
            .user
            .as_ref()
            .map(|user| user.email.as_str())
            .unwrap_or(email);
        self.console.super_admin().set_super_admin(&response.token, account);
        Ok(self.session())
    }

    /// Act as super-admin again with the stored elevated token
    pub fn enter(&self) -> bool {
        self.console.super_admin().toggle_super_admin_mode(true)
    }

    /// Act as the normal admin, keeping the elevated token for later
    pub fn leave(&self) -> bool {
        self.console.super_admin().toggle_super_admin_mode(false)
    }

    /// End the elevated session on the backend (best effort) and locally
    pub async fn logout(&self) {
        let store = self.console.super_admin();
        let token = store.cookie_token().or(store.session().super_admin_token);

        if let Some(token) = token {
            let result = match self.console.client(Subsystem::Finance) {
                Ok(client) => client
                    .send_with_token(Method::POST, "super-admin/logout", &token, None)
                    .await
                    .map(|_| ()),
                Err(e) => Err(e),
            };
            if let Err(e) = result {
                tracing::debug!("Ignoring super-admin logout failure: {}", e);
            }
        }

        store.clear_super_admin();
    }
}
