//! Login flows against the subsystem backends.
//!
//! Each backend issues its own token from `POST {base}/login`. The console
//! logs into all four at once and only keeps the result when every backend
//! accepted the credentials.

mod super_admin;

pub use super_admin::SuperAdminMode;

use futures::future::join_all;
use reqwest::Method;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::client::ClientError;
use crate::console::Console;
use crate::session::TokenSet;
use crate::types::{Subsystem, UserProfile};

#[derive(Debug, Clone, Serialize)]
pub struct LoginCredentials {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoginResponse {
    #[serde(alias = "access_token")]
    pub token: String,
    #[serde(default)]
    pub user: Option<UserProfile>,
}

/// Backends answer either bare or wrapped in `{"data": ...}`
#[derive(Deserialize)]
#[serde(untagged)]
enum Envelope<T> {
    Wrapped { data: T },
    Bare(T),
}

pub(crate) fn unwrap_envelope<T: DeserializeOwned>(subsystem: Subsystem, value: Value) -> Result<T, ClientError> {
    match serde_json::from_value::<Envelope<T>>(value.clone()) {
        Ok(Envelope::Wrapped { data }) | Ok(Envelope::Bare(data)) => Ok(data),
        Err(_) => serde_json::from_value::<T>(value).map_err(|source| ClientError::Decode { subsystem, source }),
    }
}

pub struct AuthFlow<'a> {
    console: &'a Console,
}

impl<'a> AuthFlow<'a> {
    pub(crate) fn new(console: &'a Console) -> Self {
        Self { console }
    }

    /// Log into every subsystem; tokens are stored only if all four succeed
    pub async fn login_all(&self, email: &str, password: &str) -> Result<Option<UserProfile>, ClientError> {
        let credentials = LoginCredentials {
            email: email.to_string(),
            password: password.to_string(),
        };

        let (student_affairs, finance, library, academic) = futures::try_join!(
            self.request_token(Subsystem::StudentAffairs, &credentials),
            self.request_token(Subsystem::Finance, &credentials),
            self.request_token(Subsystem::Library, &credentials),
            self.request_token(Subsystem::Academic, &credentials)
        )?;

        let store = self.console.credentials();
        store.set_tokens(TokenSet {
            student_affairs: Some(student_affairs.token),
            finance: Some(finance.token),
            library: Some(library.token),
            academic: Some(academic.token),
        });
        if let Some(user) = student_affairs.user.clone() {
            store.set_user(user);
        }

        tracing::info!("Logged into all subsystems as {}", email);
        Ok(student_affairs.user)
    }

    /// Log into a single subsystem, leaving the other tokens alone
    pub async fn login(&self, subsystem: Subsystem, email: &str, password: &str) -> Result<LoginResponse, ClientError> {
        let credentials = LoginCredentials {
            email: email.to_string(),
            password: password.to_string(),
        };
        let response = self.request_token(subsystem, &credentials).await?;

        let store = self.console.credentials();
        store.set_token(subsystem, response.token.clone());
        if subsystem == Subsystem::PRIMARY {
            if let Some(user) = response.user.clone() {
                store.set_user(user);
            }
        }

        tracing::info!("Logged into {} as {}", subsystem, email);
        Ok(response)
    }

    /// Refresh the cached profile from the primary backend
    pub async fn fetch_profile(&self) -> Result<UserProfile, ClientError> {
        let client = self.console.client(Subsystem::PRIMARY)?;
        let value = client.send(Method::GET, "user", None).await?;
        let user: UserProfile = unwrap_envelope(Subsystem::PRIMARY, value)?;

        self.console.credentials().set_user(user.clone());
        Ok(user)
    }

    /// End elevation, then best-effort logout on every backend with its own
    /// normal token, then wipe the session.
    ///
    /// Logout calls bypass the credential provider, so a rejection here never
    /// triggers 401 handling or navigation.
    pub async fn logout(&self) {
        self.console.super_admin_mode().logout().await;

        let store = self.console.credentials();
        let pending = Subsystem::ALL.into_iter().filter_map(|subsystem| {
            let token = store.get_token(subsystem)?;
            Some(async move {
                let result = match self.console.client(subsystem) {
                    Ok(client) => client
                        .send_with_token(Method::POST, "logout", &token, None)
                        .await
                        .map(|_| ()),
                    Err(e) => Err(e),
                };
                if let Err(e) = result {
                    tracing::debug!("Ignoring logout failure on {}: {}", subsystem, e);
                }
            })
        });
        join_all(pending).await;

        store.clear_tokens();
        tracing::info!("Logged out");
    }

    async fn request_token(&self, subsystem: Subsystem, credentials: &LoginCredentials) -> Result<LoginResponse, ClientError> {
        let client = self.console.client(subsystem)?;
        let body = serde_json::to_value(credentials).map_err(|source| ClientError::Decode { subsystem, source })?;
        let value = client.send_public(Method::POST, "login", Some(&body)).await?;
        unwrap_envelope(subsystem, value)
    }
}
