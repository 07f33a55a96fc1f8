//! Per-subsystem request clients.
//!
//! All four backends share one protocol: resolve a bearer token right before
//! sending, and on a 401 forget whichever credential was rejected. Only the
//! base URL and the 401 strategy differ, so a single factory builds them.

pub mod error;

use std::sync::Arc;
use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderValue, ACCEPT};
use reqwest::{Method, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use url::Url;

pub use error::ClientError;

use crate::config::AppConfig;
use crate::navigation::{Navigation, Navigator};
use crate::session::{CredentialProvider, CredentialScope, ResolvedCredential};
use crate::types::Subsystem;

/// What a 401 does to the session
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UnauthorizedStrategy {
    /// Drop the subsystem's own token; the caller still gets the error
    ClearSubsystem(Subsystem),
    /// Drop the whole elevated session and hard-navigate to re-authentication
    EndElevation { reauth_path: String },
}

impl UnauthorizedStrategy {
    fn for_scope(subsystem: Subsystem, scope: CredentialScope, reauth_path: &str) -> Self {
        match scope {
            CredentialScope::Elevated => UnauthorizedStrategy::EndElevation {
                reauth_path: reauth_path.to_string(),
            },
            CredentialScope::Normal => UnauthorizedStrategy::ClearSubsystem(subsystem),
        }
    }
}

/// Builds the request client for each subsystem from shared session seams
#[derive(Clone)]
pub struct ClientFactory {
    config: Arc<AppConfig>,
    provider: Arc<dyn CredentialProvider>,
    navigator: Arc<dyn Navigator>,
}

impl ClientFactory {
    pub fn new(
        config: Arc<AppConfig>,
        provider: Arc<dyn CredentialProvider>,
        navigator: Arc<dyn Navigator>,
    ) -> Self {
        Self {
            config,
            provider,
            navigator,
        }
    }

    pub fn client(&self, subsystem: Subsystem) -> Result<ApiClient, ClientError> {
        ApiClient::new(
            subsystem,
            &self.config.base_url(subsystem),
            Duration::from_secs(self.config.http.timeout_secs),
            self.provider.clone(),
            self.navigator.clone(),
            &self.config.routes.super_admin_login_path,
        )
    }
}

pub struct ApiClient {
    subsystem: Subsystem,
    base_url: Url,
    http: reqwest::Client,
    provider: Arc<dyn CredentialProvider>,
    navigator: Arc<dyn Navigator>,
    reauth_path: String,
}

impl ApiClient {
    pub fn new(
        subsystem: Subsystem,
        base_url: &str,
        timeout: Duration,
        provider: Arc<dyn CredentialProvider>,
        navigator: Arc<dyn Navigator>,
        reauth_path: &str,
    ) -> Result<Self, ClientError> {
        let base_url = Url::parse(base_url).map_err(|source| ClientError::InvalidBaseUrl {
            subsystem,
            url: base_url.to_string(),
            source,
        })?;

        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        let http = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(timeout)
            .build()
            .map_err(ClientError::Build)?;

        Ok(Self {
            subsystem,
            base_url,
            http,
            provider,
            navigator,
            reauth_path: reauth_path.to_string(),
        })
    }

    pub fn subsystem(&self) -> Subsystem {
        self.subsystem
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, ClientError> {
        let value = self.send(Method::GET, path, None).await?;
        self.decode(value)
    }

    pub async fn post<B: Serialize, T: DeserializeOwned>(&self, path: &str, body: &B) -> Result<T, ClientError> {
        let body = self.encode(body)?;
        let value = self.send(Method::POST, path, Some(&body)).await?;
        self.decode(value)
    }

    pub async fn put<B: Serialize, T: DeserializeOwned>(&self, path: &str, body: &B) -> Result<T, ClientError> {
        let body = self.encode(body)?;
        let value = self.send(Method::PUT, path, Some(&body)).await?;
        self.decode(value)
    }

    pub async fn patch<B: Serialize, T: DeserializeOwned>(&self, path: &str, body: &B) -> Result<T, ClientError> {
        let body = self.encode(body)?;
        let value = self.send(Method::PATCH, path, Some(&body)).await?;
        self.decode(value)
    }

    pub async fn delete<T: DeserializeOwned>(&self, path: &str) -> Result<T, ClientError> {
        let value = self.send(Method::DELETE, path, None).await?;
        self.decode(value)
    }

    /// Authenticated request: token injected before send, 401 handled after
    pub async fn send(&self, method: Method, path: &str, body: Option<&Value>) -> Result<Value, ClientError> {
        let credential = self.provider.resolve(self.subsystem).await;
        if credential.is_none() {
            tracing::debug!("No token for {}, sending {} {} without Authorization", self.subsystem, method, path);
        }

        let mut request = self.http.request(method, self.url_for(path)?);
        if let Some(credential) = &credential {
            request = request.bearer_auth(&credential.token);
        }
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request.send().await.map_err(|source| ClientError::Transport {
            subsystem: self.subsystem,
            source,
        })?;

        match self.read(response).await {
            Err(ClientError::Http { status, body, .. }) if status == StatusCode::UNAUTHORIZED => {
                let scope = credential
                    .as_ref()
                    .map_or(CredentialScope::Normal, |c: &ResolvedCredential| c.scope);
                self.unauthorized(UnauthorizedStrategy::for_scope(self.subsystem, scope, &self.reauth_path));
                Err(ClientError::Unauthorized {
                    subsystem: self.subsystem,
                    scope,
                    body,
                })
            }
            other => other,
        }
    }

    /// Request without any credential or 401 handling, for login endpoints
    pub async fn send_public(&self, method: Method, path: &str, body: Option<&Value>) -> Result<Value, ClientError> {
        let mut request = self.http.request(method, self.url_for(path)?);
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request.send().await.map_err(|source| ClientError::Transport {
            subsystem: self.subsystem,
            source,
        })?;
        self.read(response).await
    }

    /// Request with an explicit bearer token, bypassing the provider and 401 handling
    pub async fn send_with_token(
        &self,
        method: Method,
        path: &str,
        token: &str,
        body: Option<&Value>,
    ) -> Result<Value, ClientError> {
        let mut request = self.http.request(method, self.url_for(path)?).bearer_auth(token);
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request.send().await.map_err(|source| ClientError::Transport {
            subsystem: self.subsystem,
            source,
        })?;
        self.read(response).await
    }

    fn unauthorized(&self, strategy: UnauthorizedStrategy) {
        match strategy {
            UnauthorizedStrategy::ClearSubsystem(subsystem) => {
                tracing::warn!("{} returned 401, clearing its token", subsystem);
                self.provider.revoke(subsystem, CredentialScope::Normal);
            }
            UnauthorizedStrategy::EndElevation { reauth_path } => {
                tracing::warn!("{} rejected the elevated token, ending super-admin session", self.subsystem);
                self.provider.revoke(self.subsystem, CredentialScope::Elevated);
                self.navigator.navigate(Navigation::Internal(reauth_path));
            }
        }
    }

    async fn read(&self, response: Response) -> Result<Value, ClientError> {
        let status = response.status();
        let bytes = response.bytes().await.map_err(|source| ClientError::Transport {
            subsystem: self.subsystem,
            source,
        })?;

        if status.is_success() {
            if bytes.iter().all(u8::is_ascii_whitespace) {
                return Ok(Value::Null);
            }
            return serde_json::from_slice(&bytes).map_err(|source| ClientError::Decode {
                subsystem: self.subsystem,
                source,
            });
        }

        Err(ClientError::Http {
            subsystem: self.subsystem,
            status,
            body: serde_json::from_slice(&bytes).ok(),
        })
    }

    fn url_for(&self, path: &str) -> Result<Url, ClientError> {
        let raw = format!(
            "{}/{}",
            self.base_url.as_str().trim_end_matches('/'),
            path.trim_start_matches('/')
        );
        Url::parse(&raw).map_err(|source| ClientError::InvalidBaseUrl {
            subsystem: self.subsystem,
            url: raw,
            source,
        })
    }

    fn encode<B: Serialize>(&self, body: &B) -> Result<Value, ClientError> {
        serde_json::to_value(body).map_err(|source| ClientError::Decode {
            subsystem: self.subsystem,
            source,
        })
    }

    fn decode<T: DeserializeOwned>(&self, value: Value) -> Result<T, ClientError> {
        serde_json::from_value(value).map_err(|source| ClientError::Decode {
            subsystem: self.subsystem,
            source,
        })
    }
}
