use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::credentials::CredentialStore;
use super::super_admin::SuperAdminStore;
use crate::types::Subsystem;

/// Which session a token came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CredentialScope {
    /// The subsystem's own token
    Normal,
    /// The super-admin token, finance only
    Elevated,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedCredential {
    pub token: String,
    pub scope: CredentialScope,
}

/// Source of bearer tokens for the request clients.
///
/// Clients resolve a credential right before each request and report
/// rejections back, so each request sees the store as it is at send time.
#[async_trait]
pub trait CredentialProvider: Send + Sync {
    async fn resolve(&self, subsystem: Subsystem) -> Option<ResolvedCredential>;

    /// Forget the credential a request was rejected with
    fn revoke(&self, subsystem: Subsystem, scope: CredentialScope);
}

/// Provider backed by the persisted credential and super-admin stores
#[derive(Clone)]
pub struct SessionProvider {
    credentials: Arc<CredentialStore>,
    super_admin: Arc<SuperAdminStore>,
}

impl SessionProvider {
    pub fn new(credentials: Arc<CredentialStore>, super_admin: Arc<SuperAdminStore>) -> Self {
        Self {
            credentials,
            super_admin,
        }
    }
}

#[async_trait]
impl CredentialProvider for SessionProvider {
    async fn resolve(&self, subsystem: Subsystem) -> Option<ResolvedCredential> {
        if subsystem == Subsystem::Finance {
            if let Some(token) = self.super_admin.elevated_token() {
                tracing::debug!("Using elevated token for {}", subsystem);
                return Some(ResolvedCredential {
                    token,
                    scope: CredentialScope::Elevated,
                });
            }
        }

        self.credentials.get_token(subsystem).map(|token| ResolvedCredential {
            token,
            scope: CredentialScope::Normal,
        })
    }

    fn revoke(&self, subsystem: Subsystem, scope: CredentialScope) {
        match scope {
            CredentialScope::Elevated => self.super_admin.clear_super_admin(),
            CredentialScope::Normal => self.credentials.clear_token(subsystem),
        }
    }
}
