use reqwest::StatusCode;
use serde_json::Value;
use thiserror::Error;

use crate::session::CredentialScope;
use crate::types::Subsystem;

/// Errors surfaced by the subsystem request clients
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("{subsystem} rejected the request credentials")]
    Unauthorized {
        subsystem: Subsystem,
        scope: CredentialScope,
        body: Option<Value>,
    },

    #[error("{subsystem} responded with {status}")]
    Http {
        subsystem: Subsystem,
        status: StatusCode,
        body: Option<Value>,
    },

    #[error("Request to {subsystem} failed: {source}")]
    Transport {
        subsystem: Subsystem,
        #[source]
        source: reqwest::Error,
    },

    #[error("Invalid JSON for {subsystem}: {source}")]
    Decode {
        subsystem: Subsystem,
        #[source]
        source: serde_json::Error,
    },

    #[error("Invalid base URL for {subsystem}: {url}")]
    InvalidBaseUrl {
        subsystem: Subsystem,
        url: String,
        #[source]
        source: url::ParseError,
    },

    #[error("Failed to build HTTP client: {0}")]
    Build(#[source] reqwest::Error),
}

impl ClientError {
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            ClientError::Unauthorized { .. } => Some(StatusCode::UNAUTHORIZED),
            ClientError::Http { status, .. } => Some(*status),
            ClientError::Transport { source, .. } => source.status(),
            _ => None,
        }
    }

    pub fn is_unauthorized(&self) -> bool {
        self.status() == Some(StatusCode::UNAUTHORIZED)
    }

    /// Backend-provided `message`, when the error body carried one
    pub fn server_message(&self) -> Option<&str> {
        match self {
            ClientError::Unauthorized { body, .. } | ClientError::Http { body, .. } => body
                .as_ref()
                .and_then(|b| b.get("message"))
                .and_then(Value::as_str),
            _ => None,
        }
    }
}
