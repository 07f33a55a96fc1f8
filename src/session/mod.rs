//! Client-side session state: the four subsystem tokens, the optional
//! super-admin elevation, and the provider that hands the right token to each
//! outgoing request.

pub mod cookies;
pub mod credentials;
pub mod provider;
pub mod storage;
pub mod super_admin;

pub use cookies::{CookieStore, FileCookieStore, MemoryCookieStore};
pub use credentials::{CredentialSet, CredentialStore, TokenSet};
pub use provider::{CredentialProvider, CredentialScope, ResolvedCredential, SessionProvider};
pub use storage::{FileStorage, MemoryStorage, Storage, StorageError};
pub use super_admin::{CookieSettings, SuperAdminSession, SuperAdminStore};
