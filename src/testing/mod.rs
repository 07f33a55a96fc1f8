use std::sync::Arc;

use crate::config::{AppConfig, Environment};
use crate::console::Console;
use crate::navigation::RecordingNavigator;
use crate::session::{MemoryCookieStore, MemoryStorage};
use crate::types::Subsystem;

/// In-memory console wiring for unit tests
pub struct TestContext {
    pub console: Console,
    pub storage: Arc<MemoryStorage>,
    pub cookies: Arc<MemoryCookieStore>,
    pub navigator: Arc<RecordingNavigator>,
}

impl TestContext {
    /// Every subsystem pointed at `base_url`
    pub fn new(base_url: &str) -> Self {
        let mut config = AppConfig::for_environment(Environment::Development);
        for subsystem in Subsystem::ALL {
            config = config.with_subsystem_url(subsystem, base_url);
        }
        config.http.timeout_secs = 2;
        Self::with_config(config)
    }

    pub fn with_config(config: AppConfig) -> Self {
        let storage = Arc::new(MemoryStorage::new());
        let cookies = Arc::new(MemoryCookieStore::new());
        let navigator = Arc::new(RecordingNavigator::new());
        let console = Console::open(Arc::new(config), storage.clone(), cookies.clone(), navigator.clone());

        Self {
            console,
            storage,
            cookies,
            navigator,
        }
    }

    /// A second console over the same storage and cookies, like a page reload
    pub fn reload(&self) -> Console {
        Console::open(
            Arc::new(self.console.config().clone()),
            self.storage.clone(),
            self.cookies.clone(),
            self.navigator.clone(),
        )
    }

    /// Base URL nothing listens on
    pub fn unreachable_url() -> String {
        let port = portpicker::pick_unused_port().unwrap_or(9);
        format!("http://127.0.0.1:{}", port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::ClientError;
    use crate::session::TokenSet;

    #[test]
    fn test_reload_rehydrates_both_stores() {
        let ctx = TestContext::new("http://127.0.0.1:1");
        ctx.console.credentials().set_tokens(TokenSet {
            student_affairs: Some("tok-a".into()),
            finance: Some("tok-b".into()),
            library: Some("tok-c".into()),
            academic: Some("tok-d".into()),
        });
        ctx.console.super_admin().set_super_admin("elev-tok", "a@b.com");

        let reloaded = ctx.reload();
        assert_eq!(reloaded.credentials().snapshot(), ctx.console.credentials().snapshot());
        assert_eq!(reloaded.super_admin_mode().mount().super_admin_token.as_deref(), Some("elev-tok"));
    }

    #[tokio::test]
    async fn test_failed_bulk_login_leaves_store_untouched() {
        let ctx = TestContext::new(&TestContext::unreachable_url());
        ctx.console.credentials().set_token(Subsystem::Library, "keep-me");

        let result = ctx.console.auth().login_all("a@b.com", "secret").await;

        assert!(matches!(result, Err(ClientError::Transport { .. })));
        assert_eq!(ctx.console.credentials().get_token(Subsystem::Library).as_deref(), Some("keep-me"));
        assert!(ctx.console.credentials().get_token(Subsystem::StudentAffairs).is_none());
    }

    #[tokio::test]
    async fn test_transport_failure_mutates_nothing() {
        let ctx = TestContext::new(&TestContext::unreachable_url());
        ctx.console.credentials().set_token(Subsystem::Finance, "fin");

        let client = ctx.console.client(Subsystem::Finance).unwrap();
        let result: Result<serde_json::Value, _> = client.get("invoices").await;

        assert!(matches!(result, Err(ClientError::Transport { .. })));
        assert_eq!(ctx.console.credentials().get_token(Subsystem::Finance).as_deref(), Some("fin"));
        assert!(ctx.navigator.history().is_empty());
    }
}
