//! Cookie jar as seen from the console.
//!
//! The elevated finance token is mirrored into a cookie so that both the
//! page code and anything reading the request headers can see it. A jar only
//! ever answers with live cookies; expired entries read as absent.

use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;
use std::sync::Mutex;

use cookie::time::{Duration, OffsetDateTime};
use cookie::{Cookie, SameSite};

use super::storage::StorageError;

pub trait CookieStore: Send + Sync {
    /// Value of a live cookie
    fn get(&self, name: &str) -> Option<String>;
    fn set(&self, cookie: Cookie<'static>);
    fn remove(&self, name: &str);
}

/// Build a strict same-site cookie that expires after `days`
pub fn session_cookie(name: &str, value: &str, days: i64, secure: bool) -> Cookie<'static> {
    Cookie::build((name.to_string(), value.to_string()))
        .path("/")
        .same_site(SameSite::Strict)
        .secure(secure)
        .expires(OffsetDateTime::now_utc() + Duration::days(days))
        .build()
}

fn is_expired(cookie: &Cookie<'_>) -> bool {
    cookie
        .expires_datetime()
        .map_or(false, |at| at <= OffsetDateTime::now_utc())
}

#[derive(Debug, Default)]
pub struct MemoryCookieStore {
    cookies: Mutex<HashMap<String, Cookie<'static>>>,
}

impl MemoryCookieStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl CookieStore for MemoryCookieStore {
    fn get(&self, name: &str) -> Option<String> {
        let cookies = self.cookies.lock().unwrap_or_else(|e| e.into_inner());
        cookies
            .get(name)
            .filter(|c| !is_expired(c))
            .map(|c| c.value().to_string())
    }

    fn set(&self, cookie: Cookie<'static>) {
        let mut cookies = self.cookies.lock().unwrap_or_else(|e| e.into_inner());
        cookies.insert(cookie.name().to_string(), cookie);
    }

    fn remove(&self, name: &str) {
        let mut cookies = self.cookies.lock().unwrap_or_else(|e| e.into_inner());
        cookies.remove(name);
    }
}

/// Cookies kept as Set-Cookie strings in a JSON file, keyed by name
#[derive(Debug)]
pub struct FileCookieStore {
    path: PathBuf,
    lock: Mutex<()>,
}

impl FileCookieStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    fn read_all(&self) -> HashMap<String, String> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(_) => return HashMap::new(),
        };
        serde_json::from_str(&content).unwrap_or_else(|e| {
            tracing::warn!("Ignoring unreadable cookie jar {}: {}", self.path.display(), e);
            HashMap::new()
        })
    }

    fn write_all(&self, cookies: &HashMap<String, String>) -> Result<(), StorageError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&self.path, serde_json::to_string_pretty(cookies)?)?;
        Ok(())
    }

    fn store(&self, cookies: &HashMap<String, String>) {
        if let Err(e) = self.write_all(cookies) {
            tracing::warn!("Failed to write cookie jar {}: {}", self.path.display(), e);
        }
    }
}

impl CookieStore for FileCookieStore {
    fn get(&self, name: &str) -> Option<String> {
        let _guard = self.lock.lock().unwrap_or_else(|e| e.into_inner());
        let raw = self.read_all().remove(name)?;
        let cookie = Cookie::parse(raw).ok()?;
        if is_expired(&cookie) {
            return None;
        }
        Some(cookie.value().to_string())
    }

    fn set(&self, cookie: Cookie<'static>) {
        let _guard = self.lock.lock().unwrap_or_else(|e| e.into_inner());
        let mut cookies = self.read_all();
        cookies.insert(cookie.name().to_string(), cookie.to_string());
        self.store(&cookies);
    }

    fn remove(&self, name: &str) {
        let _guard = self.lock.lock().unwrap_or_else(|e| e.into_inner());
        let mut cookies = self.read_all();
        if cookies.remove(name).is_some() {
            self.store(&cookies);
        }
    }
}
