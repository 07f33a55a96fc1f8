#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use anyhow::{Context, Result};
use axum::extract::State;
use axum::http::{header, HeaderMap, Method, StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use axum::{Json, Router};
use serde_json::{json, Value};
use tokio::net::TcpListener;

use smart_school_console::config::{AppConfig, Environment};
use smart_school_console::navigation::RecordingNavigator;
use smart_school_console::session::{MemoryCookieStore, MemoryStorage, TokenSet};
use smart_school_console::types::Subsystem;
use smart_school_console::Console;

/// One request as the fake backend saw it
#[derive(Debug, Clone)]
pub struct Hit {
    pub method: Method,
    pub path: String,
    pub authorization: Option<String>,
    pub accept: Option<String>,
}

struct MockState {
    subsystem: Subsystem,
    hits: Mutex<Vec<Hit>>,
    status: Mutex<StatusCode>,
    reject_login: Mutex<bool>,
}

/// In-process stand-in for one subsystem backend, serving under `/api/v1`
pub struct MockBackend {
    pub base_url: String,
    state: Arc<MockState>,
}

impl MockBackend {
    async fn spawn(subsystem: Subsystem) -> Result<Self> {
        let port = portpicker::pick_unused_port().context("failed to pick free port")?;
        let listener = TcpListener::bind(("127.0.0.1", port))
            .await
            .with_context(|| format!("failed to bind mock {} backend", subsystem))?;

        let state = Arc::new(MockState {
            subsystem,
            hits: Mutex::new(Vec::new()),
            status: Mutex::new(StatusCode::OK),
            reject_login: Mutex::new(false),
        });
        let app = Router::new().fallback(handle).with_state(state.clone());
        tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });

        Ok(Self {
            base_url: format!("http://127.0.0.1:{}", port),
            state,
        })
    }

    /// Status for every non-login route from now on
    pub fn respond_with(&self, status: StatusCode) {
        *self.state.status.lock().unwrap() = status;
    }

    pub fn reject_login(&self) {
        *self.state.reject_login.lock().unwrap() = true;
    }

    pub fn hits(&self) -> Vec<Hit> {
        self.state.hits.lock().unwrap().clone()
    }

    pub fn last_hit(&self) -> Hit {
        self.hits().pop().expect("backend received no request")
    }

    pub fn hits_to(&self, path: &str) -> Vec<Hit> {
        self.hits().into_iter().filter(|h| h.path == path).collect()
    }
}

pub fn issued_token(subsystem: Subsystem) -> String {
    format!("{}-token", subsystem.key())
}

pub const ELEVATED_TOKEN: &str = "elevated-token";
pub const SUPER_ADMIN_EMAIL: &str = "root@school.id";

fn admin_user() -> Value {
    json!({ "id": 1, "name": "Admin Sekolah", "email": "admin@school.id" })
}

async fn handle(State(state): State<Arc<MockState>>, method: Method, uri: Uri, headers: HeaderMap) -> Response {
    let path = uri.path().trim_start_matches("/api/v1/").to_string();
    let text = |name: header::HeaderName| headers.get(name).and_then(|v| v.to_str().ok()).map(str::to_string);

    state.hits.lock().unwrap().push(Hit {
        method: method.clone(),
        path: path.clone(),
        authorization: text(header::AUTHORIZATION),
        accept: text(header::ACCEPT),
    });

    match (method, path.as_str()) {
        (Method::POST, "login") => {
            if *state.reject_login.lock().unwrap() {
                return (StatusCode::UNAUTHORIZED, Json(json!({ "message": "Invalid credentials" }))).into_response();
            }
            Json(json!({
                "data": { "token": issued_token(state.subsystem), "user": admin_user() }
            }))
            .into_response()
        }
        (Method::POST, "super-admin/login") => Json(json!({
            "access_token": ELEVATED_TOKEN,
            "user": { "id": 99, "name": "Root", "email": SUPER_ADMIN_EMAIL }
        }))
        .into_response(),
        (_, path) => {
            let status = *state.status.lock().unwrap();
            if !status.is_success() {
                return (status, Json(json!({ "message": format!("mock {}", status.as_u16()) }))).into_response();
            }
            if path == "user" {
                return Json(json!({ "data": admin_user() })).into_response();
            }
            Json(json!({ "subsystem": state.subsystem.key(), "path": path })).into_response()
        }
    }
}

/// A console wired to four fake backends with in-memory storage and cookies
pub struct Harness {
    pub console: Console,
    pub storage: Arc<MemoryStorage>,
    pub cookies: Arc<MemoryCookieStore>,
    pub navigator: Arc<RecordingNavigator>,
    backends: HashMap<Subsystem, MockBackend>,
}

impl Harness {
    pub async fn start() -> Result<Self> {
        let mut config = AppConfig::for_environment(Environment::Development);
        config.http.timeout_secs = 5;

        let mut backends = HashMap::new();
        for subsystem in Subsystem::ALL {
            let backend = MockBackend::spawn(subsystem).await?;
            config = config.with_subsystem_url(subsystem, backend.base_url.clone());
            backends.insert(subsystem, backend);
        }

        let storage = Arc::new(MemoryStorage::new());
        let cookies = Arc::new(MemoryCookieStore::new());
        let navigator = Arc::new(RecordingNavigator::new());
        let console = Console::open(Arc::new(config), storage.clone(), cookies.clone(), navigator.clone());

        Ok(Self {
            console,
            storage,
            cookies,
            navigator,
            backends,
        })
    }

    pub fn backend(&self, subsystem: Subsystem) -> &MockBackend {
        &self.backends[&subsystem]
    }

    /// Store tokens A..D for the four subsystems
    pub fn seed_tokens(&self) {
        self.console.credentials().set_tokens(TokenSet {
            student_affairs: Some("A".into()),
            finance: Some("B".into()),
            library: Some("C".into()),
            academic: Some("D".into()),
        });
    }

    /// Fresh console over the same storage and cookies, like a page reload
    pub fn reload(&self) -> Console {
        Console::open(
            Arc::new(self.console.config().clone()),
            self.storage.clone(),
            self.cookies.clone(),
            self.navigator.clone(),
        )
    }

    /// GET `ping` on a subsystem and return the Authorization header it carried
    pub async fn authorization_for(&self, subsystem: Subsystem) -> Result<Option<String>> {
        let client = self.console.client(subsystem)?;
        let _: Value = client.get("ping").await?;
        Ok(self.backend(subsystem).last_hit().authorization)
    }
}

pub fn bearer(token: &str) -> Option<String> {
    Some(format!("Bearer {}", token))
}
