use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use axum::{extract::State, middleware, response::Json, routing::get, Router};
use futures::future::join_all;
use serde_json::{json, Value};
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;

use crate::config::AppConfig;
use crate::error::ApiError;
use crate::guard::{route_guard_middleware, RouteGuard};
use crate::types::Subsystem;

/// Console router with the route guard in front of every page
pub fn app(config: Arc<AppConfig>) -> Router {
    let guard = Arc::new(RouteGuard::from_config(&config));
    let routes = config.routes.clone();

    Router::new()
        .route(&routes.root_path, get(root))
        .route(&routes.login_path, get(login_page))
        .route(&routes.landing_path, get(dashboard_page))
        .route(&routes.super_admin_login_path, get(super_admin_login_page))
        .route("/health", get(health))
        .fallback(not_found)
        .with_state(config)
        .layer(middleware::from_fn_with_state(guard, route_guard_middleware))
        .layer(TraceLayer::new_for_http())
}

/// Listener for the console server
pub async fn bind(host: &str, port: u16) -> anyhow::Result<TcpListener> {
    let addr = format!("{}:{}", host, port);
    TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))
}

fn page(name: &str, data: Value) -> Json<Value> {
    Json(json!({
        "success": true,
        "data": {
            "page": name,
            "details": data,
        }
    }))
}

async fn root(State(config): State<Arc<AppConfig>>) -> Json<Value> {
    let subsystems: Vec<Value> = Subsystem::ALL
        .into_iter()
        .map(|s| json!({ "name": s.key(), "base_url": config.base_url(s) }))
        .collect();

    page(
        "home",
        json!({
            "name": "Smart School Console",
            "version": env!("CARGO_PKG_VERSION"),
            "subsystems": subsystems,
            "routes": {
                "login": config.routes.login_path,
                "dashboard": config.routes.landing_path,
                "super_admin_login": config.routes.super_admin_login_path,
                "portal": config.routes.portal_url,
            }
        }),
    )
}

async fn login_page(State(config): State<Arc<AppConfig>>) -> Json<Value> {
    page("login", json!({ "portal": config.routes.portal_url }))
}

async fn dashboard_page() -> Json<Value> {
    page("dashboard", json!({}))
}

async fn super_admin_login_page(State(config): State<Arc<AppConfig>>) -> Json<Value> {
    page(
        "super-admin-login",
        json!({ "subsystem": Subsystem::Finance.key(), "cookie": config.session.super_admin_cookie }),
    )
}

async fn not_found(uri: axum::http::Uri) -> ApiError {
    ApiError::not_found(format!("No page at {}", uri.path()))
}

/// Reachability of each backend; any HTTP answer counts as up
async fn ping_subsystem(client: &reqwest::Client, url: String) -> bool {
    client
        .get(&url)
        .timeout(Duration::from_secs(5))
        .send()
        .await
        .is_ok()
}

async fn health(State(config): State<Arc<AppConfig>>) -> Result<Json<Value>, ApiError> {
    let client = reqwest::Client::new();
    let checks = Subsystem::ALL
        .into_iter()
        .map(|s| ping_subsystem(&client, config.base_url(s)));
    let results = join_all(checks).await;

    let statuses: serde_json::Map<String, Value> = Subsystem::ALL
        .into_iter()
        .zip(results.iter())
        .map(|(s, up)| (s.key().to_string(), json!(if *up { "up" } else { "down" })))
        .collect();

    if !results.iter().any(|up| *up) {
        tracing::warn!("Health check: no subsystem backend reachable");
        return Err(ApiError::service_unavailable("No subsystem backend is reachable"));
    }

    let status = if results.iter().all(|up| *up) { "ok" } else { "degraded" };
    Ok(Json(json!({
        "success": true,
        "data": {
            "status": status,
            "timestamp": chrono::Utc::now(),
            "subsystems": statuses,
        }
    })))
}
