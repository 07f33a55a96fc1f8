use std::sync::Arc;

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::CookieJar;

use crate::config::AppConfig;

/// Outcome of the edge check for one navigation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuardDecision {
    Pass,
    Redirect(String),
}

/// Cookie-presence check run before any page code.
///
/// Only the login path, the root and the primary landing page are guarded
/// here; every other page protects itself and the backends validate tokens.
#[derive(Debug, Clone)]
pub struct RouteGuard {
    session_cookie: String,
    root_path: String,
    login_path: String,
    landing_path: String,
}

impl RouteGuard {
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            session_cookie: config.session.primary_cookie.clone(),
            root_path: config.routes.root_path.clone(),
            login_path: config.routes.login_path.clone(),
            landing_path: config.routes.landing_path.clone(),
        }
    }

    pub fn session_cookie(&self) -> &str {
        &self.session_cookie
    }

    pub fn decide(&self, path: &str, has_session: bool) -> GuardDecision {
        if path == self.login_path && has_session {
            return GuardDecision::Redirect(self.root_path.clone());
        }
        if (path == self.root_path || path == self.landing_path) && !has_session {
            return GuardDecision::Redirect(self.login_path.clone());
        }
        GuardDecision::Pass
    }
}

/// Route guard middleware for the console router
pub async fn route_guard_middleware(
    State(guard): State<Arc<RouteGuard>>,
    jar: CookieJar,
    request: Request,
    next: Next,
) -> Response {
    let has_session = jar
        .get(guard.session_cookie())
        .map_or(false, |cookie| !cookie.value().is_empty());
    let path = request.uri().path().to_string();

    match guard.decide(&path, has_session) {
        GuardDecision::Pass => next.run(request).await,
        GuardDecision::Redirect(target) => {
            tracing::debug!("Route guard redirecting {} -> {}", path, target);
            Redirect::temporary(&target).into_response()
        }
    }
}
