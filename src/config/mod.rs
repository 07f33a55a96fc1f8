use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::env;
use std::path::PathBuf;

use crate::types::Subsystem;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub environment: Environment,
    pub subsystems: SubsystemConfig,
    pub routes: RouteConfig,
    pub session: SessionConfig,
    pub http: HttpConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Environment {
    Development,
    Staging,
    Production,
}

/// Base URLs of the four backends, without the API version suffix
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubsystemConfig {
    pub student_affairs_url: String,
    pub finance_url: String,
    pub library_url: String,
    pub academic_url: String,
    pub api_version_path: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RouteConfig {
    pub root_path: String,
    pub login_path: String,
    pub landing_path: String,
    pub super_admin_login_path: String,
    /// External portal users are sent to when the primary session is gone
    pub portal_url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    pub storage_dir: Option<PathBuf>,
    pub primary_cookie: String,
    pub super_admin_cookie: String,
    pub super_admin_cookie_days: i64,
    pub secure_cookies: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpConfig {
    pub timeout_secs: u64,
}

impl AppConfig {
    pub fn from_env() -> Self {
        let environment = match env::var("APP_ENV").as_deref() {
            Ok("production") | Ok("prod") => Environment::Production,
            Ok("staging") | Ok("stage") => Environment::Staging,
            _ => Environment::Development,
        };

        Self::for_environment(environment).with_env_overrides()
    }

    /// Preset defaults for an environment, before any env overrides
    pub fn for_environment(environment: Environment) -> Self {
        match environment {
            Environment::Production => Self::production(),
            Environment::Staging => Self::staging(),
            Environment::Development => Self::development(),
        }
    }

    fn with_env_overrides(mut self) -> Self {
        // Subsystem endpoints
        for subsystem in Subsystem::ALL {
            if let Ok(v) = env::var(subsystem.env_var()) {
                self = self.with_subsystem_url(subsystem, v);
            }
        }
        if let Ok(v) = env::var("API_VERSION_PATH") {
            self.subsystems.api_version_path = v;
        }

        // Routes
        if let Ok(v) = env::var("PORTAL_URL") {
            self.routes.portal_url = v;
        }

        // Session overrides
        if let Ok(v) = env::var("SESSION_STORAGE_DIR") {
            self.session.storage_dir = Some(PathBuf::from(v));
        }
        if let Ok(v) = env::var("SESSION_SECURE_COOKIES") {
            self.session.secure_cookies = v.parse().unwrap_or(self.session.secure_cookies);
        }
        if let Ok(v) = env::var("SUPER_ADMIN_COOKIE_DAYS") {
            self.session.super_admin_cookie_days = v.parse().unwrap_or(self.session.super_admin_cookie_days);
        }

        // HTTP overrides
        if let Ok(v) = env::var("HTTP_TIMEOUT_SECS") {
            self.http.timeout_secs = v.parse().unwrap_or(self.http.timeout_secs);
        }

        self
    }

    pub fn with_subsystem_url(mut self, subsystem: Subsystem, url: impl Into<String>) -> Self {
        let url = url.into();
        match subsystem {
            Subsystem::StudentAffairs => self.subsystems.student_affairs_url = url,
            Subsystem::Finance => self.subsystems.finance_url = url,
            Subsystem::Library => self.subsystems.library_url = url,
            Subsystem::Academic => self.subsystems.academic_url = url,
        }
        self
    }

    /// Base URL of a subsystem including the API version segment, e.g. `https://host/api/v1`
    pub fn base_url(&self, subsystem: Subsystem) -> String {
        let root = match subsystem {
            Subsystem::StudentAffairs => &self.subsystems.student_affairs_url,
            Subsystem::Finance => &self.subsystems.finance_url,
            Subsystem::Library => &self.subsystems.library_url,
            Subsystem::Academic => &self.subsystems.academic_url,
        };
        let version = self.subsystems.api_version_path.trim_matches('/');
        if version.is_empty() {
            root.trim_end_matches('/').to_string()
        } else {
            format!("{}/{}", root.trim_end_matches('/'), version)
        }
    }

    pub fn is_production(&self) -> bool {
        matches!(self.environment, Environment::Production)
    }

    fn development() -> Self {
        Self {
            environment: Environment::Development,
            subsystems: SubsystemConfig {
                student_affairs_url: "http://localhost:8001".to_string(),
                finance_url: "http://localhost:8002".to_string(),
                library_url: "http://localhost:8003".to_string(),
                academic_url: "http://localhost:8004".to_string(),
                api_version_path: "/api/v1".to_string(),
            },
            routes: RouteConfig::default(),
            session: SessionConfig {
                storage_dir: None,
                primary_cookie: "token".to_string(),
                super_admin_cookie: "super_admin_token".to_string(),
                super_admin_cookie_days: 7,
                secure_cookies: false,
            },
            http: HttpConfig { timeout_secs: 30 },
        }
    }

    fn staging() -> Self {
        let mut config = Self::development();
        config.environment = Environment::Staging;
        config.subsystems = SubsystemConfig {
            student_affairs_url: "https://kesiswaan.staging.smartschool.id".to_string(),
            finance_url: "https://keuangan.staging.smartschool.id".to_string(),
            library_url: "https://perpustakaan.staging.smartschool.id".to_string(),
            academic_url: "https://akademik.staging.smartschool.id".to_string(),
            api_version_path: "/api/v1".to_string(),
        };
        config.routes.portal_url = "https://portal.staging.smartschool.id".to_string();
        config.session.secure_cookies = true;
        config.http.timeout_secs = 20;
        config
    }

    fn production() -> Self {
        let mut config = Self::development();
        config.environment = Environment::Production;
        config.subsystems = SubsystemConfig {
            student_affairs_url: "https://kesiswaan.smartschool.id".to_string(),
            finance_url: "https://keuangan.smartschool.id".to_string(),
            library_url: "https://perpustakaan.smartschool.id".to_string(),
            academic_url: "https://akademik.smartschool.id".to_string(),
            api_version_path: "/api/v1".to_string(),
        };
        config.routes.portal_url = "https://portal.smartschool.id".to_string();
        config.session.secure_cookies = true;
        config.http.timeout_secs = 15;
        config
    }
}

impl Default for RouteConfig {
    fn default() -> Self {
        Self {
            root_path: "/".to_string(),
            login_path: "/login".to_string(),
            landing_path: "/dashboard".to_string(),
            super_admin_login_path: "/super-admin/login".to_string(),
            portal_url: "http://localhost:3001".to_string(),
        }
    }
}

// Global singleton config - initialized once at startup, binaries only
pub static CONFIG: Lazy<AppConfig> = Lazy::new(AppConfig::from_env);

pub fn config() -> &'static AppConfig {
    &CONFIG
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_development_config() {
        let config = AppConfig::development();
        assert!(!config.session.secure_cookies);
        assert_eq!(config.session.super_admin_cookie_days, 7);
        assert_eq!(config.routes.login_path, "/login");
    }

    #[test]
    fn test_default_production_config() {
        let config = AppConfig::production();
        assert!(config.is_production());
        assert!(config.session.secure_cookies);
    }

    #[test]
    fn test_base_url_appends_version_once() {
        let config = AppConfig::development()
            .with_subsystem_url(Subsystem::Library, "http://library.local/");
        assert_eq!(config.base_url(Subsystem::Library), "http://library.local/api/v1");

        let mut bare = config.clone();
        bare.subsystems.api_version_path = String::new();
        assert_eq!(bare.base_url(Subsystem::Library), "http://library.local");
    }
}
