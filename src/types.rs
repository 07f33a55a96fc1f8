//! Shared types used across the codebase

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Backend subsystems the console talks to, each with its own authentication domain
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Subsystem {
    #[serde(rename = "kesiswaan")]
    StudentAffairs,
    #[serde(rename = "keuangan")]
    Finance,
    #[serde(rename = "perpustakaan")]
    Library,
    #[serde(rename = "akademik")]
    Academic,
}

impl Subsystem {
    pub const ALL: [Subsystem; 4] = [
        Subsystem::StudentAffairs,
        Subsystem::Finance,
        Subsystem::Library,
        Subsystem::Academic,
    ];

    /// The subsystem whose session decides whether anyone is logged in at all
    pub const PRIMARY: Subsystem = Subsystem::StudentAffairs;

    /// Wire/config name
    pub fn key(&self) -> &'static str {
        match self {
            Subsystem::StudentAffairs => "kesiswaan",
            Subsystem::Finance => "keuangan",
            Subsystem::Library => "perpustakaan",
            Subsystem::Academic => "akademik",
        }
    }

    /// Environment variable holding the subsystem's base URL
    pub fn env_var(&self) -> &'static str {
        match self {
            Subsystem::StudentAffairs => "KESISWAAN_API_URL",
            Subsystem::Finance => "KEUANGAN_API_URL",
            Subsystem::Library => "PERPUSTAKAAN_API_URL",
            Subsystem::Academic => "AKADEMIK_API_URL",
        }
    }
}

impl std::fmt::Display for Subsystem {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.key())
    }
}

impl std::str::FromStr for Subsystem {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "kesiswaan" | "student-affairs" | "student_affairs" => Ok(Subsystem::StudentAffairs),
            "keuangan" | "finance" => Ok(Subsystem::Finance),
            "perpustakaan" | "library" => Ok(Subsystem::Library),
            "akademik" | "academic" => Ok(Subsystem::Academic),
            other => Err(format!("unknown subsystem '{}'", other)),
        }
    }
}

/// Cached snapshot of the logged-in user as returned by the primary backend
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: i64,
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub avatar: Option<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_subsystem_parse_accepts_both_names() {
        assert_eq!("keuangan".parse::<Subsystem>().unwrap(), Subsystem::Finance);
        assert_eq!("Library".parse::<Subsystem>().unwrap(), Subsystem::Library);
        assert!("hostel".parse::<Subsystem>().is_err());
    }

    #[test]
    fn test_profile_accepts_backend_timestamps() {
        let profile: UserProfile = serde_json::from_str(
            r#"{"id": 7, "name": "Admin", "email": "admin@school.id",
                "created_at": "2024-01-02T03:04:05.000000Z"}"#,
        )
        .unwrap();
        assert_eq!(profile.id, 7);
        assert!(profile.avatar.is_none());
        assert!(profile.created_at.is_some());
    }
}
