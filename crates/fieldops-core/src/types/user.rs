//! User identity types.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The authenticated user's profile as reported by the server.
///
/// Whichever component last authenticated (bootstrap or interactive login)
/// owns this value; it is always replaced wholesale, never merged field by
/// field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    /// Server-side user ID.
    pub id: i64,

    /// Login name used for authentication.
    pub login: String,

    /// Human-readable display name, if the account has one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// Role within the dispatch organization.
    pub role: Role,
}

impl UserProfile {
    /// Display name, falling back to the login when no name is set.
    pub fn display_name(&self) -> &str {
        match self.name.as_deref() {
            Some(name) if !name.trim().is_empty() => name,
            _ => &self.login,
        }
    }
}

/// User role within the field-service organization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Full administrative access.
    Admin,

    /// Call-center operator.
    Operator,

    /// Field technician.
    Master,

    /// A role this client version does not know about.
    #[serde(other)]
    Unknown,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Admin => "admin",
            Self::Operator => "operator",
            Self::Master => "master",
            Self::Unknown => "unknown",
        };
        f.write_str(s)
    }
}
