//! Domain records shared by the auth flow. `Credentials` carry the password as
//! a secret and must never be persisted or logged; `User` and `Session` are the
//! only records that reach durable storage.

use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};
use thiserror::Error;

/// Raised when a role tag is outside the closed role set.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown role: {0}")]
pub struct UnknownRole(pub String);

/// Staff roles, ordered by privilege.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Empleado,
    Cajero,
    Viewer,
}

impl Role {
    pub const ALL: [Role; 4] = [Role::Admin, Role::Empleado, Role::Cajero, Role::Viewer];

    /// Position in the privilege order; higher ranks include lower ones.
    #[must_use]
    pub const fn rank(self) -> u8 {
        match self {
            Role::Admin => 4,
            Role::Empleado => 3,
            Role::Cajero => 2,
            Role::Viewer => 1,
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Empleado => "empleado",
            Role::Cajero => "cajero",
            Role::Viewer => "viewer",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = UnknownRole;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "admin" => Ok(Role::Admin),
            "empleado" => Ok(Role::Empleado),
            "cajero" => Ok(Role::Cajero),
            "viewer" => Ok(Role::Viewer),
            other => Err(UnknownRole(other.to_string())),
        }
    }
}

/// Username and password as typed into the login form.
#[derive(Debug)]
pub struct Credentials {
    pub username: String,
    pub password: SecretString,
}

impl Credentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        let password: String = password.into();
        Self {
            username: username.into(),
            password: SecretString::from(password),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
/// Staff member resolved by a credential check. Immutable for the lifetime of
/// the session it belongs to.
pub struct User {
    pub id: i64,
    pub username: String,
    pub full_name: String,
    pub email: String,
    pub role: Role,
    pub shift: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
/// Authenticated token and user pair owned by the session store.
pub struct Session {
    pub token: String,
    pub user: User,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_parses_every_known_tag() {
        for role in Role::ALL {
            assert_eq!(role.as_str().parse::<Role>(), Ok(role));
        }
    }

    #[test]
    fn role_rejects_unknown_tag() {
        assert_eq!(
            "supervisor".parse::<Role>(),
            Err(UnknownRole("supervisor".to_string()))
        );
        assert!("".parse::<Role>().is_err());
        assert!("Admin".parse::<Role>().is_err());
    }

    #[test]
    fn role_ranks_are_strictly_ordered() {
        assert!(Role::Admin.rank() > Role::Empleado.rank());
        assert!(Role::Empleado.rank() > Role::Cajero.rank());
        assert!(Role::Cajero.rank() > Role::Viewer.rank());
        assert_eq!(Role::Viewer.rank(), 1);
    }

    #[test]
    fn user_serializes_with_wire_names() {
        let user = User {
            id: 7,
            username: "cajero".to_string(),
            full_name: "Carla Caja".to_string(),
            email: "carla@shiftgate.dev".to_string(),
            role: Role::Cajero,
            shift: "tarde".to_string(),
        };

        let json = serde_json::to_value(&user).expect("Failed to serialize");
        assert_eq!(json["full_name"], "Carla Caja");
        assert_eq!(json["role"], "cajero");

        let unknown = serde_json::json!({
            "id": 1,
            "username": "x",
            "full_name": "x",
            "email": "x@y.z",
            "role": "root",
            "shift": "noche"
        });
        assert!(serde_json::from_value::<User>(unknown).is_err());
    }

    #[test]
    fn credentials_debug_hides_password() {
        let credentials = Credentials::new("admin", "admin123");
        let debug = format!("{credentials:?}");
        assert!(!debug.contains("admin123"));
    }
}
