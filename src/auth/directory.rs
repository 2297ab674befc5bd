//! Fixed user directory for offline mode. Every entry carries the password it
//! expects; passwords stay wrapped in `SecretString` and are compared only
//! inside [`Directory::verify`].

use crate::auth::{
    errors::ConfigError,
    types::{Credentials, Role, User},
};
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use std::{collections::HashSet, path::Path};

/// Outcome of a directory lookup, before any token is issued.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Lookup {
    Found(User),
    NotFound,
    BadPassword,
}

#[derive(Debug)]
struct DirectoryEntry {
    user: User,
    password: SecretString,
}

#[derive(Deserialize)]
struct DirectoryRecord {
    user: User,
    password: String,
}

#[derive(Debug)]
pub struct Directory {
    entries: Vec<DirectoryEntry>,
}

impl Directory {
    /// Demo staff shipped with the client.
    #[must_use]
    pub fn builtin() -> Self {
        let staff = [
            (1, "admin", "Administrador General", Role::Admin, "completo", "admin123"),
            (2, "empleado", "Elena Morales", Role::Empleado, "mañana", "empleado123"),
            (3, "cajero", "Carlos Ruiz", Role::Cajero, "tarde", "cajero123"),
            (4, "viewer", "Valeria Soto", Role::Viewer, "mañana", "viewer123"),
        ];

        let entries = staff
            .into_iter()
            .map(|(id, username, full_name, role, shift, password)| DirectoryEntry {
                user: User {
                    id,
                    username: username.to_string(),
                    full_name: full_name.to_string(),
                    email: format!("{username}@shiftgate.dev"),
                    role,
                    shift: shift.to_string(),
                },
                password: SecretString::from(password.to_string()),
            })
            .collect();

        Self { entries }
    }

    /// Parses a JSON array of `{"user": {...}, "password": "..."}` records.
    ///
    /// # Errors
    ///
    /// Returns an error on invalid JSON, an unknown role or a repeated username.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let records: Vec<DirectoryRecord> = serde_json::from_str(json)?;
        let mut seen = HashSet::new();
        let mut entries = Vec::with_capacity(records.len());

        for record in records {
            if !seen.insert(record.user.username.clone()) {
                return Err(ConfigError::DuplicateUser(record.user.username));
            }
            entries.push(DirectoryEntry {
                user: record.user,
                password: SecretString::from(record.password),
            });
        }

        Ok(Self { entries })
    }

    /// Loads a directory file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_json_file(path: &Path) -> Result<Self, ConfigError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Checks credentials against the directory.
    #[must_use]
    pub fn verify(&self, credentials: &Credentials) -> Lookup {
        let username = credentials.username.trim();
        let Some(entry) = self.entries.iter().find(|e| e.user.username == username) else {
            return Lookup::NotFound;
        };

        if entry.password.expose_secret() == credentials.password.expose_secret() {
            Lookup::Found(entry.user.clone())
        } else {
            Lookup::BadPassword
        }
    }
}
