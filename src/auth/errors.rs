use crate::auth::storage::StorageError;
use std::{collections::BTreeMap, fmt};
use thiserror::Error;

/// Login form fields that carry their own validation errors.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Field {
    Username,
    Password,
}

impl Field {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Field::Username => "username",
            Field::Password => "password",
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
pub enum FieldError {
    #[error("required")]
    Required,
}

pub type FieldErrors = BTreeMap<Field, FieldError>;

/// Errors surfaced by the login form. Every variant renders as a message that
/// is safe to show to the person at the terminal.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum AuthError {
    #[error("{}", describe_fields(.0))]
    Validation(FieldErrors),
    #[error("{0}")]
    Authentication(String),
    #[error("{0}")]
    Network(String),
    #[error("{0}")]
    Storage(String),
}

fn describe_fields(errors: &FieldErrors) -> String {
    errors
        .iter()
        .map(|(field, error)| format!("{field}: {error}"))
        .collect::<Vec<_>>()
        .join(", ")
}

impl From<StorageError> for AuthError {
    fn from(_: StorageError) -> Self {
        AuthError::Storage("Could not save the session. Please try again.".to_string())
    }
}

/// Invalid client configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid url: {0}")]
    Url(#[from] url::ParseError),
    #[error("unsupported url scheme: {0}")]
    Scheme(String),
    #[error("missing setting: {0}")]
    Missing(&'static str),
    #[error("failed to build http client: {0}")]
    HttpClient(#[from] reqwest::Error),
    #[error("failed to read user directory: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid user directory: {0}")]
    Json(#[from] serde_json::Error),
    #[error("duplicate username in directory: {0}")]
    DuplicateUser(String),
}
