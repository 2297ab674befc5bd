//! Credential checks behind a single `authenticate` call. The local strategy
//! reads the built-in or file-backed directory and mints its own token; the
//! remote strategy delegates to the staff API. Neither touches session storage.

use crate::auth::{
    client::RemoteAuthority,
    directory::{Directory, Lookup},
    token,
    types::{Credentials, Session},
};
use std::fmt;
use tracing::{error, info, instrument};

/// Why a login attempt did not produce a session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RejectReason {
    NotFound,
    BadPassword,
    /// The remote authority refused the credentials.
    Denied { message: Option<String> },
    NetworkError,
    InvalidResponse,
}

impl RejectReason {
    /// Stable code for logs; never shown to users.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            RejectReason::NotFound => "not_found",
            RejectReason::BadPassword => "bad_password",
            RejectReason::Denied { .. } => "denied",
            RejectReason::NetworkError => "network_error",
            RejectReason::InvalidResponse => "invalid_response",
        }
    }
}

impl fmt::Display for RejectReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthOutcome {
    Authenticated(Session),
    Rejected(RejectReason),
}

impl AuthOutcome {
    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        matches!(self, AuthOutcome::Authenticated(_))
    }
}

/// Interchangeable credential strategies.
#[derive(Debug)]
pub enum CredentialValidator {
    Local(Directory),
    Remote(RemoteAuthority),
}

impl CredentialValidator {
    #[must_use]
    pub const fn mode(&self) -> &'static str {
        match self {
            CredentialValidator::Local(_) => "local",
            CredentialValidator::Remote(_) => "remote",
        }
    }

    /// Resolves credentials to a session or a rejection. Never fails outright.
    #[instrument(skip_all, fields(mode = self.mode(), username = %credentials.username))]
    pub async fn authenticate(&self, credentials: &Credentials) -> AuthOutcome {
        let outcome = match self {
            CredentialValidator::Local(directory) => {
                authenticate_local(directory, credentials, token::unix_now())
            }
            CredentialValidator::Remote(authority) => authority.authenticate(credentials).await,
        };

        match &outcome {
            AuthOutcome::Authenticated(session) => {
                info!(role = %session.user.role, "credentials accepted");
            }
            AuthOutcome::Rejected(reason) => info!(reason = %reason, "credentials rejected"),
        }
        outcome
    }
}

/// Checks credentials against `directory` and issues a token at `now`.
pub fn authenticate_local(directory: &Directory, credentials: &Credentials, now: i64) -> AuthOutcome {
    match directory.verify(credentials) {
        Lookup::NotFound => AuthOutcome::Rejected(RejectReason::NotFound),
        Lookup::BadPassword => AuthOutcome::Rejected(RejectReason::BadPassword),
        Lookup::Found(user) => match token::encode(&user, now) {
            Ok(token) => AuthOutcome::Authenticated(Session { token, user }),
            Err(err) => {
                error!("failed to issue token: {err}");
                AuthOutcome::Rejected(RejectReason::InvalidResponse)
            }
        },
    }
}
