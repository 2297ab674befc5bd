//! Remote login against the staff API. The client posts credentials to
//! `/api/auth/login` and maps every result, including transport failures and
//! timeouts, into an [`AuthOutcome`]. Request bodies carry the password and
//! must never be logged.

use crate::{
    auth::{
        errors::ConfigError,
        token,
        types::{Credentials, Session, User},
        validator::{AuthOutcome, RejectReason},
    },
    APP_USER_AGENT,
};
use reqwest::Client;
use secrecy::ExposeSecret;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, instrument, warn};
use url::Url;

/// Login endpoint, relative to the API base URL.
pub const LOGIN_PATH: &str = "/api/auth/login";
/// Default timeout applied to a whole login exchange.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);
/// Maximum number of server message characters surfaced to the form.
const MAX_MESSAGE_CHARS: usize = 200;

#[derive(Serialize)]
struct LoginRequest<'a> {
    username: &'a str,
    password: &'a str,
}

#[derive(Debug, Deserialize)]
struct LoginResponse {
    success: bool,
    #[serde(default)]
    token: Option<String>,
    #[serde(default)]
    user: Option<User>,
    #[serde(default)]
    message: Option<String>,
}

#[derive(Debug, Clone)]
pub struct RemoteAuthority {
    client: Client,
    login_url: Url,
    timeout: Option<Duration>,
}

impl RemoteAuthority {
    /// Builds a client for the API at `base_url`.
    ///
    /// # Errors
    ///
    /// Returns an error if the URL is not an absolute `http`/`https` URL or the
    /// HTTP client cannot be built.
    pub fn new(base_url: &str, timeout: Option<Duration>) -> Result<Self, ConfigError> {
        let base = base_url.trim();
        if base.is_empty() {
            return Err(ConfigError::Missing("api url"));
        }

        let login_url = Url::parse(&build_url_with_base(base, LOGIN_PATH))?;
        match login_url.scheme() {
            "http" | "https" => {}
            other => return Err(ConfigError::Scheme(other.to_string())),
        }

        let client = Client::builder().user_agent(APP_USER_AGENT).build()?;

        Ok(Self {
            client,
            login_url,
            timeout,
        })
    }

    #[must_use]
    pub fn login_url(&self) -> &Url {
        &self.login_url
    }

    /// Sends the credentials and resolves to exactly one outcome.
    #[instrument(skip_all, fields(url = %self.login_url, username = %credentials.username))]
    pub async fn authenticate(&self, credentials: &Credentials) -> AuthOutcome {
        let exchange = self.exchange(credentials);
        match self.timeout {
            Some(limit) => tokio::time::timeout(limit, exchange)
                .await
                .unwrap_or_else(|_| {
                    warn!("login request timed out after {limit:?}");
                    AuthOutcome::Rejected(RejectReason::NetworkError)
                }),
            None => exchange.await,
        }
    }

    async fn exchange(&self, credentials: &Credentials) -> AuthOutcome {
        let request = LoginRequest {
            username: credentials.username.trim(),
            password: credentials.password.expose_secret(),
        };

        let response = match self
            .client
            .post(self.login_url.clone())
            .json(&request)
            .send()
            .await
        {
            Ok(response) => response,
            Err(err) => {
                warn!("login request failed: {err}");
                return AuthOutcome::Rejected(RejectReason::NetworkError);
            }
        };

        let status = response.status();
        let body = match response.bytes().await {
            Ok(body) => body,
            Err(err) => {
                warn!("failed to read login response: {err}");
                return AuthOutcome::Rejected(RejectReason::NetworkError);
            }
        };

        debug!("login response status: {status}");

        match serde_json::from_slice::<LoginResponse>(&body) {
            Ok(response) => map_login_response(response),
            Err(_) if status.is_client_error() => {
                AuthOutcome::Rejected(RejectReason::Denied { message: None })
            }
            Err(_) if status.is_server_error() => {
                AuthOutcome::Rejected(RejectReason::NetworkError)
            }
            Err(err) => {
                warn!("undecodable login response ({status}): {err}");
                AuthOutcome::Rejected(RejectReason::InvalidResponse)
            }
        }
    }
}

/// Maps a decoded login body into an outcome.
fn map_login_response(response: LoginResponse) -> AuthOutcome {
    if !response.success {
        return AuthOutcome::Rejected(RejectReason::Denied {
            message: response.message.as_deref().and_then(sanitize_message),
        });
    }

    let (Some(token), Some(user)) = (response.token, response.user) else {
        warn!("login succeeded without token or user");
        return AuthOutcome::Rejected(RejectReason::InvalidResponse);
    };

    match token::decode(&token) {
        Ok(payload) if payload.user_id == user.id => {
            AuthOutcome::Authenticated(Session { token, user })
        }
        Ok(_) => {
            warn!("login token was issued for another user");
            AuthOutcome::Rejected(RejectReason::InvalidResponse)
        }
        Err(err) => {
            warn!("login token is malformed: {err}");
            AuthOutcome::Rejected(RejectReason::InvalidResponse)
        }
    }
}

/// Builds a URL from an explicit base URL and the provided path.
fn build_url_with_base(base_url: &str, path: &str) -> String {
    let base = base_url.trim().trim_end_matches('/');
    let path = path.trim();

    if base.is_empty() {
        path.to_string()
    } else {
        format!("{}/{}", base, path.trim_start_matches('/'))
    }
}

/// Trims and truncates server messages; blank messages are dropped.
fn sanitize_message(message: &str) -> Option<String> {
    let trimmed = message.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.chars().take(MAX_MESSAGE_CHARS).collect())
    }
}
