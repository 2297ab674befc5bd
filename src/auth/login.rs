//! Login form controller. Field values are edited in place, submission runs
//! local validation before any network call, and at most one attempt is in
//! flight per form. Responses for abandoned or superseded attempts are dropped
//! without touching the session store.
//!
//! State flow: `Idle -> Validating -> Submitting -> Success | Error(message)`,
//! or `Idle -> Validating -> Error(field errors)` when a field is blank.

use crate::auth::{
    errors::{AuthError, Field, FieldError, FieldErrors},
    state::SessionStore,
    types::Credentials,
    validator::{AuthOutcome, CredentialValidator, RejectReason},
};
use secrecy::{ExposeSecret, SecretString};
use thiserror::Error;
use tracing::{debug, error, instrument};

const MSG_NOT_FOUND: &str = "User not found.";
const MSG_INVALID_CREDENTIALS: &str = "Invalid username or password.";
const MSG_NETWORK: &str = "Unable to reach the server. Please try again.";
const MSG_BAD_RESPONSE: &str = "Unexpected response from the server. Please try again.";

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FormState {
    Idle,
    Validating,
    Submitting,
    Success,
    Error(AuthError),
}

/// Identifies one login attempt.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AttemptTicket(u64);

/// A validated attempt, ready to be sent to the credential validator.
#[derive(Debug)]
pub struct Attempt {
    pub ticket: AttemptTicket,
    pub credentials: Credentials,
}

#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum SubmitBlocked {
    #[error("a login attempt is already in flight")]
    InFlight,
    #[error("{}", AuthError::Validation(.0.clone()))]
    Invalid(FieldErrors),
}

/// Result of handing an outcome back to the form.
#[must_use]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Completion {
    Applied,
    Stale,
}

#[derive(Debug)]
pub struct LoginForm {
    username: String,
    password: SecretString,
    state: FormState,
    attempt: u64,
}

impl Default for LoginForm {
    fn default() -> Self {
        Self::new()
    }
}

impl LoginForm {
    #[must_use]
    pub fn new() -> Self {
        Self {
            username: String::new(),
            password: SecretString::default(),
            state: FormState::Idle,
            attempt: 0,
        }
    }

    #[must_use]
    pub fn state(&self) -> &FormState {
        &self.state
    }

    /// True while an attempt is in flight; drives the submit button spinner.
    #[must_use]
    pub fn is_loading(&self) -> bool {
        self.state == FormState::Submitting
    }

    #[must_use]
    pub fn username(&self) -> &str {
        &self.username
    }

    #[must_use]
    pub fn field_error(&self, field: Field) -> Option<FieldError> {
        match &self.state {
            FormState::Error(AuthError::Validation(errors)) => errors.get(&field).copied(),
            _ => None,
        }
    }

    pub fn set_username(&mut self, value: impl Into<String>) {
        self.username = value.into();
        self.clear_field_error(Field::Username);
    }

    pub fn set_password(&mut self, value: impl Into<String>) {
        let value: String = value.into();
        self.password = SecretString::from(value);
        self.clear_field_error(Field::Password);
    }

    fn clear_field_error(&mut self, field: Field) {
        let none_left = match &mut self.state {
            FormState::Error(AuthError::Validation(errors)) => {
                errors.remove(&field);
                errors.is_empty()
            }
            _ => false,
        };
        if none_left {
            self.state = FormState::Idle;
        }
    }

    fn validate(&self) -> FieldErrors {
        let mut errors = FieldErrors::new();
        if self.username.trim().is_empty() {
            errors.insert(Field::Username, FieldError::Required);
        }
        if self.password.expose_secret().trim().is_empty() {
            errors.insert(Field::Password, FieldError::Required);
        }
        errors
    }

    /// Validates the fields and opens a new attempt.
    ///
    /// # Errors
    ///
    /// Returns `SubmitBlocked::InFlight` while another attempt is pending (the
    /// state is left alone), or `SubmitBlocked::Invalid` after moving to the
    /// field error state.
    pub fn begin(&mut self) -> Result<Attempt, SubmitBlocked> {
        if self.is_loading() {
            debug!("submit ignored: attempt {} in flight", self.attempt);
            return Err(SubmitBlocked::InFlight);
        }

        self.state = FormState::Validating;
        let errors = self.validate();
        if !errors.is_empty() {
            self.state = FormState::Error(AuthError::Validation(errors.clone()));
            return Err(SubmitBlocked::Invalid(errors));
        }

        self.attempt += 1;
        self.state = FormState::Submitting;

        Ok(Attempt {
            ticket: AttemptTicket(self.attempt),
            credentials: Credentials {
                username: self.username.trim().to_string(),
                password: SecretString::from(self.password.expose_secret().to_string()),
            },
        })
    }

    /// Applies the outcome of the attempt identified by `ticket`.
    ///
    /// Outcomes for an attempt that is no longer pending are ignored and leave
    /// `store` untouched.
    #[instrument(skip_all, fields(attempt = ticket.0))]
    pub fn finish(
        &mut self,
        ticket: AttemptTicket,
        outcome: AuthOutcome,
        store: &mut SessionStore,
    ) -> Completion {
        if !self.is_loading() || ticket.0 != self.attempt {
            debug!("dropping stale login response");
            return Completion::Stale;
        }

        self.state = match outcome {
            AuthOutcome::Authenticated(session) => match store.set(session) {
                Ok(()) => {
                    self.password = SecretString::default();
                    FormState::Success
                }
                Err(err) => {
                    error!("failed to store session: {err}");
                    FormState::Error(err.into())
                }
            },
            AuthOutcome::Rejected(reason) => FormState::Error(user_message(&reason)),
        };

        Completion::Applied
    }

    /// Runs a whole submission: validation, authentication and session storage.
    pub async fn submit(
        &mut self,
        validator: &CredentialValidator,
        store: &mut SessionStore,
    ) -> &FormState {
        if let Ok(attempt) = self.begin() {
            let outcome = validator.authenticate(&attempt.credentials).await;
            let completion = self.finish(attempt.ticket, outcome, store);
            debug_assert_eq!(completion, Completion::Applied);
        }
        &self.state
    }

    /// Leaves a pending attempt behind; its response will be ignored.
    pub fn abandon(&mut self) {
        if self.is_loading() {
            debug!("abandoning attempt {}", self.attempt);
            self.state = FormState::Idle;
        }
    }
}

/// Turns a rejection into text fit for the form.
fn user_message(reason: &RejectReason) -> AuthError {
    match reason {
        RejectReason::NotFound => AuthError::Authentication(MSG_NOT_FOUND.to_string()),
        RejectReason::BadPassword | RejectReason::Denied { message: None } => {
            AuthError::Authentication(MSG_INVALID_CREDENTIALS.to_string())
        }
        RejectReason::Denied {
            message: Some(message),
        } => AuthError::Authentication(message.clone()),
        RejectReason::NetworkError => AuthError::Network(MSG_NETWORK.to_string()),
        RejectReason::InvalidResponse => AuthError::Network(MSG_BAD_RESPONSE.to_string()),
    }
}
