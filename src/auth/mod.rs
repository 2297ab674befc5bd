//! Staff authentication and session handling.
//!
//! Flow Overview: the login form validates its fields and asks the credential
//! validator for a session, either from the local directory or from the remote
//! staff API. A successful session is handed to the session store, which keeps
//! it in memory and in durable storage until logout or expiry. Protected
//! actions ask the policy module whether the stored role ranks high enough.
//!
//! Passwords and token material must never reach logs.

pub mod client;
pub mod directory;
pub mod errors;
pub mod login;
pub mod policy;
pub mod state;
pub mod storage;
pub mod token;
pub mod types;
pub mod validator;

pub use client::RemoteAuthority;
pub use directory::Directory;
pub use errors::{AuthError, ConfigError, Field, FieldError, FieldErrors};
pub use login::{FormState, LoginForm};
pub use state::SessionStore;
pub use storage::{DurableStorage, FileStorage, MemoryStorage, StorageError};
pub use token::TokenError;
pub use types::{Credentials, Role, Session, UnknownRole, User};
pub use validator::{AuthOutcome, CredentialValidator, RejectReason};
