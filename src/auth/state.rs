//! Session state for the running client. The store owns the only mutable copy
//! of the session, hydrates it once from durable storage, and publishes
//! read-only snapshots to observers. Memory is updated only after durable
//! storage accepted the change, so both copies stay in step.

use crate::auth::{
    storage::{DurableStorage, StorageError},
    token,
    types::{Session, User},
};
use thiserror::Error;
use tokio::sync::watch;
use tracing::{debug, error, info, instrument, warn};

/// Durable key holding the raw token.
pub const TOKEN_KEY: &str = "token";
/// Durable key holding the serialized user record.
pub const USER_KEY: &str = "user";

#[derive(Debug, Error)]
enum HydrateError {
    #[error(transparent)]
    Storage(#[from] StorageError),
    #[error("corrupt session entry: {0}")]
    Corrupt(&'static str),
}

/// Holds the current session and its durable copy.
pub struct SessionStore {
    storage: Box<dyn DurableStorage>,
    current: watch::Sender<Option<Session>>,
}

impl SessionStore {
    /// Builds an empty store over `storage`. Call [`SessionStore::init`] to hydrate.
    pub fn new(storage: impl DurableStorage + 'static) -> Self {
        let (current, _) = watch::channel(None);
        Self {
            storage: Box::new(storage),
            current,
        }
    }

    /// Hydrates the in-memory session from durable storage.
    ///
    /// Missing or unreadable storage leaves the store empty. Corrupt entries are
    /// removed so the next start does not trip over them again.
    #[instrument(skip(self))]
    pub fn init(&mut self) -> Option<Session> {
        let hydrated = match self.load_durable() {
            Ok(session) => session,
            Err(HydrateError::Storage(err)) => {
                warn!("session storage unreadable, starting signed out: {err}");
                None
            }
            Err(err @ HydrateError::Corrupt(_)) => {
                warn!("discarding stored session: {err}");
                if let Err(err) = self.storage.remove_all(&[TOKEN_KEY, USER_KEY]) {
                    error!("failed to discard corrupt session: {err}");
                }
                None
            }
        };

        if let Some(session) = &hydrated {
            debug!(username = %session.user.username, "session hydrated");
        }
        self.current.send_replace(hydrated.clone());
        hydrated
    }

    fn load_durable(&self) -> Result<Option<Session>, HydrateError> {
        let token = self.read_entry(TOKEN_KEY)?;
        let user = self.read_entry(USER_KEY)?;

        let (token, user) = match (token, user) {
            (None, None) => return Ok(None),
            (Some(token), Some(user)) => (token, user),
            _ => return Err(HydrateError::Corrupt("incomplete token/user pair")),
        };

        let user: User =
            serde_json::from_str(&user).map_err(|_| HydrateError::Corrupt("user record"))?;
        let payload = token::decode(&token).map_err(|_| HydrateError::Corrupt("token"))?;
        if payload.user_id != user.id {
            return Err(HydrateError::Corrupt("token issued for another user"));
        }

        Ok(Some(Session { token, user }))
    }

    fn read_entry(&self, key: &str) -> Result<Option<String>, HydrateError> {
        self.storage.read(key).map_err(|err| match err {
            StorageError::Json(_) => HydrateError::Corrupt("storage file"),
            err => HydrateError::Storage(err),
        })
    }

    /// Persists `session` and makes it current.
    ///
    /// # Errors
    ///
    /// Returns an error if durable storage rejected the write; the previous
    /// session then remains current in both memory and storage.
    #[instrument(skip_all, fields(username = %session.user.username))]
    pub fn set(&mut self, session: Session) -> Result<(), StorageError> {
        let user = serde_json::to_string(&session.user)?;
        self.storage
            .write_all(&[(TOKEN_KEY, session.token.clone()), (USER_KEY, user)])?;

        self.current.send_replace(Some(session));
        info!("session stored");
        Ok(())
    }

    /// Returns a snapshot of the current session.
    #[must_use]
    pub fn get(&self) -> Option<Session> {
        self.current.borrow().clone()
    }

    /// Returns the current session if its token is still usable at `now`.
    ///
    /// A malformed or expired token signs the user out.
    pub fn active(&mut self, now: i64) -> Option<Session> {
        let session = self.get()?;
        match token::validate(&session.token, now) {
            Ok(_) => Some(session),
            Err(err) => {
                warn!(username = %session.user.username, "session expired: {err}");
                if let Err(err) = self.clear() {
                    error!("failed to clear expired session: {err}");
                }
                None
            }
        }
    }

    /// Removes the session from durable storage and memory.
    ///
    /// # Errors
    ///
    /// Returns an error if durable storage could not be updated; the session
    /// then stays current.
    #[instrument(skip(self))]
    pub fn clear(&mut self) -> Result<(), StorageError> {
        self.storage.remove_all(&[TOKEN_KEY, USER_KEY])?;
        if self.current.send_replace(None).is_some() {
            info!("session cleared");
        }
        Ok(())
    }

    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.current.borrow().is_some()
    }

    /// Read-only view of the session that follows every change.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<Option<Session>> {
        self.current.subscribe()
    }

    /// Releases the store at shutdown. Durable storage is left as is so the
    /// next start can hydrate from it.
    pub fn teardown(self) {
        self.current.send_replace(None);
        debug!("session store torn down");
    }
}
