use crate::auth::{
    errors::ConfigError, CredentialValidator, Directory, FileStorage, RemoteAuthority,
    SessionStore,
};
use std::{path::PathBuf, time::Duration};

/// Where credentials are checked.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthMode {
    Local,
    Remote,
}

#[derive(Debug, Clone)]
pub struct GlobalArgs {
    pub mode: AuthMode,
    pub api_url: Option<String>,
    pub timeout: Option<Duration>,
    pub storage_dir: PathBuf,
    pub directory: Option<PathBuf>,
}

impl GlobalArgs {
    #[must_use]
    pub fn new(storage_dir: impl Into<PathBuf>) -> Self {
        Self {
            mode: AuthMode::Local,
            api_url: None,
            timeout: None,
            storage_dir: storage_dir.into(),
            directory: None,
        }
    }

    /// Session store backed by the configured storage directory, not yet hydrated.
    #[must_use]
    pub fn session_store(&self) -> SessionStore {
        SessionStore::new(FileStorage::new(&self.storage_dir))
    }

    /// Builds the credential validator for the configured mode.
    ///
    /// # Errors
    ///
    /// Returns an error if remote mode lacks a usable API URL, or the local
    /// directory file cannot be loaded.
    pub fn validator(&self) -> Result<CredentialValidator, ConfigError> {
        match self.mode {
            AuthMode::Local => {
                let directory = match &self.directory {
                    Some(path) => Directory::from_json_file(path)?,
                    None => Directory::builtin(),
                };
                Ok(CredentialValidator::Local(directory))
            }
            AuthMode::Remote => {
                let api_url = self.api_url.as_deref().ok_or(ConfigError::Missing("api url"))?;
                Ok(CredentialValidator::Remote(RemoteAuthority::new(
                    api_url,
                    self.timeout,
                )?))
            }
        }
    }
}

/// Trims a configured value and treats blanks as unset.
#[must_use]
pub fn normalize_value(value: &str) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_global_args() {
        let args = GlobalArgs::new(".shiftgate");
        assert_eq!(args.mode, AuthMode::Local);
        assert_eq!(args.storage_dir, PathBuf::from(".shiftgate"));
        assert!(matches!(args.validator(), Ok(CredentialValidator::Local(_))));
    }

    #[test]
    fn remote_mode_requires_api_url() {
        let mut args = GlobalArgs::new(".shiftgate");
        args.mode = AuthMode::Remote;
        assert!(matches!(args.validator(), Err(ConfigError::Missing(_))));

        args.api_url = Some("http://localhost:3000".to_string());
        assert!(matches!(args.validator(), Ok(CredentialValidator::Remote(_))));
    }

    #[test]
    fn missing_directory_file_is_a_config_error() {
        let mut args = GlobalArgs::new(".shiftgate");
        args.directory = Some(PathBuf::from("/nonexistent/shiftgate/users.json"));
        assert!(matches!(args.validator(), Err(ConfigError::Io(_))));
    }

    #[test]
    fn normalize_value_trims_and_rejects_empty() {
        assert_eq!(normalize_value(""), None);
        assert_eq!(normalize_value("   "), None);
        assert_eq!(
            normalize_value("  http://localhost:3000 "),
            Some("http://localhost:3000".to_string())
        );
    }
}
