//! Credential file storage.
//!
//! Provides read-only loading of login credentials from
//! `~/.config/colloquy/secret.json`, with environment variables as a
//! fallback. Token issuance happens elsewhere (an external login flow writes
//! the file); this module only reads it.
//!
//! # Security Note
//!
//! The secret.json file is plaintext and should carry restrictive file
//! permissions (e.g. 600).

use colloquy_core::user::Credentials;
use colloquy_core::{ChatError, Result};
use std::path::PathBuf;

/// Environment variable holding the numeric backend user id.
pub const USER_ID_ENV: &str = "COLLOQUY_USER_ID";
/// Environment variable holding the bearer token.
pub const TOKEN_ENV: &str = "COLLOQUY_TOKEN";

/// Read-only storage for the credential file (secret.json).
pub struct CredentialStore {
    path: PathBuf,
}

impl CredentialStore {
    /// Creates a store pointing at the default path
    /// (`~/.config/colloquy/secret.json`).
    pub fn new() -> Result<Self> {
        let path = dirs::config_dir()
            .map(|dir| dir.join("colloquy").join("secret.json"))
            .ok_or_else(|| ChatError::config("could not determine config directory"))?;
        Ok(Self { path })
    }

    /// Creates a store with a custom path (for testing).
    pub fn with_path(path: PathBuf) -> Self {
        Self { path }
    }

    /// Loads credentials from the JSON file.
    ///
    /// # Returns
    ///
    /// - `Ok(Credentials)`: successfully loaded and parsed
    /// - `Err(ChatError::Config)`: file missing or unreadable
    /// - `Err(ChatError::Serialization)`: invalid JSON
    pub fn load(&self) -> Result<Credentials> {
        if !self.path.exists() {
            return Err(ChatError::config(format!(
                "credential file not found at {}",
                self.path.display()
            )));
        }

        let content = std::fs::read_to_string(&self.path)?;
        let credentials = serde_json::from_str(&content)?;
        Ok(credentials)
    }

    /// Loads credentials from the file, falling back to the environment.
    ///
    /// Returns `None` when neither source yields a usable user; callers then
    /// operate unauthenticated and sends short-circuit with a log-in notice.
    pub fn resolve(&self) -> Option<Credentials> {
        match self.load() {
            Ok(credentials) => Some(credentials),
            Err(err) => {
                tracing::debug!(%err, "credential file unusable, trying environment");
                credentials_from_env()
            }
        }
    }

    /// Returns the path to the credential file.
    pub fn path(&self) -> &PathBuf {
        &self.path
    }
}

/// Builds credentials from `COLLOQUY_USER_ID` / `COLLOQUY_TOKEN`.
pub fn credentials_from_env() -> Option<Credentials> {
    let user_id: i64 = std::env::var(USER_ID_ENV).ok()?.trim().parse().ok()?;
    let mut credentials = Credentials::new(user_id);
    if let Ok(token) = std::env::var(TOKEN_ENV) {
        if !token.is_empty() {
            credentials = credentials.with_token(token);
        }
    }
    Some(credentials)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn loads_credentials_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{"userId": 42, "token": "jwt-token", "nickname": "Ada"}}"#
        )
        .unwrap();

        let store = CredentialStore::with_path(file.path().to_path_buf());
        let credentials = store.load().unwrap();
        assert_eq!(credentials.user_id, 42);
        assert_eq!(credentials.token.as_deref(), Some("jwt-token"));
        assert_eq!(credentials.nickname, "Ada");
    }

    #[test]
    fn missing_file_is_a_config_error() {
        let dir = tempfile::tempdir().unwrap();
        let store = CredentialStore::with_path(dir.path().join("absent.json"));
        let err = store.load().unwrap_err();
        assert!(matches!(err, ChatError::Config(_)));
    }

    #[test]
    fn invalid_json_is_a_serialization_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "{{not json").unwrap();

        let store = CredentialStore::with_path(file.path().to_path_buf());
        let err = store.load().unwrap_err();
        assert!(matches!(err, ChatError::Serialization { .. }));
    }
}
