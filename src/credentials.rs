//! BCCh API credentials stored in a local JSON file
//!
//! The API has no login flow; user and password travel as query parameters on
//! every request, so they are saved once with `set-credentials` and loaded by
//! each command.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Default credentials file, relative to the working directory
pub const DEFAULT_CREDENTIALS_FILE: &str = ".bcch_credentials";

/// Errors that can occur when loading or saving credentials
#[derive(Debug, Error)]
pub enum CredentialsError {
    /// No credentials file exists yet
    #[error("no credentials saved at {0}, use 'set-credentials' to save them")]
    NotFound(PathBuf),

    /// Reading or writing the file failed
    #[error("credentials file error: {0}")]
    Io(#[from] io::Error),

    /// The file is not valid credentials JSON
    #[error("invalid credentials file: {0}")]
    Parse(#[from] serde_json::Error),
}

/// User and password for the BCCh statistics API
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credentials {
    pub user: String,
    pub password: String,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("user", &self.user)
            .field("password", &"***")
            .finish()
    }
}

impl Credentials {
    pub fn new(user: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            user: user.into(),
            password: password.into(),
        }
    }

    /// Whether both user and password are set
    pub fn is_complete(&self) -> bool {
        !self.user.is_empty() && !self.password.is_empty()
    }

    /// Loads credentials from `path`
    ///
    /// # Returns
    /// * `Ok(Credentials)` if the file exists and parses
    /// * `Err(CredentialsError::NotFound)` if the file does not exist
    pub fn load(path: &Path) -> Result<Self, CredentialsError> {
        let content = match fs::read_to_string(path) {
            Ok(content) => content,
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                return Err(CredentialsError::NotFound(path.to_path_buf()));
            }
            Err(err) => return Err(err.into()),
        };
        Ok(serde_json::from_str(&content)?)
    }

    /// Writes credentials to `path` as pretty JSON, creating parent directories
    pub fn save(&self, path: &Path) -> Result<(), CredentialsError> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_save_then_load_round_trips() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let path = temp_dir.path().join(DEFAULT_CREDENTIALS_FILE);
        let credentials = Credentials::new("user@example.com", "secret");

        credentials.save(&path).expect("Save should succeed");
        let loaded = Credentials::load(&path).expect("Load should succeed");

        assert_eq!(loaded, credentials);
    }

    #[test]
    fn test_saved_file_uses_json_field_names() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("creds.json");

        Credentials::new("me", "pw").save(&path).unwrap();

        let content = fs::read_to_string(&path).unwrap();
        assert!(content.contains("\"user\": \"me\""));
        assert!(content.contains("\"password\": \"pw\""));
    }

    #[test]
    fn test_load_missing_file_reports_not_found() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("missing");

        let err = Credentials::load(&path).unwrap_err();

        assert!(matches!(err, CredentialsError::NotFound(_)));
        assert!(err.to_string().contains("set-credentials"));
    }

    #[test]
    fn test_load_invalid_json_reports_parse_error() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("creds.json");
        fs::write(&path, "not json").unwrap();

        let err = Credentials::load(&path).unwrap_err();

        assert!(matches!(err, CredentialsError::Parse(_)));
    }

    #[test]
    fn test_save_creates_parent_directories() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("nested").join("dir").join("creds.json");

        Credentials::new("a", "b").save(&path).expect("Save should succeed");

        assert!(path.exists());
    }

    #[test]
    fn test_is_complete() {
        assert!(Credentials::new("a", "b").is_complete());
        assert!(!Credentials::new("", "b").is_complete());
        assert!(!Credentials::new("a", "").is_complete());
        assert!(!Credentials::default().is_complete());
    }

    #[test]
    fn test_debug_redacts_password() {
        let debug = format!("{:?}", Credentials::new("someone", "hunter2"));

        assert!(debug.contains("someone"));
        assert!(!debug.contains("hunter2"));
    }
}
