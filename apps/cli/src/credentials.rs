//! Learner credentials persisted between runs.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use vocab_core::LearnerId;

use crate::error::Result;

const APP_DIR: &str = "vocab-drill";
const FILE_NAME: &str = "credentials.json";

/// Token issued by the server at registration or login.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credentials {
    pub server_url: String,
    pub learner_id: LearnerId,
    /// Account to log back in to once the token expires.
    #[serde(default)]
    pub email: String,
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

impl Credentials {
    /// `<config dir>/vocab-drill/credentials.json`, or the working directory
    /// when the platform has no config dir.
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .map(|dir| dir.join(APP_DIR))
            .unwrap_or_default()
            .join(FILE_NAME)
    }

    /// Read saved credentials. A missing file is not an error.
    pub fn load(path: &Path) -> Result<Option<Self>> {
        if !path.exists() {
            return Ok(None);
        }
        let raw = fs::read_to_string(path)?;
        Ok(Some(serde_json::from_str(&raw)?))
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, serde_json::to_string_pretty(self)?)?;
        Ok(())
    }

    pub fn remove(path: &Path) -> Result<()> {
        if path.exists() {
            fs::remove_file(path)?;
        }
        Ok(())
    }

    /// Issued by `server_url`, whether or not the token is still usable.
    pub fn is_for_server(&self, server_url: &str) -> bool {
        self.server_url.trim_end_matches('/') == server_url.trim_end_matches('/')
    }

    /// Usable against `server_url` at `now`.
    pub fn is_valid_for(&self, server_url: &str, now: DateTime<Utc>) -> bool {
        self.is_for_server(server_url) && self.expires_at > now
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use pretty_assertions::assert_eq;

    fn sample() -> Credentials {
        Credentials {
            server_url: "http://localhost:3000".to_string(),
            learner_id: LearnerId::new_v4(),
            email: "anna@example.com".to_string(),
            token: "token".to_string(),
            expires_at: Utc::now() + Duration::hours(1),
        }
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join(FILE_NAME);
        let credentials = sample();

        credentials.save(&path).unwrap();
        assert_eq!(Credentials::load(&path).unwrap(), Some(credentials));

        Credentials::remove(&path).unwrap();
        assert_eq!(Credentials::load(&path).unwrap(), None);
    }

    #[test]
    fn test_load_corrupt_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(FILE_NAME);
        fs::write(&path, "{not json").unwrap();
        assert!(Credentials::load(&path).is_err());
    }

    #[test]
    fn test_validity() {
        let credentials = sample();
        let now = Utc::now();
        assert!(credentials.is_valid_for("http://localhost:3000/", now));
        assert!(!credentials.is_valid_for("http://example.com", now));
        assert!(!credentials.is_valid_for("http://localhost:3000", now + Duration::hours(2)));
    }

    #[test]
    fn test_expired_still_for_server() {
        let credentials = sample();
        let later = Utc::now() + Duration::hours(2);
        assert!(credentials.is_for_server("http://localhost:3000/"));
        assert!(!credentials.is_valid_for("http://localhost:3000", later));
    }

    #[test]
    fn test_file_without_email_loads() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(FILE_NAME);
        let json = serde_json::json!({
            "server_url": "http://localhost:3000",
            "learner_id": LearnerId::new_v4(),
            "token": "token",
            "expires_at": Utc::now(),
        });
        fs::write(&path, json.to_string()).unwrap();

        let loaded = Credentials::load(&path).unwrap().unwrap();
        assert_eq!(loaded.email, "");
    }

    #[test]
    fn test_default_path_file_name() {
        assert!(Credentials::default_path().ends_with(FILE_NAME));
    }
}
