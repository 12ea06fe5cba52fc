//! Command-line arguments.

use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use vocab_core::Direction;

use crate::credentials::Credentials;

/// Vocabulary drills in the terminal
#[derive(Parser, Debug)]
#[command(name = "vocab-drill")]
#[command(about = "Vocabulary drills in the terminal")]
#[command(version)]
pub struct Args {
    /// Vocabulary server URL
    #[arg(long, default_value = "http://localhost:3000", env = "VOCAB_SERVER_URL")]
    pub server: String,

    /// Drill from a local SQLite database instead of the server
    #[arg(long, value_name = "DB")]
    pub offline: Option<PathBuf>,

    /// Load a JSON array of words into the local database
    #[arg(long, value_name = "JSON", requires = "offline")]
    pub import: Option<PathBuf>,

    /// Prompt with the target word and expect the source word
    #[arg(long)]
    pub reverse: bool,

    /// Seconds a round may run before it is abandoned
    #[arg(long, value_name = "SECS")]
    pub time_limit: Option<u64>,

    /// Credentials file [default: <config dir>/vocab-drill/credentials.json]
    #[arg(long, env = "VOCAB_CREDENTIALS")]
    pub credentials: Option<PathBuf>,

    /// Revoke the saved token and forget it
    #[arg(long, conflicts_with = "offline")]
    pub logout: bool,
}

impl Args {
    pub fn credentials_path(&self) -> PathBuf {
        self.credentials
            .clone()
            .unwrap_or_else(Credentials::default_path)
    }

    pub fn direction(&self) -> Direction {
        if self.reverse {
            Direction::TargetToSource
        } else {
            Direction::SourceToTarget
        }
    }

    pub fn time_limit(&self) -> Option<Duration> {
        self.time_limit.map(Duration::from_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_defaults() {
        let args = Args::try_parse_from(["vocab-drill"]).unwrap();
        assert_eq!(args.direction(), Direction::SourceToTarget);
        assert_eq!(args.time_limit(), None);
        assert!(args.offline.is_none());
    }

    #[test]
    fn test_offline_with_import() {
        let args = Args::try_parse_from([
            "vocab-drill",
            "--offline",
            "words.db",
            "--import",
            "words.json",
            "--reverse",
            "--time-limit",
            "90",
        ])
        .unwrap();
        assert_eq!(args.offline, Some(PathBuf::from("words.db")));
        assert_eq!(args.direction(), Direction::TargetToSource);
        assert_eq!(args.time_limit(), Some(Duration::from_secs(90)));
    }

    #[test]
    fn test_import_requires_offline() {
        assert!(Args::try_parse_from(["vocab-drill", "--import", "words.json"]).is_err());
    }

    #[test]
    fn test_logout_conflicts_with_offline() {
        assert!(Args::try_parse_from(["vocab-drill", "--offline", "w.db", "--logout"]).is_err());
    }

    #[test]
    fn test_explicit_credentials_path() {
        let args =
            Args::try_parse_from(["vocab-drill", "--credentials", "/tmp/creds.json"]).unwrap();
        assert_eq!(args.credentials_path(), PathBuf::from("/tmp/creds.json"));
    }
}
