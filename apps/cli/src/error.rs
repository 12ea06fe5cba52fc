//! Client error types.

use thiserror::Error;
use vocab_core::DrillError;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("Backend error: {status} - {message}")]
    Backend { status: u16, message: String },

    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("file system error: {0}")]
    FileSystem(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error(transparent)]
    Drill(#[from] DrillError),
}

impl From<reqwest::Error> for ClientError {
    fn from(err: reqwest::Error) -> Self {
        ClientError::Network(err.to_string())
    }
}

impl From<serde_json::Error> for ClientError {
    fn from(err: serde_json::Error) -> Self {
        ClientError::Parse(err.to_string())
    }
}

impl From<ClientError> for DrillError {
    fn from(err: ClientError) -> Self {
        match err {
            ClientError::Drill(inner) => inner,
            ClientError::Backend { status: 400, message } => DrillError::InvalidInput(message),
            ClientError::Backend { status: 401, message } => {
                DrillError::Unavailable(format!("not authorized, log in again: {message}"))
            }
            other => DrillError::Unavailable(other.to_string()),
        }
    }
}

pub type Result<T> = std::result::Result<T, ClientError>;
