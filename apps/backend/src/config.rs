//! Server configuration read from the environment.

use std::path::PathBuf;

use chrono::Duration;

use crate::error::{ApiError, Result};

const DEFAULT_HOST: &str = "0.0.0.0";
const DEFAULT_PORT: u16 = 3000;
const DEFAULT_TOKEN_TTL_SECS: i64 = 86_400;
const MIN_BCRYPT_COST: u32 = 4;
const MAX_BCRYPT_COST: u32 = 31;

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub host: String,
    pub port: u16,
    /// How long a freshly issued bearer token stays valid.
    pub token_ttl: Duration,
    /// bcrypt work factor for learner passwords.
    pub password_cost: u32,
    /// JSON file of words loaded into the catalog at startup.
    pub catalog_seed: Option<PathBuf>,
}

impl Config {
    /// Load from process environment (after `.env`, if any, has been applied).
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let database_url = lookup("DATABASE_URL")
            .filter(|v| !v.is_empty())
            .ok_or_else(|| ApiError::Config("DATABASE_URL must be set".to_string()))?;

        let host = lookup("HOST").unwrap_or_else(|| DEFAULT_HOST.to_string());

        let port = match lookup("PORT") {
            Some(raw) => raw
                .parse::<u16>()
                .map_err(|_| ApiError::Config(format!("invalid PORT: {raw}")))?,
            None => DEFAULT_PORT,
        };

        let ttl_secs = match lookup("TOKEN_TTL_SECS") {
            Some(raw) => raw
                .parse::<i64>()
                .ok()
                .filter(|secs| *secs > 0)
                .ok_or_else(|| ApiError::Config(format!("invalid TOKEN_TTL_SECS: {raw}")))?,
            None => DEFAULT_TOKEN_TTL_SECS,
        };

        let password_cost = match lookup("BCRYPT_COST") {
            Some(raw) => raw
                .parse::<u32>()
                .ok()
                .filter(|cost| (MIN_BCRYPT_COST..=MAX_BCRYPT_COST).contains(cost))
                .ok_or_else(|| ApiError::Config(format!("invalid BCRYPT_COST: {raw}")))?,
            None => bcrypt::DEFAULT_COST,
        };

        Ok(Self {
            database_url,
            host,
            port,
            token_ttl: Duration::seconds(ttl_secs),
            password_cost,
            catalog_seed: lookup("CATALOG_SEED")
                .filter(|v| !v.is_empty())
                .map(PathBuf::from),
        })
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
