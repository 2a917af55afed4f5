//! Environment-driven settings shared by the `cli` and `http` binaries.
//!
//! | Variable                   | Default               |
//! |----------------------------|-----------------------|
//! | `STUDY_SCHEDULE_DB`        | `study_schedule.db`   |
//! | `STUDY_SCHEDULE_HTTP_ADDR` | `0.0.0.0:3000`        |
//! | `RUST_LOG`                 | `study_schedule=info` |
//!
//! A `.env` file in the working directory is loaded first when present.

use std::net::SocketAddr;
use std::path::PathBuf;
use thiserror::Error;

pub const DB_PATH_VAR: &str = "STUDY_SCHEDULE_DB";
pub const HTTP_ADDR_VAR: &str = "STUDY_SCHEDULE_HTTP_ADDR";
pub const LOG_FILTER_VAR: &str = "RUST_LOG";

pub const DEFAULT_DB_PATH: &str = "study_schedule.db";
pub const DEFAULT_HTTP_ADDR: &str = "0.0.0.0:3000";
pub const DEFAULT_LOG_FILTER: &str = "study_schedule=info";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{var} must be a socket address like 127.0.0.1:3000 (got '{value}')")]
    InvalidAddr { var: &'static str, value: String },
    #[error("{0} must not be empty")]
    Empty(&'static str),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub database_path: PathBuf,
    pub http_addr: SocketAddr,
    pub log_filter: String,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let database_path = match lookup(DB_PATH_VAR) {
            Some(value) if value.trim().is_empty() => return Err(ConfigError::Empty(DB_PATH_VAR)),
            Some(value) => PathBuf::from(value.trim()),
            None => PathBuf::from(DEFAULT_DB_PATH),
        };

        let raw_addr = lookup(HTTP_ADDR_VAR).unwrap_or_else(|| DEFAULT_HTTP_ADDR.to_string());
        let http_addr = raw_addr
            .trim()
            .parse()
            .map_err(|_| ConfigError::InvalidAddr {
                var: HTTP_ADDR_VAR,
                value: raw_addr.clone(),
            })?;

        let log_filter = lookup(LOG_FILTER_VAR)
            .filter(|value| !value.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_LOG_FILTER.to_string());

        Ok(Self {
            database_path,
            http_addr,
            log_filter,
        })
    }
}
