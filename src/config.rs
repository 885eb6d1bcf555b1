use crate::status::DEFAULT_DEADLINE;
use chrono::NaiveTime;
use std::{env, path::PathBuf, time::Duration};
use thiserror::Error;

const DEFAULT_PORT: u16 = 8080;
const DEFAULT_DATA_PATH: &str = "data/state.json";
const DEFAULT_REMOTE_TIMEOUT_SECS: u64 = 10;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("RECLAIM_DEADLINE must look like HH:MM, got {0:?}")]
    InvalidDeadline(String),
}

/// Runtime settings, read from the environment once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub data_path: PathBuf,
    pub remote_url: Option<String>,
    pub remote_timeout: Duration,
    pub deadline: NaiveTime,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let port = lookup("PORT")
            .and_then(|value| value.parse::<u16>().ok())
            .unwrap_or(DEFAULT_PORT);

        let data_path = lookup("APP_DATA_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_DATA_PATH));

        let remote_url = lookup("RECLAIM_REMOTE_URL")
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty());

        let remote_timeout = lookup("RECLAIM_REMOTE_TIMEOUT_SECS")
            .and_then(|value| value.parse::<u64>().ok())
            .map(Duration::from_secs)
            .unwrap_or(Duration::from_secs(DEFAULT_REMOTE_TIMEOUT_SECS));

        let deadline = match lookup("RECLAIM_DEADLINE") {
            Some(value) => NaiveTime::parse_from_str(value.trim(), "%H:%M")
                .map_err(|_| ConfigError::InvalidDeadline(value))?,
            None => DEFAULT_DEADLINE,
        };

        Ok(Self {
            port,
            data_path,
            remote_url,
            remote_timeout,
            deadline,
        })
    }
}
