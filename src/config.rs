use std::{env, path::PathBuf};

use crate::error::ConfigError;

pub const DEFAULT_USERS_FILE: &str = "./config/users.json";
pub const DEFAULT_LOG_FILTER: &str = "info";

#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub users_file: PathBuf,
}

/// Logger filter, resolved apart from [`Config`] so the logger is up before
/// the rest of the configuration can fail.
pub fn log_filter(lookup: impl Fn(&str) -> Option<String>) -> String {
    lookup("RUST_LOG").unwrap_or_else(|| DEFAULT_LOG_FILTER.to_owned())
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let port = match lookup("PORT") {
            Some(p) => p.trim().parse().map_err(|_| ConfigError::InvalidPort(p))?,
            None => 8000,
        };

        Ok(Config {
            host: lookup("HOST").unwrap_or_else(|| "0.0.0.0".to_owned()),
            port,
            users_file: lookup("USERS_FILE")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_USERS_FILE)),
        })
    }
}
