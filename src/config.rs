//! Relay configuration from the environment.
//!
//! Every value has a default so a bare `cargo run` serves on port 3000. A
//! malformed numeric value falls back to its default rather than aborting.

#[cfg(test)]
#[path = "config_test.rs"]
mod config_test;

use std::path::PathBuf;

const DEFAULT_PORT: u16 = 3000;
const DEFAULT_CONTENT_DIR: &str = "data";
const DEFAULT_CLIENT_CHANNEL_CAPACITY: usize = 256;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("CLIENT_CHANNEL_CAPACITY must be at least 1")]
    ZeroCapacity,
    #[error("INGEST_TOKEN is set but empty")]
    EmptyToken,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    /// Shared secret for `POST /api/coordinates`. `None` rejects every ingest.
    pub ingest_token: Option<String>,
    pub content_dir: PathBuf,
    /// Outbound queue depth per connection.
    pub client_channel_capacity: usize,
}

impl Config {
    /// Read configuration from process environment variables.
    ///
    /// # Errors
    ///
    /// See [`Config::from_lookup`].
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary key lookup.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::ZeroCapacity`] for a zero channel capacity and
    /// [`ConfigError::EmptyToken`] for an empty ingest token.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let client_channel_capacity =
            env_parse(&lookup, "CLIENT_CHANNEL_CAPACITY", DEFAULT_CLIENT_CHANNEL_CAPACITY);
        if client_channel_capacity == 0 {
            return Err(ConfigError::ZeroCapacity);
        }

        let ingest_token = lookup("INGEST_TOKEN");
        if ingest_token.as_deref() == Some("") {
            return Err(ConfigError::EmptyToken);
        }

        Ok(Self {
            port: env_parse(&lookup, "PORT", DEFAULT_PORT),
            ingest_token,
            content_dir: lookup("CONTENT_DIR").map_or_else(|| PathBuf::from(DEFAULT_CONTENT_DIR), PathBuf::from),
            client_channel_capacity,
        })
    }
}

fn env_parse<T>(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: T) -> T
where
    T: std::str::FromStr + Copy,
{
    lookup(key).and_then(|v| v.parse::<T>().ok()).unwrap_or(default)
}
