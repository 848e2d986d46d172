//! Configuration management for the daemon.

use std::env;
use std::time::Duration;

/// Daemon configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// Local API host address
    pub host: String,
    /// Local API port
    pub port: u16,
    /// Base URL of the remote document store; in-memory store when unset
    pub remote_url: Option<String>,
    /// Collection path segment on the remote store
    pub remote_collection: String,
    /// Per-request timeout for the remote store
    pub remote_timeout: Duration,
    /// Connectivity state assumed before the platform reports anything
    pub start_online: bool,
    /// Gateway prefix used to build playable audio URLs
    pub audio_gateway_url: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 4100,
            remote_url: None,
            remote_collection: "generations".to_string(),
            remote_timeout: Duration::from_millis(10_000),
            start_online: true,
            audio_gateway_url: None,
        }
    }
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let host = lookup("HOST").unwrap_or(defaults.host);

        let port = match lookup("PORT") {
            Some(value) => value.parse().map_err(|_| ConfigError::InvalidPort)?,
            None => defaults.port,
        };

        let remote_url = lookup("REMOTE_URL").filter(|url| !url.trim().is_empty());
        if let Some(url) = &remote_url {
            if !(url.starts_with("http://") || url.starts_with("https://")) {
                return Err(ConfigError::InvalidRemoteUrl(url.clone()));
            }
        }

        let remote_collection = lookup("REMOTE_COLLECTION").unwrap_or(defaults.remote_collection);

        let remote_timeout = match lookup("REMOTE_TIMEOUT_MS") {
            Some(value) => Duration::from_millis(
                value
                    .parse()
                    .map_err(|_| ConfigError::InvalidNumber("REMOTE_TIMEOUT_MS"))?,
            ),
            None => defaults.remote_timeout,
        };

        let start_online = match lookup("START_ONLINE") {
            Some(value) => parse_bool(&value).ok_or(ConfigError::InvalidBool("START_ONLINE"))?,
            None => defaults.start_online,
        };

        let audio_gateway_url = lookup("AUDIO_GATEWAY_URL").filter(|url| !url.trim().is_empty());

        Ok(Self {
            host,
            port,
            remote_url,
            remote_collection,
            remote_timeout,
            start_online,
            audio_gateway_url,
        })
    }

    /// Address the local API binds to.
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Playable URL for a record's audio reference, if a gateway is set.
    pub fn audio_url(&self, audio_path: &str) -> Option<String> {
        self.audio_gateway_url.as_ref().map(|gateway| {
            format!(
                "{}/{}",
                gateway.trim_end_matches('/'),
                audio_path.trim_start_matches('/')
            )
        })
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid PORT value")]
    InvalidPort,

    #[error("REMOTE_URL must be an http(s) URL, got '{0}'")]
    InvalidRemoteUrl(String),

    #[error("Invalid number for {0}")]
    InvalidNumber(&'static str),

    #[error("Invalid boolean for {0}")]
    InvalidBool(&'static str),
}
