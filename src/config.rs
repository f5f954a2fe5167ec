//! Runtime configuration
//!
//! Values come from `FPLHELP_*` environment variables (a `.env` file in the
//! working directory is loaded first) and can be overridden on the command
//! line. Anything unset falls back to the defaults below.

use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use thiserror::Error;

/// Errors that can occur while reading configuration
#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    /// An environment variable holds a value that cannot be parsed
    #[error("Invalid value for {name}: '{value}'")]
    InvalidValue { name: String, value: String },
}

/// Application configuration
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// Backend base URL
    pub base_url: String,
    /// Fixed path prefix of the REST API
    pub api_prefix: String,
    /// Append `/` to endpoint URLs; the backend router is slash-less by default
    pub trailing_slash: bool,
    /// Hard timeout per request attempt
    pub timeout: Duration,
    /// Total attempts for transient failures
    pub retry_attempts: u32,
    /// Delay unit for linear backoff between attempts
    pub retry_base_delay: Duration,
    /// TTL for cache entries stored without an explicit TTL
    pub cache_ttl: Duration,
    /// Maximum simultaneous in-flight requests
    pub max_concurrent: usize,
    /// Token for the backend's authenticated endpoints
    pub api_token: Option<String>,
    /// File receiving log output; logging is discarded when unset
    pub log_file: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8000".to_string(),
            api_prefix: "/api/v2".to_string(),
            trailing_slash: false,
            timeout: Duration::from_secs(30),
            retry_attempts: 3,
            retry_base_delay: Duration::from_millis(1000),
            cache_ttl: Duration::from_secs(300),
            max_concurrent: 4,
            api_token: None,
            log_file: None,
        }
    }
}

impl Config {
    /// Reads configuration from the process environment
    pub fn from_env() -> Result<Self, ConfigError> {
        // A missing .env file is fine
        let _ = dotenvy::dotenv();
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Reads configuration through a variable lookup function
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Config::default();
        let get = |name: &str| lookup(name).filter(|value| !value.trim().is_empty());

        if let Some(url) = get("FPLHELP_BASE_URL") {
            config.base_url = url;
        }
        if let Some(prefix) = get("FPLHELP_API_PREFIX") {
            config.api_prefix = prefix;
        }
        if let Some(enabled) = parse::<bool>("FPLHELP_TRAILING_SLASH", get("FPLHELP_TRAILING_SLASH"))? {
            config.trailing_slash = enabled;
        }
        if let Some(ms) = parse::<u64>("FPLHELP_TIMEOUT_MS", get("FPLHELP_TIMEOUT_MS"))? {
            config.timeout = Duration::from_millis(ms);
        }
        if let Some(attempts) = parse::<u32>("FPLHELP_RETRY_ATTEMPTS", get("FPLHELP_RETRY_ATTEMPTS"))? {
            config.retry_attempts = attempts;
        }
        if let Some(ms) = parse::<u64>("FPLHELP_RETRY_DELAY_MS", get("FPLHELP_RETRY_DELAY_MS"))? {
            config.retry_base_delay = Duration::from_millis(ms);
        }
        if let Some(secs) = parse::<u64>("FPLHELP_CACHE_TTL_SECS", get("FPLHELP_CACHE_TTL_SECS"))? {
            config.cache_ttl = Duration::from_secs(secs);
        }
        if let Some(limit) = parse::<usize>("FPLHELP_MAX_CONCURRENT", get("FPLHELP_MAX_CONCURRENT"))? {
            config.max_concurrent = limit;
        }
        config.api_token = get("FPLHELP_API_TOKEN");
        config.log_file = get("FPLHELP_LOG").map(PathBuf::from);

        Ok(config)
    }
}

fn parse<T: FromStr>(name: &str, value: Option<String>) -> Result<Option<T>, ConfigError> {
    match value {
        None => Ok(None),
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .map(Some)
            .map_err(|_| ConfigError::InvalidValue {
                name: name.to_string(),
                value: raw,
            }),
    }
}
