use std::env;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

pub const DEFAULT_POLL_ID: &str = "wb-2026";
pub const DEFAULT_API_BASE_URL: &str = "http://localhost:1988";
pub const DEFAULT_USER_HASH: &str = "abcd123";
pub const DEFAULT_STORAGE_PATH: &str = "poll_storage.json";

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("{0} must not be empty")]
    Empty(&'static str),
    #[error("POLL_REFRESH_INTERVAL_SECS must be a whole number of seconds, got '{0}'")]
    InvalidInterval(String),
}

/// Everything the controller needs to know about which poll it talks to.
#[derive(Debug, Clone, PartialEq)]
pub struct PollConfig {
    pub poll_id: String,
    pub api_base_url: String,
    pub user_hash: String,
    pub storage_path: PathBuf,
    /// `None` disables the live results refresher.
    pub refresh_interval: Option<Duration>,
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            poll_id: DEFAULT_POLL_ID.to_string(),
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            user_hash: DEFAULT_USER_HASH.to_string(),
            storage_path: PathBuf::from(DEFAULT_STORAGE_PATH),
            refresh_interval: None,
        }
    }
}

impl PollConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let poll_id = lookup("POLL_ID").unwrap_or_else(|| DEFAULT_POLL_ID.to_string());
        if poll_id.trim().is_empty() {
            return Err(ConfigError::Empty("POLL_ID"));
        }

        let api_base_url = normalize_base_url(
            &lookup("POLL_API_BASE_URL").unwrap_or_else(|| DEFAULT_API_BASE_URL.to_string()),
        )?;

        let user_hash = lookup("POLL_USER_HASH").unwrap_or_else(|| DEFAULT_USER_HASH.to_string());

        let storage_path = lookup("POLL_STORAGE_PATH")
            .filter(|path| !path.trim().is_empty())
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_STORAGE_PATH));

        let refresh_interval = match lookup("POLL_REFRESH_INTERVAL_SECS") {
            Some(raw) if !raw.trim().is_empty() => {
                let secs = raw
                    .trim()
                    .parse::<u64>()
                    .map_err(|_| ConfigError::InvalidInterval(raw.clone()))?;
                // 0 means "off"
                (secs > 0).then(|| Duration::from_secs(secs))
            }
            _ => None,
        };

        Ok(Self {
            poll_id: poll_id.trim().to_string(),
            api_base_url,
            user_hash,
            storage_path,
            refresh_interval,
        })
    }
}

fn normalize_base_url(raw: &str) -> Result<String, ConfigError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(ConfigError::Empty("POLL_API_BASE_URL"));
    }
    Ok(trimmed.trim_end_matches('/').to_string())
}
