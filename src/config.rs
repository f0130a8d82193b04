use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use std::time::Duration;

use backoff::{ExponentialBackoff, ExponentialBackoffBuilder};

use crate::error::{Error, Result};

static DATA_DIR: OnceLock<PathBuf> = OnceLock::new();

/// Name of the environment variable holding the YouTube Data API key
pub const API_KEY_VAR: &str = "YOUTUBE_API_KEY";

/// Result count used when the requested count cannot be parsed
pub const DEFAULT_RESULT_COUNT: usize = 30;

const YOUTUBE_API_BASE_URL: &str = "https://www.googleapis.com";

/// Get the base data directory (~/.yt-reaction/)
pub fn data_dir() -> &'static PathBuf {
    DATA_DIR.get_or_init(|| {
        std::env::var("YT_REACTION_DATA_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| {
                dirs::home_dir()
                    .unwrap_or_else(|| PathBuf::from("."))
                    .join(".yt-reaction")
            })
    })
}

/// Get the .env file path
pub fn env_file_path() -> PathBuf {
    data_dir().join(".env")
}

/// Load environment variables from the data directory's .env file
pub fn load_env() {
    let env_path = env_file_path();
    if env_path.exists() {
        let _ = dotenvy::from_path(&env_path);
    } else {
        // Try current directory as fallback
        let _ = dotenvy::dotenv();
    }
}

/// Get the YouTube Data API key, ignoring blank values
pub fn youtube_api_key() -> Option<String> {
    std::env::var(API_KEY_VAR)
        .ok()
        .map(|key| key.trim().to_string())
        .filter(|key| !key.is_empty())
}

/// Persist the API key as a dotenv file, replacing any previous content
pub fn save_api_key(path: &Path, api_key: &str) -> Result<()> {
    let api_key = api_key.trim();
    if api_key.is_empty() {
        return Err(Error::ApiKeyMissing);
    }
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, format!("{}={}\n", API_KEY_VAR, api_key))?;
    Ok(())
}

/// Parse a user-supplied result count, falling back to the default
pub fn parse_result_count(input: &str) -> usize {
    match input.trim().parse::<usize>() {
        Ok(count) => count,
        Err(_) => {
            log::warn!(
                "Invalid result count {:?}, using {}",
                input,
                DEFAULT_RESULT_COUNT
            );
            DEFAULT_RESULT_COUNT
        }
    }
}

/// Base URLs of the three YouTube Data API endpoints
#[derive(Debug, Clone)]
pub struct Endpoints {
    pub search: String,
    pub videos: String,
    pub channels: String,
}

impl Endpoints {
    /// Build endpoint URLs under a different host, e.g. a mock server
    pub fn with_base_url(base_url: &str) -> Self {
        let base = base_url.trim_end_matches('/');
        Self {
            search: format!("{}/youtube/v3/search", base),
            videos: format!("{}/youtube/v3/videos", base),
            channels: format!("{}/youtube/v3/channels", base),
        }
    }
}

impl Default for Endpoints {
    fn default() -> Self {
        Self::with_base_url(YOUTUBE_API_BASE_URL)
    }
}

/// Exponential backoff applied to 429/5xx and connection failures
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    pub initial_interval: Duration,
    pub max_interval: Duration,
    pub max_elapsed: Duration,
}

impl RetryPolicy {
    /// Never retry; the first failure is returned as-is
    pub fn none() -> Self {
        Self {
            initial_interval: Duration::ZERO,
            max_interval: Duration::ZERO,
            max_elapsed: Duration::ZERO,
        }
    }

    pub fn backoff(&self) -> ExponentialBackoff {
        ExponentialBackoffBuilder::new()
            .with_initial_interval(self.initial_interval)
            .with_max_interval(self.max_interval)
            .with_max_elapsed_time(Some(self.max_elapsed))
            .build()
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            initial_interval: Duration::from_millis(500),
            max_interval: Duration::from_secs(10),
            max_elapsed: Duration::from_secs(60),
        }
    }
}

/// Everything a pipeline run needs, passed in explicitly
#[derive(Debug, Clone)]
pub struct Config {
    pub api_key: String,
    pub output_dir: PathBuf,
    pub courtesy_delay: Duration,
    pub retry: RetryPolicy,
    pub endpoints: Endpoints,
}

impl Config {
    /// Create a config with default settings; rejects a blank API key
    pub fn new(api_key: impl Into<String>) -> Result<Self> {
        let api_key = api_key.into().trim().to_string();
        if api_key.is_empty() {
            return Err(Error::ApiKeyMissing);
        }

        Ok(Self {
            api_key,
            output_dir: PathBuf::from("."),
            courtesy_delay: Duration::from_secs(1),
            retry: RetryPolicy::default(),
            endpoints: Endpoints::default(),
        })
    }

    /// Create a config from the loaded environment
    pub fn from_env() -> Result<Self> {
        let api_key = youtube_api_key().ok_or(Error::ApiKeyMissing)?;
        Self::new(api_key)
    }
}
