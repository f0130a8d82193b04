use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("API key not set. Run `yt-reaction init` to configure.")]
    ApiKeyMissing,

    #[error("{endpoint} request failed ({status}): {body}")]
    Api {
        endpoint: &'static str,
        status: reqwest::StatusCode,
        body: String,
    },

    #[error("No eligible channels found. Try a broader query.")]
    NoEligibleChannels,

    #[error("No eligible videos found (channels need at least {min_subscribers} subscribers).")]
    NoEligibleVideos { min_subscribers: u64 },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

impl Error {
    /// Whether a failed request is worth repeating.
    pub fn is_transient(&self) -> bool {
        match self {
            Error::Api { status, .. } => {
                *status == reqwest::StatusCode::TOO_MANY_REQUESTS || status.is_server_error()
            }
            Error::Http(e) => e.is_timeout() || e.is_connect(),
            _ => false,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
