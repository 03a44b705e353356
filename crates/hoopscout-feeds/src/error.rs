// Error taxonomy for the external data feeds.

use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum FeedError {
    #[error("missing credential: {0}")]
    MissingCredential(&'static str),

    #[error("request to {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("ratings provider rejected the API key (HTTP 401)")]
    Auth,

    #[error("{url} returned HTTP {status}")]
    Status { url: String, status: u16 },

    #[error("malformed response from {source_name}: {message}")]
    Malformed { source_name: String, message: String },

    #[error("snapshot file {path}: {message}")]
    Snapshot { path: PathBuf, message: String },

    #[error("no box score available for game {0}")]
    BoxScoreNotFound(String),

    #[error("team not found: {0}")]
    TeamNotFound(String),
}

impl FeedError {
    pub(crate) fn malformed(source_name: impl Into<String>, message: impl Into<String>) -> Self {
        FeedError::Malformed {
            source_name: source_name.into(),
            message: message.into(),
        }
    }
}

pub type FeedResult<T> = Result<T, FeedError>;
