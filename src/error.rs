use std::path::PathBuf;

use thiserror::Error;

/// Everything that can go wrong between the remote site and the archive on disk.
#[derive(Debug, Error)]
pub enum ArchiveError {
    #[error("request to {url} failed: {source}")]
    Network {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("{url} returned HTTP {status}")]
    Status { url: String, status: u16 },

    #[error("parse error: {0}")]
    Parse(String),

    /// An element the page layout is expected to contain is missing.
    #[error("{what} not found on {url}")]
    NotFound { what: &'static str, url: String },

    #[error("conference url {0:?} does not end in /<year>/<period>")]
    MalformedConferenceUrl(String),

    #[error("io error at {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("configuration error: {0}")]
    Config(#[from] config::ConfigError),
}

impl ArchiveError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        ArchiveError::Io {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn not_found(what: &'static str, url: &str) -> Self {
        ArchiveError::NotFound {
            what,
            url: url.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, ArchiveError>;
