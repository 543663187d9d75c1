use std::path::PathBuf;

/// Errors from the weather API client.
///
/// `Network`, `Status` and `Decode` are all transport failures: the service
/// was unreachable or answered with something unusable. `NotFound` means the
/// service answered but could not resolve the city.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("Weather API request failed: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Weather API returned status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Failed to parse weather API response: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("No matching location found for '{0}'")]
    NotFound(String),

    #[error("Invalid weather request: {0}")]
    InvalidRequest(String),
}

impl ApiError {
    pub fn is_transport(&self) -> bool {
        matches!(self, Self::Network(_) | Self::Status { .. } | Self::Decode(_))
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }
}

/// Errors from the key-value store.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("Storage I/O failed at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Storage file {path} is corrupt: {source}")]
    Corrupt {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}
