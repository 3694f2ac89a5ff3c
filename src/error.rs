use reqwest::StatusCode;
use thiserror::Error;

/// Failure of a single request to the translation service.
///
/// Lookups collapse every variant into "no translation"; the distinction is
/// kept for logging and for deciding whether a retry can help.
#[derive(Debug, Error)]
pub enum RemoteError {
    #[error("Request to translation service failed: {0}")]
    Transport(#[source] reqwest::Error),

    #[error("Invalid response: {status} {body}")]
    Status { status: StatusCode, body: String },

    #[error("Failed to parse translation service response: {0}")]
    Decode(#[source] reqwest::Error),
}

impl RemoteError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, RemoteError::Status { status, .. } if *status == StatusCode::NOT_FOUND)
    }

    /// Transport errors, 429 and 5xx may succeed on a later attempt.
    /// Other client errors will not.
    pub fn is_retryable(&self) -> bool {
        match self {
            RemoteError::Transport(_) => true,
            RemoteError::Status { status, .. } => {
                *status == StatusCode::TOO_MANY_REQUESTS || status.is_server_error()
            }
            RemoteError::Decode(_) => false,
        }
    }
}

/// Failure to read or write the on-disk snapshot. Never fatal.
#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("Snapshot file I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("Snapshot file is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// The only error that escapes the client: initialization could not register
/// the product, so no lookup would be meaningful.
#[derive(Debug, Error)]
pub enum InitError {
    #[error("Failed to register product '{product_id}': {source}")]
    Registration {
        product_id: String,
        #[source]
        source: RemoteError,
    },

    #[error("Failed to build HTTP client: {0}")]
    HttpClient(#[source] reqwest::Error),
}
