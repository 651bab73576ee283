use reqwest::StatusCode;
use thiserror::Error;

/// StorageError
///
/// Failures of a persistence tier. Reads surface these to the session store,
/// which treats them as "absent"; writes propagate them to the caller.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("session storage I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("session storage is corrupt: {0}")]
    Corrupt(String),

    #[error("session storage could not be encoded: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// ApiError
///
/// Everything an API call can fail with. Backend errors carry the HTTP status
/// and the backend's message unchanged; nothing is retried or reinterpreted.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("backend responded {status}: {message}")]
    Backend { status: StatusCode, message: String },

    #[error("unexpected response body: {0}")]
    Decode(String),

    #[error(transparent)]
    Session(#[from] StorageError),
}

impl ApiError {
    /// The backend status, when the failure came from a response.
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            ApiError::Backend { status, .. } => Some(*status),
            ApiError::Transport(err) => err.status(),
            _ => None,
        }
    }

    pub fn is_unauthorized(&self) -> bool {
        self.status() == Some(StatusCode::UNAUTHORIZED)
    }
}
