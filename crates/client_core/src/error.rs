use shared::error::{FailureKind, LoadFailure};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("request to {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("{url} responded with status {status}")]
    Status { url: String, status: u16 },
    #[error("malformed response body from {url}: {source}")]
    MalformedBody {
        url: String,
        #[source]
        source: serde_json::Error,
    },
}

impl FetchError {
    pub fn kind(&self) -> FailureKind {
        match self {
            FetchError::Transport { .. } => FailureKind::Transport,
            FetchError::Status { .. } => FailureKind::Status,
            FetchError::MalformedBody { .. } => FailureKind::MalformedBody,
        }
    }

    /// Errors carrying an HTTP status become `Status`; everything else is `Transport`.
    pub(crate) fn from_reqwest(url: &str, source: reqwest::Error) -> Self {
        match source.status() {
            Some(status) => FetchError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            },
            None => FetchError::Transport {
                url: url.to_string(),
                source,
            },
        }
    }
}

impl From<&FetchError> for LoadFailure {
    fn from(value: &FetchError) -> Self {
        LoadFailure::new(value.kind(), value.to_string())
    }
}
