use reqwest::StatusCode;
use thiserror::Error;
use tracing::warn;

/// Failure talking to the chat backend
#[derive(Debug, Error)]
pub enum BackendError {
    #[error("request to {url} timed out")]
    Timeout { url: String },

    #[error("could not reach backend at {url}: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("backend returned {status} for {url}")]
    Status { status: StatusCode, url: String },

    #[error("malformed response from {url}: {source}")]
    Decode {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("send task ended before the backend answered")]
    Aborted,
}

impl BackendError {
    pub(crate) fn from_reqwest(url: &str, err: reqwest::Error) -> Self {
        let url = url.to_string();
        if err.is_timeout() {
            BackendError::Timeout { url }
        } else if err.is_decode() {
            BackendError::Decode { url, source: err }
        } else {
            BackendError::Transport { url, source: err }
        }
    }
}

/// Silent-empty policy for read paths: a failed read shows as "nothing".
///
/// The failure is logged and never reaches the user, so "no threads" and
/// "backend down" look the same on screen.
pub trait OrEmpty<T> {
    fn or_empty(self, operation: &str) -> Vec<T>;
}

impl<T> OrEmpty<T> for Result<Vec<T>, BackendError> {
    fn or_empty(self, operation: &str) -> Vec<T> {
        self.unwrap_or_else(|err| {
            warn!(operation, error = %err, "backend read failed; treating as empty");
            Vec::new()
        })
    }
}
