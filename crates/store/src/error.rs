//! Transport-level store errors.

/// Errors raised while talking to the record store.
///
/// These cover the transport only. A store that answers but rejects the
/// operation reports that through the response body (`success` flags and
/// per-field errors), which `hms-core` interprets.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("record store request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("record store returned status {status} for {endpoint}")]
    Status {
        endpoint: String,
        status: reqwest::StatusCode,
    },
    #[error("failed to decode record store response: {0}")]
    Decode(#[source] serde_json::Error),
    #[error("invalid store base URL: {0}")]
    BaseUrl(String),
}

pub type StoreResult<T> = std::result::Result<T, StoreError>;
