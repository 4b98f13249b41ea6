//! Failure modes of a single Pushshift request.

use reqwest::StatusCode;
use thiserror::Error;

/// Why one request produced no usable rows.
///
/// These never abort a harvest; they are carried in
/// [`FetchOutcome::Failed`](crate::data::pushshift::FetchOutcome) so callers
/// can log them and carry on with an empty table.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("request to {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("{url} answered with HTTP {status}")]
    Status { url: String, status: StatusCode },

    #[error("response from {url} is not valid JSON: {source}")]
    Decode {
        url: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("response from {url} has no `data` array")]
    MissingData { url: String },

    #[error("element {index} of the `data` array from {url} is not an object")]
    NotARecord { url: String, index: usize },
}
