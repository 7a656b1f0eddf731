//! Error types for the Octosend client.

use reqwest::StatusCode;
use reqwest::header::HeaderMap;

/// Errors returned by Octosend API operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The HTTP request could not be sent or the response body could not be
    /// read (connection failure, timeout, invalid proxy, ...).
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The API answered with a non-2xx status. Status, headers, and raw body
    /// are kept for diagnostics.
    #[error("api returned {status}: {body}")]
    Api {
        /// HTTP status code of the failing response.
        status: StatusCode,
        /// Response headers as received.
        headers: HeaderMap,
        /// Raw response body, usually a JSON error description.
        body: String,
    },

    /// A record could not be decoded into its typed representation.
    #[error("failed to decode record: {0}")]
    Json(#[from] serde_json::Error),

    /// The response was structurally not what the endpoint contract promises
    /// (e.g. a count endpoint returning something other than an integer).
    #[error("unexpected response: {0}")]
    ResponseParse(&'static str),
}
