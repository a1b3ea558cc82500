//! Error types for the price-data API client.
//!
//! # Design
//! `KeepaClient::send_request` never returns these; it folds every failure
//! into the `Fail` sentinel. They exist so the failure classes stay distinct
//! inside the client and for callers of `try_send_request` who want to tell a
//! dead network from a corrupt body from an unknown status code.

use thiserror::Error;

/// Failure to turn a raw response body into a `Response`.
#[derive(Debug, Error)]
pub enum DecodeError {
    /// The server sent no body at all.
    #[error("response body is empty")]
    Empty,

    #[error("gzip decompression failed: {0}")]
    Gzip(#[source] std::io::Error),

    #[error("malformed JSON payload: {0}")]
    Json(#[from] serde_json::Error),
}

/// Errors returned by `KeepaClient::try_send_request` and its parts.
#[derive(Debug, Error)]
pub enum ApiError {
    /// DNS, TLS, connect or read timeout, connection reset.
    #[error("transport failure: {0}")]
    Transport(#[from] ureq::Error),

    /// A 200 response whose body could not be decoded.
    #[error("could not decode response: {0}")]
    Decode(#[from] DecodeError),

    /// A non-200 status with no dedicated `ResponseStatus`.
    #[error("unexpected HTTP status {status}")]
    UnexpectedStatus { status: u16 },

    /// The request payload could not be serialized to JSON.
    #[error("could not serialize request body: {0}")]
    Serialization(#[source] serde_json::Error),
}
