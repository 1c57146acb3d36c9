//! Error types for the property API client.
//!
//! # Design
//! `NotFound` gets a dedicated variant because callers routinely branch on
//! "the record does not exist". Every other unexpected status lands in
//! `Http`, carrying the server's `{message}` text when the body has one and
//! the raw body otherwise.

use thiserror::Error;

/// Errors returned by `PropertyClient` build and parse methods.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The server returned 404: the requested property does not exist.
    #[error("property not found")]
    NotFound,

    /// The server returned an unexpected status other than 404.
    #[error("HTTP {status}: {message}")]
    Http { status: u16, message: String },

    /// The response body could not be deserialized into the expected type.
    #[error("deserialization failed: {0}")]
    Deserialization(String),

    /// The request payload could not be serialized to JSON.
    #[error("serialization failed: {0}")]
    Serialization(String),
}
