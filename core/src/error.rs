//! Error types for the Harvest API client.
//!
//! # Design
//! `NotFound` gets a dedicated variant because callers frequently distinguish
//! "the resource does not exist" from "the server returned an unexpected
//! status." All other non-2xx responses to typed operations land in `Http`
//! with the raw status code and body.
//!
//! Boolean operations (deletes and state actions) never produce `NotFound` or
//! `Http`: they report a non-200 status as `Ok(false)`.

use thiserror::Error;

use crate::transport::TransportError;

/// Errors returned by `HarvestClient` operations.
#[derive(Debug, Error)]
pub enum HarvestError {
    /// A required option was missing or options conflicted. Raised before any
    /// request reaches the transport.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// The server returned 404 for an operation that expects a body.
    #[error("resource not found")]
    NotFound,

    /// The server returned a non-2xx status other than 404.
    #[error("HTTP {status}: {body}")]
    Http { status: u16, body: String },

    /// The response body could not be decoded into the expected type.
    #[error("deserialization failed: {0}")]
    Deserialization(String),

    /// The request payload could not be encoded.
    #[error("serialization failed: {0}")]
    Serialization(String),

    /// The underlying transport failed to complete the exchange.
    #[error("transport error: {0}")]
    Transport(#[from] TransportError),

    /// The caller's cancellation token fired before the exchange completed.
    #[error("request cancelled")]
    Cancelled,
}

impl HarvestError {
    pub(crate) fn invalid(message: impl Into<String>) -> Self {
        HarvestError::InvalidArgument(message.into())
    }
}
