//! Transport capability the client executes requests through.
//!
//! The client never opens connections itself. Callers inject something that
//! can turn an [`HttpRequest`] into an [`HttpResponse`], either blocking
//! ([`Transport`]) or asynchronously ([`AsyncTransport`]). Implementations
//! must return 4xx/5xx responses as data rather than errors; status
//! interpretation belongs to the client.
//!
//! A transport shared between threads must be safe for concurrent use. The
//! client adds no locking of its own.

use std::future::Future;

use thiserror::Error;

use crate::http::{HttpRequest, HttpResponse};

/// Failures raised by a transport before a response was obtained.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("request timed out")]
    Timeout,

    #[error("connection failed: {0}")]
    Connection(String),

    #[error(transparent)]
    Other(Box<dyn std::error::Error + Send + Sync>),
}

/// Blocking transport.
pub trait Transport {
    /// Send the request and wait for the response.
    fn execute(&self, request: HttpRequest) -> Result<HttpResponse, TransportError>;
}

/// Non-blocking transport.
///
/// Uses return-position `impl Future` in traits, so implementors can write
/// `async fn execute_async`.
pub trait AsyncTransport: Send + Sync {
    /// Send the request; the future resolves once the response is complete.
    fn execute_async(
        &self,
        request: HttpRequest,
    ) -> impl Future<Output = Result<HttpResponse, TransportError>> + Send;
}
