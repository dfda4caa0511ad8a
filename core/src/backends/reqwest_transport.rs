//! Reqwest-based asynchronous transport.

use std::time::Duration;

use crate::http::{HttpMethod, HttpRequest, HttpResponse};
use crate::transport::{AsyncTransport, TransportError};

/// An [`AsyncTransport`] backed by a [`reqwest::Client`].
///
/// The timeout is set on each request. A wrapped client keeps its own
/// settings until [`ReqwestTransport::with_timeout`] sets one.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: reqwest::Client,
    timeout: Option<Duration>,
}

impl ReqwestTransport {
    /// Create a transport whose requests give up after `timeout`.
    #[must_use]
    pub fn new(timeout: Duration) -> Self {
        Self::from_client(reqwest::Client::new()).with_timeout(timeout)
    }

    /// Wrap an existing [`reqwest::Client`].
    #[must_use]
    pub fn from_client(client: reqwest::Client) -> Self {
        Self {
            client,
            timeout: None,
        }
    }

    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }
}

impl Default for ReqwestTransport {
    fn default() -> Self {
        Self::new(Duration::from_secs(30))
    }
}

impl AsyncTransport for ReqwestTransport {
    async fn execute_async(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        let method = match request.method {
            HttpMethod::Get => reqwest::Method::GET,
            HttpMethod::Post => reqwest::Method::POST,
            HttpMethod::Put => reqwest::Method::PUT,
            HttpMethod::Delete => reqwest::Method::DELETE,
        };

        let mut builder = self.client.request(method, &request.url);
        if let Some(timeout) = self.timeout {
            builder = builder.timeout(timeout);
        }
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        if let Some(body) = request.body {
            builder = builder.body(body);
        }

        let response = builder.send().await.map_err(map_reqwest_error)?;

        let status = response.status().as_u16();
        let headers = response
            .headers()
            .iter()
            .filter_map(|(name, value)| {
                value
                    .to_str()
                    .ok()
                    .map(|value| (name.as_str().to_owned(), value.to_owned()))
            })
            .collect();
        let body = response.text().await.map_err(map_reqwest_error)?;

        Ok(HttpResponse {
            status,
            headers,
            body,
        })
    }
}

fn map_reqwest_error(err: reqwest::Error) -> TransportError {
    if err.is_timeout() {
        TransportError::Timeout
    } else if err.is_connect() {
        TransportError::Connection(err.to_string())
    } else {
        TransportError::Other(Box::new(err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn requested_timeout_is_kept() {
        let transport = ReqwestTransport::new(Duration::from_secs(5));
        assert_eq!(transport.timeout(), Some(Duration::from_secs(5)));
        assert_eq!(ReqwestTransport::default().timeout(), Some(Duration::from_secs(30)));
    }

    #[test]
    fn wrapped_client_has_no_timeout_until_set() {
        let transport = ReqwestTransport::from_client(reqwest::Client::new());
        assert_eq!(transport.timeout(), None);
        let transport = transport.with_timeout(Duration::from_millis(250));
        assert_eq!(transport.timeout(), Some(Duration::from_millis(250)));
    }
}
