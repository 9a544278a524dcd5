//! Server error types and their HTTP mapping.

use std::io;
use std::net::SocketAddr;

use axum::http::{StatusCode, header};
use axum::response::{IntoResponse, Response};
use postercal_feed::{FeedError, FeedErrorCode};
use thiserror::Error;

/// Result type for server operations.
pub type ServerResult<T> = Result<T, ServerError>;

/// Errors that can occur while running the proxy.
#[derive(Debug, Error)]
pub enum ServerError {
    /// IO error while serving.
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// The listen address could not be bound.
    #[error("Failed to bind {addr}: {source}")]
    Bind {
        addr: SocketAddr,
        #[source]
        source: io::Error,
    },

    /// Feed source could not be set up.
    #[error("Feed error: {0}")]
    Feed(#[from] FeedError),

    /// Configuration error.
    #[error("Configuration error: {message}")]
    Config { message: String },
}

impl ServerError {
    /// Creates a configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Creates a bind error.
    pub fn bind(addr: SocketAddr, source: io::Error) -> Self {
        Self::Bind { addr, source }
    }
}

/// A failed feed retrieval, rendered as a plain-text HTTP response.
///
/// - missing configuration: 500 with the configuration message
/// - upstream status N: status N with `Upstream error: <reason>`
/// - anything else: 500 with `Proxy error: <message>`
#[derive(Debug)]
pub struct ProxyError(pub FeedError);

impl ProxyError {
    /// Status code and body of the response.
    pub fn parts(&self) -> (StatusCode, String) {
        let err = &self.0;
        match (err.code(), err.status()) {
            (FeedErrorCode::Config, _) => {
                (StatusCode::INTERNAL_SERVER_ERROR, err.message().to_string())
            }
            (FeedErrorCode::Upstream, Some(status)) => (
                StatusCode::from_u16(status).unwrap_or(StatusCode::BAD_GATEWAY),
                format!("Upstream error: {}", err.message()),
            ),
            (FeedErrorCode::Upstream, None) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Proxy error: {}", err.message()),
            ),
        }
    }
}

impl From<FeedError> for ProxyError {
    fn from(err: FeedError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ProxyError {
    fn into_response(self) -> Response {
        let (status, body) = self.parts();
        (
            status,
            [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
            body,
        )
            .into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use postercal_feed::MISSING_URL_MESSAGE;

    #[test]
    fn missing_url_is_500() {
        let (status, body) = ProxyError(FeedError::missing_url()).parts();
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body, MISSING_URL_MESSAGE);
    }

    #[test]
    fn upstream_status_is_forwarded() {
        let (status, body) = ProxyError(FeedError::upstream_status(404, "Not Found")).parts();
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body, "Upstream error: Not Found");
    }

    #[test]
    fn invalid_upstream_status_becomes_bad_gateway() {
        let (status, _) = ProxyError(FeedError::upstream_status(1000, "Weird")).parts();
        assert_eq!(status, StatusCode::BAD_GATEWAY);
    }

    #[test]
    fn transport_failure_is_proxy_error() {
        let (status, body) = ProxyError(FeedError::upstream("Request failed: refused")).parts();
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body, "Proxy error: Request failed: refused");
    }

    #[test]
    fn server_error_display() {
        let err = ServerError::config("bad bind address");
        assert_eq!(err.to_string(), "Configuration error: bad bind address");

        let addr: SocketAddr = "127.0.0.1:80".parse().unwrap();
        let err = ServerError::bind(addr, io::Error::other("denied"));
        assert_eq!(err.to_string(), "Failed to bind 127.0.0.1:80: denied");
    }
}
