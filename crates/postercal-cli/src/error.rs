//! Client error types.

use std::fmt;

use postercal_feed::{FeedError, FeedErrorCode};

/// Result type for client operations.
pub type ClientResult<T> = Result<T, ClientError>;

/// Errors that can occur in the client.
#[derive(Debug)]
pub enum ClientError {
    /// Configuration error.
    Config(String),
    /// The feed could not be loaded.
    Feed(FeedError),
    /// No event matched the request.
    NotFound(String),
    /// The proxy failed.
    Server(postercal_server::ServerError),
    /// Output could not be produced.
    Output(String),
    /// IO error.
    Io(std::io::Error),
}

impl fmt::Display for ClientError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Config(msg) => write!(f, "configuration error: {}", msg),
            Self::Feed(err) => write!(
                f,
                "Calendar temporarily unavailable. {}",
                feed_error_message(err)
            ),
            Self::NotFound(msg) => write!(f, "not found: {}", msg),
            Self::Server(err) => write!(f, "server error: {}", err),
            Self::Output(msg) => write!(f, "output error: {}", msg),
            Self::Io(err) => write!(f, "IO error: {}", err),
        }
    }
}

/// The user-facing text of a feed error, worded like the proxy's responses.
fn feed_error_message(err: &FeedError) -> String {
    match (err.code(), err.status()) {
        (FeedErrorCode::Upstream, Some(status)) => {
            format!("Upstream error: {} ({})", err.message(), status)
        }
        _ => err.message().to_string(),
    }
}

impl std::error::Error for ClientError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Feed(err) => Some(err),
            Self::Server(err) => Some(err),
            Self::Io(err) => Some(err),
            _ => None,
        }
    }
}

impl From<std::io::Error> for ClientError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}

impl From<FeedError> for ClientError {
    fn from(err: FeedError) -> Self {
        Self::Feed(err)
    }
}

impl From<postercal_server::ServerError> for ClientError {
    fn from(err: postercal_server::ServerError) -> Self {
        Self::Server(err)
    }
}

impl From<serde_json::Error> for ClientError {
    fn from(err: serde_json::Error) -> Self {
        Self::Output(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn feed_errors_read_as_unavailable() {
        let err = ClientError::from(FeedError::missing_url());
        assert_eq!(
            err.to_string(),
            "Calendar temporarily unavailable. Missing CALENDAR_ICS_URL environment variable."
        );

        let err = ClientError::from(FeedError::upstream_status(404, "Not Found"));
        assert_eq!(
            err.to_string(),
            "Calendar temporarily unavailable. Upstream error: Not Found (404)"
        );

        let err = ClientError::from(FeedError::upstream("Request failed: timed out"));
        assert_eq!(
            err.to_string(),
            "Calendar temporarily unavailable. Request failed: timed out"
        );
    }

    #[test]
    fn other_variants() {
        assert_eq!(
            ClientError::Config("bad".into()).to_string(),
            "configuration error: bad"
        );
        assert_eq!(
            ClientError::NotFound("no events on 2024-03-16".into()).to_string(),
            "not found: no events on 2024-03-16"
        );
    }

    #[test]
    fn source_chain() {
        use std::error::Error;
        assert!(ClientError::from(FeedError::upstream("x")).source().is_some());
        assert!(ClientError::Config("x".into()).source().is_none());
    }
}
