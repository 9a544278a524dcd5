//! Error types for feed retrieval.
//!
//! Every failure falls into one of two categories:
//! - [`FeedErrorCode::Config`]: no usable feed location is configured
//! - [`FeedErrorCode::Upstream`]: the upstream could not be reached, answered
//!   with a non-success status, or its body could not be read

use std::fmt;
use thiserror::Error;

/// Message used when no feed URL is configured.
pub const MISSING_URL_MESSAGE: &str = "Missing CALENDAR_ICS_URL environment variable.";

/// The category of a feed error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FeedErrorCode {
    /// Missing or invalid feed configuration.
    Config,
    /// The upstream failed (transport error or non-success status).
    Upstream,
}

impl FeedErrorCode {
    /// Returns a machine-readable name for this error code.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Config => "config_error",
            Self::Upstream => "upstream_error",
        }
    }
}

impl fmt::Display for FeedErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// An error that occurred while retrieving the feed.
#[derive(Debug, Error)]
pub struct FeedError {
    code: FeedErrorCode,
    /// Reason phrase for status errors, otherwise a description of the failure.
    message: String,
    /// HTTP status returned by the upstream, if one was received.
    status: Option<u16>,
    #[source]
    source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl FeedError {
    /// Creates a new feed error with the given code and message.
    pub fn new(code: FeedErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            status: None,
            source: None,
        }
    }

    /// Creates a configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::new(FeedErrorCode::Config, message)
    }

    /// Creates the error for a missing feed URL.
    pub fn missing_url() -> Self {
        Self::config(MISSING_URL_MESSAGE)
    }

    /// Creates an upstream error without a status (transport or read failure).
    pub fn upstream(message: impl Into<String>) -> Self {
        Self::new(FeedErrorCode::Upstream, message)
    }

    /// Creates an upstream error for a non-success HTTP status.
    pub fn upstream_status(status: u16, reason: impl Into<String>) -> Self {
        Self {
            status: Some(status),
            ..Self::upstream(reason)
        }
    }

    /// Sets the source error for this error.
    pub fn with_source<E>(mut self, source: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        self.source = Some(Box::new(source));
        self
    }

    /// Returns the error code.
    pub fn code(&self) -> FeedErrorCode {
        self.code
    }

    /// Returns the error message.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Returns the upstream HTTP status, if one was received.
    pub fn status(&self) -> Option<u16> {
        self.status
    }

    /// Returns true for configuration errors.
    pub fn is_config(&self) -> bool {
        self.code == FeedErrorCode::Config
    }

    /// Returns true if retrying later may succeed.
    pub fn is_retryable(&self) -> bool {
        match (self.code, self.status) {
            (FeedErrorCode::Config, _) => false,
            (FeedErrorCode::Upstream, None) => true,
            (FeedErrorCode::Upstream, Some(status)) => status == 429 || status >= 500,
        }
    }
}

impl fmt::Display for FeedError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.status {
            Some(status) => write!(f, "{} ({}): {}", self.code, status, self.message),
            None => write!(f, "{}: {}", self.code, self.message),
        }
    }
}

/// A specialized Result type for feed operations.
pub type FeedResult<T> = Result<T, FeedError>;
