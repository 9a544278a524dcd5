//! Feed fetcher configuration.

use std::time::Duration;
use url::Url;

use crate::error::{FeedError, FeedResult};

/// Environment variable holding the upstream feed URL.
pub const URL_ENV: &str = "CALENDAR_ICS_URL";

/// Configuration for the HTTP feed fetcher.
#[derive(Debug, Clone)]
pub struct FeedConfig {
    /// Upstream ICS URL. `None` means the feed is not configured.
    pub url: Option<Url>,

    /// Request timeout.
    pub timeout: Duration,

    /// User agent string.
    pub user_agent: String,

    /// Whether to honour `HTTP_PROXY`/`HTTPS_PROXY` from the environment.
    pub system_proxy: bool,
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            url: None,
            timeout: Duration::from_secs(Self::DEFAULT_TIMEOUT_SECS),
            user_agent: format!("tpc-ics-proxy/{}", env!("CARGO_PKG_VERSION")),
            system_proxy: true,
        }
    }
}

impl FeedConfig {
    /// Default timeout in seconds.
    pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

    /// Creates a configuration for the given upstream URL.
    ///
    /// # Errors
    ///
    /// Returns an error if the URL is invalid.
    pub fn new(url: impl AsRef<str>) -> Result<Self, url::ParseError> {
        let parsed = Url::parse(url.as_ref())?;
        Ok(Self {
            url: Some(parsed),
            ..Self::default()
        })
    }

    /// Reads the upstream URL from `CALENDAR_ICS_URL`.
    ///
    /// An unset or blank variable yields an unconfigured feed, which only
    /// fails once a fetch is attempted.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the variable holds an invalid URL.
    pub fn from_env() -> FeedResult<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Like [`FeedConfig::from_env`], reading variables through `lookup`.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> FeedResult<Self> {
        match lookup(URL_ENV) {
            Some(value) if !value.trim().is_empty() => Self::new(value.trim()).map_err(|e| {
                FeedError::config(format!("Invalid {}: {}", URL_ENV, e)).with_source(e)
            }),
            _ => Ok(Self::default()),
        }
    }

    /// Sets the upstream URL.
    pub fn with_url(mut self, url: Url) -> Self {
        self.url = Some(url);
        self
    }

    /// Sets the request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Sets the user agent string.
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Ignores proxy settings from the environment.
    pub fn without_system_proxy(mut self) -> Self {
        self.system_proxy = false;
        self
    }

    /// Returns the upstream URL as a string, if configured.
    pub fn url_str(&self) -> Option<&str> {
        self.url.as_ref().map(Url::as_str)
    }

    /// Returns true if an upstream URL is configured.
    pub fn is_configured(&self) -> bool {
        self.url.is_some()
    }
}
