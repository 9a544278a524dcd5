//! Client configuration.
//!
//! All settings live in a single `config.toml` file at
//! `~/.config/postercal/config.toml` by default:
//!
//! ```toml
//! [feed]
//! url = "https://calendar.example.com/club.ics"
//! timeout_secs = 30
//!
//! [display]
//! max_title_length = 40
//! placeholder = "TPC"
//! detail_note = "Members free; $10 one-night."
//!
//! [server]
//! bind = "127.0.0.1:8787"
//! cache_max_age_secs = 300
//! ```
//!
//! Command-line flags and environment variables (`CALENDAR_ICS_URL`,
//! `POSTERCAL_CONFIG`) take precedence over the file.

use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::time::Duration;

use postercal_core::{FormatOptions, TimeFormat};
use postercal_feed::FeedConfig;
use postercal_server::ServerConfig;
use serde::{Deserialize, Serialize};
use url::Url;

// ---------------------------------------------------------------------------
// ClientConfig (config.toml)
// ---------------------------------------------------------------------------

/// Configuration for the postercal client.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Feed location settings.
    pub feed: FeedSettings,

    /// Display settings.
    pub display: DisplaySettings,

    /// Proxy settings.
    pub server: ServerSettings,
}

/// Where the feed comes from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FeedSettings {
    /// Upstream ICS URL.
    pub url: Option<String>,

    /// Local `.ics` file, used instead of `url` when set.
    pub file: Option<PathBuf>,

    /// Request timeout in seconds.
    pub timeout_secs: u64,
}

impl Default for FeedSettings {
    fn default() -> Self {
        Self {
            url: None,
            file: None,
            timeout_secs: FeedConfig::DEFAULT_TIMEOUT_SECS,
        }
    }
}

/// Display settings for output formatting.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplaySettings {
    /// Maximum title length (truncated with ellipsis).
    pub max_title_length: Option<usize>,

    /// Text shown in place of a missing poster.
    pub placeholder: String,

    /// Text shown when a month has no events.
    pub empty_text: String,

    /// Clock format for start times.
    pub time_format: TimeFormat,

    /// Wrap titles in terminal hyperlinks to the event page.
    pub hyperlinks: bool,

    /// Note printed at the end of every detail view.
    pub detail_note: Option<String>,
}

impl Default for DisplaySettings {
    fn default() -> Self {
        let defaults = FormatOptions::default();
        Self {
            max_title_length: defaults.max_title_length,
            placeholder: defaults.placeholder,
            empty_text: defaults.empty_text,
            time_format: defaults.time_format,
            hyperlinks: defaults.hyperlinks,
            detail_note: defaults.detail_note,
        }
    }
}

impl DisplaySettings {
    /// Converts to formatter options.
    pub fn to_format_options(&self) -> FormatOptions {
        FormatOptions {
            max_title_length: self.max_title_length,
            placeholder: self.placeholder.clone(),
            empty_text: self.empty_text.clone(),
            hyperlinks: self.hyperlinks,
            time_format: self.time_format,
            detail_note: self.detail_note.clone(),
        }
    }
}

/// Feed proxy settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerSettings {
    /// Address to listen on.
    pub bind: String,

    /// Cache lifetime and advertised max-age, in seconds.
    pub cache_max_age_secs: u64,
}

impl Default for ServerSettings {
    fn default() -> Self {
        let defaults = ServerConfig::default();
        Self {
            bind: defaults.bind.to_string(),
            cache_max_age_secs: defaults.cache_max_age.as_secs(),
        }
    }
}

impl ServerSettings {
    /// Parses the bind address.
    pub fn bind_addr(&self) -> Result<SocketAddr, String> {
        self.bind
            .parse()
            .map_err(|e| format!("invalid server bind address '{}': {}", self.bind, e))
    }

    /// Converts to the proxy configuration.
    pub fn to_server_config(&self) -> Result<ServerConfig, String> {
        Ok(ServerConfig::new(self.bind_addr()?)
            .with_cache_max_age(Duration::from_secs(self.cache_max_age_secs)))
    }
}

impl ClientConfig {
    /// Loads configuration from the default path.
    pub fn load() -> Result<Self, String> {
        let path = Self::default_path();
        if path.exists() {
            Self::load_from(&path)
        } else {
            Ok(Self::default())
        }
    }

    /// Loads configuration from a specific path.
    pub fn load_from(path: &Path) -> Result<Self, String> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| format!("failed to read config {}: {}", path.display(), e))?;
        Self::parse(&content)
    }

    /// Parses configuration from TOML text.
    pub fn parse(content: &str) -> Result<Self, String> {
        toml::from_str(content).map_err(|e| format!("failed to parse config: {}", e))
    }

    /// Serializes the configuration to TOML.
    pub fn to_toml(&self) -> Result<String, String> {
        toml::to_string_pretty(self).map_err(|e| format!("failed to serialize config: {}", e))
    }

    /// Returns the default configuration file path.
    pub fn default_path() -> PathBuf {
        Self::default_config_dir().join("config.toml")
    }

    /// Returns the default configuration directory.
    pub fn default_config_dir() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("postercal")
    }

    /// Checks values that serde accepts but the program cannot use.
    pub fn validate(&self) -> Result<(), String> {
        if let Some(ref url) = self.feed.url {
            parse_feed_url(url)?;
        }
        if self.feed.timeout_secs == 0 {
            return Err("feed timeout_secs must be greater than zero".to_string());
        }
        if self.display.max_title_length == Some(0) {
            return Err("display max_title_length must be greater than zero".to_string());
        }
        self.server.bind_addr()?;
        Ok(())
    }
}

/// Parses and checks a feed URL.
pub fn parse_feed_url(value: &str) -> Result<Url, String> {
    let url = Url::parse(value.trim()).map_err(|e| format!("invalid feed URL '{}': {}", value, e))?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(format!(
            "invalid feed URL '{}': unsupported scheme '{}'",
            value, other
        )),
    }
}

// ---------------------------------------------------------------------------
// Feed location resolution
// ---------------------------------------------------------------------------

/// The feed location after merging flags, environment and file.
#[derive(Debug, Clone, PartialEq)]
pub enum FeedLocation {
    /// Fetch over HTTP(S).
    Url(Url),
    /// Read a local file.
    File(PathBuf),
    /// Nothing configured; fetching reports the missing URL.
    Unconfigured,
}

/// Resolves the feed location.
///
/// Order: `--file`, then `--feed-url`/`CALENDAR_ICS_URL`, then `[feed] file`,
/// then `[feed] url`.
pub fn resolve_feed_location(
    cli_url: Option<&str>,
    cli_file: Option<&Path>,
    settings: &FeedSettings,
) -> Result<FeedLocation, String> {
    if let Some(file) = cli_file {
        return Ok(FeedLocation::File(file.to_path_buf()));
    }
    if let Some(url) = cli_url.filter(|u| !u.trim().is_empty()) {
        return parse_feed_url(url).map(FeedLocation::Url);
    }
    if let Some(ref file) = settings.file {
        return Ok(FeedLocation::File(file.clone()));
    }
    match settings.url.as_deref().filter(|u| !u.trim().is_empty()) {
        Some(url) => parse_feed_url(url).map(FeedLocation::Url),
        None => Ok(FeedLocation::Unconfigured),
    }
}
