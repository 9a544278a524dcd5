//! Logging setup shared by the postercal binaries.
//!
//! Logs always go to stderr so that `show --json` and friends keep stdout
//! clean for their payload.
//!
//! ```ignore
//! use postercal_core::tracing::{init_tracing, TracingConfig};
//!
//! // `postercal show -v`
//! init_tracing(TracingConfig::from_verbosity(1))?;
//!
//! // `postercal serve --json-logs`
//! init_tracing(TracingConfig::server(true))?;
//! ```

use thiserror::Error;
use tracing::{Level, Subscriber};
use tracing_subscriber::{
    EnvFilter, Layer,
    fmt::{self, format::FmtSpan},
    prelude::*,
    registry::LookupSpan,
};

/// Target prefix covering every postercal crate.
pub const LOG_TARGET: &str = "postercal";

/// Errors that can occur during tracing initialization
#[derive(Debug, Error)]
pub enum TracingError {
    /// Failed to set global subscriber
    #[error("failed to set global tracing subscriber: {0}")]
    SetGlobalSubscriber(#[from] tracing::subscriber::SetGlobalDefaultError),

    /// Failed to parse env filter directive
    #[error("failed to parse env filter: {0}")]
    EnvFilter(#[from] tracing_subscriber::filter::ParseError),
}

/// Output format for log lines
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TracingOutputFormat {
    /// Multi-line human-readable format
    Pretty,
    /// Single-line format
    #[default]
    Compact,
    /// One JSON object per line, for the proxy behind a log collector
    Json,
}

/// Configuration for tracing initialization
#[derive(Debug, Clone)]
pub struct TracingConfig {
    /// Level applied to postercal targets when `RUST_LOG` is unset
    pub default_level: Level,
    /// Output format for log lines
    pub output_format: TracingOutputFormat,
    /// Whether to include file/line information
    pub include_location: bool,
    /// Whether to include the module path
    pub include_target: bool,
    /// Whether to include timestamps
    pub include_timestamp: bool,
    /// Whether to log span open/close (request spans in the proxy)
    pub include_span_events: bool,
    /// Explicit filter directive, overriding both `RUST_LOG` and `default_level`
    pub env_filter: Option<String>,
}

impl Default for TracingConfig {
    fn default() -> Self {
        Self {
            default_level: Level::WARN,
            output_format: TracingOutputFormat::Compact,
            include_location: false,
            include_target: false,
            include_timestamp: false,
            include_span_events: false,
            env_filter: None,
        }
    }
}

impl TracingConfig {
    /// CLI preset from the number of `-v` flags: 0 = warn, 1 = info,
    /// 2 = debug, 3+ = trace.
    #[must_use]
    pub fn from_verbosity(verbose: u8) -> Self {
        match verbose {
            0 => Self::default(),
            1 => Self::default().with_level(Level::INFO),
            2 => Self::cli_debug(),
            _ => Self::cli_debug().with_level(Level::TRACE),
        }
    }

    /// CLI preset for debugging feed parsing
    #[must_use]
    pub fn cli_debug() -> Self {
        Self {
            default_level: Level::DEBUG,
            include_location: true,
            include_target: true,
            ..Self::default()
        }
    }

    /// Preset for the feed proxy
    #[must_use]
    pub fn server(json: bool) -> Self {
        Self {
            default_level: Level::INFO,
            output_format: if json {
                TracingOutputFormat::Json
            } else {
                TracingOutputFormat::Pretty
            },
            include_location: json,
            include_target: true,
            include_timestamp: true,
            include_span_events: json,
            env_filter: None,
        }
    }

    /// Set the default log level
    #[must_use]
    pub fn with_level(mut self, level: Level) -> Self {
        self.default_level = level;
        self
    }

    /// Set the output format
    #[must_use]
    pub fn with_format(mut self, format: TracingOutputFormat) -> Self {
        self.output_format = format;
        self
    }

    /// Set a custom env filter directive
    #[must_use]
    pub fn with_env_filter(mut self, filter: impl Into<String>) -> Self {
        self.env_filter = Some(filter.into());
        self
    }

    /// Filter directive used when neither `env_filter` nor `RUST_LOG` is set.
    pub fn default_directive(&self) -> String {
        format!("{}={}", LOG_TARGET, self.default_level)
    }
}

/// Initialize tracing with the given configuration.
///
/// Call once at startup. `RUST_LOG` overrides the default level unless the
/// config carries an explicit filter.
///
/// # Errors
///
/// Returns an error if the global subscriber has already been set or if
/// the filter directive is invalid.
pub fn init_tracing(config: TracingConfig) -> Result<(), TracingError> {
    let subscriber = tracing_subscriber::registry()
        .with(config.build_filter()?)
        .with(fmt_layer(&config));
    tracing::subscriber::set_global_default(subscriber)?;
    Ok(())
}

impl TracingConfig {
    /// Resolves the filter: explicit directive, then `RUST_LOG`, then the
    /// default level on postercal targets.
    fn build_filter(&self) -> Result<EnvFilter, TracingError> {
        match self.env_filter {
            Some(ref filter) => Ok(EnvFilter::try_new(filter)?),
            None => Ok(EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(self.default_directive()))),
        }
    }
}

/// Builds the stderr formatting layer for the configured format.
fn fmt_layer<S>(config: &TracingConfig) -> Box<dyn Layer<S> + Send + Sync>
where
    S: Subscriber + for<'a> LookupSpan<'a>,
{
    let span_events = if config.include_span_events {
        FmtSpan::NEW | FmtSpan::CLOSE
    } else {
        FmtSpan::NONE
    };

    let base = fmt::layer()
        .with_writer(std::io::stderr)
        .with_file(config.include_location)
        .with_line_number(config.include_location)
        .with_target(config.include_target)
        .with_span_events(span_events);

    match (config.output_format, config.include_timestamp) {
        (TracingOutputFormat::Pretty, true) => base.pretty().boxed(),
        (TracingOutputFormat::Pretty, false) => base.pretty().without_time().boxed(),
        (TracingOutputFormat::Compact, true) => base.compact().boxed(),
        (TracingOutputFormat::Compact, false) => base.compact().without_time().boxed(),
        (TracingOutputFormat::Json, true) => base.json().boxed(),
        (TracingOutputFormat::Json, false) => base.json().without_time().boxed(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quiet_by_default() {
        let config = TracingConfig::default();
        assert_eq!(config.default_level, Level::WARN);
        assert_eq!(config.output_format, TracingOutputFormat::Compact);
        assert!(!config.include_timestamp);
        assert!(config.env_filter.is_none());
    }

    #[test]
    fn verbosity_levels() {
        assert_eq!(TracingConfig::from_verbosity(0).default_level, Level::WARN);
        assert_eq!(TracingConfig::from_verbosity(1).default_level, Level::INFO);
        assert_eq!(TracingConfig::from_verbosity(2).default_level, Level::DEBUG);
        assert_eq!(TracingConfig::from_verbosity(7).default_level, Level::TRACE);
        assert!(TracingConfig::from_verbosity(2).include_location);
    }

    #[test]
    fn server_presets() {
        let json = TracingConfig::server(true);
        assert_eq!(json.output_format, TracingOutputFormat::Json);
        assert!(json.include_span_events);
        assert!(json.include_timestamp);

        let plain = TracingConfig::server(false);
        assert_eq!(plain.output_format, TracingOutputFormat::Pretty);
        assert_eq!(plain.default_level, Level::INFO);
    }

    #[test]
    fn default_directive_targets_all_crates() {
        let config = TracingConfig::default().with_level(Level::DEBUG);
        assert_eq!(config.default_directive(), "postercal=DEBUG");
    }

    #[test]
    fn explicit_filter_wins() {
        let config = TracingConfig::default().with_env_filter("postercal_server=debug");
        assert!(config.build_filter().is_ok());

        let bad = TracingConfig::default().with_env_filter("postercal=notalevel");
        assert!(matches!(bad.build_filter(), Err(TracingError::EnvFilter(_))));
    }

    #[test]
    fn builder_methods() {
        let config = TracingConfig::default()
            .with_format(TracingOutputFormat::Json)
            .with_env_filter("postercal_feed=trace");

        assert_eq!(config.output_format, TracingOutputFormat::Json);
        assert_eq!(config.env_filter, Some("postercal_feed=trace".to_string()));
    }
}
