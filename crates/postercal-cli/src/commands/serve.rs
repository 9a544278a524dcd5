//! Serve command: runs the feed proxy in the foreground.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use postercal_feed::FeedSource;
use postercal_server::ServerConfig;
use tracing::info;

use crate::config::ServerSettings;
use crate::error::{ClientError, ClientResult};

/// Command-line overrides for the proxy.
#[derive(Debug, Clone, Copy, Default)]
pub struct ServeOverrides {
    /// `--bind`
    pub bind: Option<SocketAddr>,
    /// `--max-age`
    pub max_age: Option<u64>,
}

/// Merges the `[server]` settings with command-line overrides.
pub fn server_config(
    settings: &ServerSettings,
    overrides: ServeOverrides,
) -> ClientResult<ServerConfig> {
    let mut config = settings.to_server_config().map_err(ClientError::Config)?;
    if let Some(bind) = overrides.bind {
        config.bind = bind;
    }
    if let Some(secs) = overrides.max_age {
        config = config.with_cache_max_age(Duration::from_secs(secs));
    }
    Ok(config)
}

/// Starts the proxy and blocks until shutdown.
pub async fn run(config: ServerConfig, source: Arc<dyn FeedSource>) -> ClientResult<()> {
    info!(
        source = source.name(),
        location = %source.location(),
        "Starting feed proxy"
    );
    postercal_server::serve(config, source).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn settings_without_overrides() {
        let config = server_config(&ServerSettings::default(), ServeOverrides::default()).unwrap();
        assert_eq!(config.bind.port(), 8787);
        assert_eq!(config.cache_control(), "public, max-age=300");
    }

    #[test]
    fn overrides_win() {
        let overrides = ServeOverrides {
            bind: Some("0.0.0.0:9000".parse().unwrap()),
            max_age: Some(60),
        };
        let config = server_config(&ServerSettings::default(), overrides).unwrap();
        assert_eq!(config.bind.port(), 9000);
        assert_eq!(config.cache_control(), "public, max-age=60");
    }

    #[test]
    fn invalid_bind_is_config_error() {
        let settings = ServerSettings {
            bind: "localhost".to_string(),
            cache_max_age_secs: 300,
        };
        let err = server_config(&settings, ServeOverrides::default()).unwrap_err();
        assert!(matches!(err, ClientError::Config(_)));
    }
}
