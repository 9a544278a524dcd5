//! Configuration commands.

use std::path::Path;

use crate::config::ClientConfig;
use crate::error::{ClientError, ClientResult};

/// Dump the current configuration to stdout.
pub fn dump(config: &ClientConfig, path: &Path) -> ClientResult<()> {
    let toml_str = config.to_toml().map_err(ClientError::Config)?;
    println!("# config.toml ({})", path.display());
    println!("{}", toml_str);

    Ok(())
}

/// Validate the configuration.
pub fn validate(config: &ClientConfig) -> ClientResult<()> {
    config.validate().map_err(ClientError::Config)?;
    if config.feed.url.is_none() && config.feed.file.is_none() {
        println!("No feed configured; set CALENDAR_ICS_URL or [feed] url.");
    }

    println!("Configuration is valid.");
    Ok(())
}

/// Show the configuration file path.
pub fn path(path: &Path) -> ClientResult<()> {
    println!("config: {}", path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validate_rejects_bad_bind() {
        let mut config = ClientConfig::default();
        config.server.bind = "nowhere".to_string();
        let err = validate(&config).unwrap_err();
        assert!(matches!(err, ClientError::Config(ref msg) if msg.contains("bind")));
    }

    #[test]
    fn validate_accepts_defaults() {
        assert!(validate(&ClientConfig::default()).is_ok());
    }
}
