//! Server configuration.

use std::net::{Ipv4Addr, SocketAddr};
use std::time::Duration;

/// Default listen port.
pub const DEFAULT_PORT: u16 = 8787;

/// Default `Cache-Control: max-age` and cache lifetime, in seconds.
pub const DEFAULT_CACHE_MAX_AGE_SECS: u64 = 300;

/// Server configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Address to listen on.
    pub bind: SocketAddr,

    /// How long a fetched feed is served from memory, and the `max-age`
    /// advertised to clients. Zero disables the in-memory cache.
    pub cache_max_age: Duration,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: SocketAddr::from((Ipv4Addr::LOCALHOST, DEFAULT_PORT)),
            cache_max_age: Duration::from_secs(DEFAULT_CACHE_MAX_AGE_SECS),
        }
    }
}

impl ServerConfig {
    /// Creates a new server configuration listening on `bind`.
    pub fn new(bind: SocketAddr) -> Self {
        Self {
            bind,
            ..Default::default()
        }
    }

    /// Builder: set the cache lifetime.
    pub fn with_cache_max_age(mut self, max_age: Duration) -> Self {
        self.cache_max_age = max_age;
        self
    }

    /// Value of the `Cache-Control` header sent with feed responses.
    pub fn cache_control(&self) -> String {
        format!("public, max-age={}", self.cache_max_age.as_secs())
    }
}
