//! Service configuration.

use crate::error::ConfigError;
use crate::keygen::DEFAULT_KEY_LENGTH;
use crate::storage::DEFAULT_SWEEP_INTERVAL;
use std::time::Duration;

/// Default prefix for rendered short URLs.
pub const DEFAULT_BASE_URL: &str = "http://short.url/";

/// Default mapping lifetime.
pub const DEFAULT_TTL: Duration = Duration::from_secs(24 * 60 * 60);

/// Configuration for [`ShortenerService`](crate::ShortenerService).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShortenerConfig {
    /// Prefix prepended to every alias (default: `http://short.url/`)
    pub base_url: String,

    /// Characters per alias (default: 6)
    pub key_length: usize,

    /// How long a mapping stays resolvable (default: 24h)
    pub ttl: Duration,

    /// Time between background sweeps (default: 1s)
    pub sweep_interval: Duration,
}

impl Default for ShortenerConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            key_length: DEFAULT_KEY_LENGTH,
            ttl: DEFAULT_TTL,
            sweep_interval: DEFAULT_SWEEP_INTERVAL,
        }
    }
}

impl ShortenerConfig {
    /// Checks that the configuration can run a service.
    ///
    /// A zero `ttl` is allowed; every mapping is then expired on arrival.
    /// So is a `ttl` too large to represent as an instant (`Duration::MAX`);
    /// such mappings never expire.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.base_url.is_empty() {
            return Err(ConfigError::EmptyBaseUrl);
        }
        if self.key_length == 0 {
            return Err(ConfigError::ZeroKeyLength);
        }
        if self.sweep_interval.is_zero() {
            return Err(ConfigError::ZeroSweepInterval);
        }
        Ok(())
    }
}
