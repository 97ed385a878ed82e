//! Error types for QuickLink.

use thiserror::Error;

/// Errors returned by [`ShortenerService`](crate::ShortenerService) operations.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ShortenerError {
    /// The alias is unknown or its mapping has expired.
    #[error("short url not found: {alias}")]
    NotFound { alias: String },

    /// The input is not a short URL this service produced.
    #[error("malformed short url {input:?}: {reason}")]
    MalformedShortUrl { input: String, reason: &'static str },

    /// The service has been stopped and accepts no more work.
    #[error("shortener service is not running")]
    Unavailable,

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Sweeper(#[from] SweeperError),
}

/// Rejected configuration values.
#[derive(Debug, Clone, Copy, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("base url must not be empty")]
    EmptyBaseUrl,
    #[error("key length must be at least 1")]
    ZeroKeyLength,
    #[error("sweep interval must be greater than zero")]
    ZeroSweepInterval,
}

/// Failures starting the background sweeper.
#[derive(Debug, Clone, Copy, Error, PartialEq, Eq)]
pub enum SweeperError {
    #[error("expiry sweeper requires a running tokio runtime")]
    NoRuntime,
    #[error("sweep interval must be greater than zero")]
    ZeroInterval,
}
