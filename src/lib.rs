//! # QuickLink - An Expiring In-Memory URL Shortener
//!
//! QuickLink maps long URLs to short random aliases and resolves them back.
//! Every mapping lives for a fixed time-to-live, after which it is no longer
//! resolvable and is reclaimed from memory.
//!
//! ## Features
//!
//! - **Random Aliases**: fixed-length alphanumeric aliases from a CSPRNG
//! - **TTL Expiry**: every mapping carries an absolute expiry instant
//! - **Thread Safe**: one store shared by any number of concurrent callers
//! - **Background Sweeper**: a Tokio task reclaims expired mappings
//!
//! ## Architecture
//!
//! ```text
//! ┌───────────────────────────────────────────────────────────────┐
//! │                       ShortenerService                        │
//! │                                                               │
//! │  ┌──────────────┐   alias   ┌──────────────────────────────┐  │
//! │  │ KeyGenerator │──────────>│           UrlStore           │  │
//! │  └──────────────┘           │ RwLock<HashMap<alias, ...>>  │  │
//! │                             └──────────────────────────────┘  │
//! │                                           ▲                   │
//! │                                           │ sweep()           │
//! │                             ┌─────────────┴────────────────┐  │
//! │                             │        ExpirySweeper         │  │
//! │                             │   (Background Tokio Task)    │  │
//! │                             └──────────────────────────────┘  │
//! └───────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```
//! use quicklink::{ShortenerConfig, ShortenerService};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let service = Arc::new(ShortenerService::new(ShortenerConfig::default())?);
//!
//!     // Start the background expiry sweeper
//!     service.start()?;
//!
//!     let short_url = service.shorten("https://www.example.com")?;
//!     assert_eq!(service.resolve(&short_url)?, "https://www.example.com");
//!
//!     service.shutdown().await;
//!     Ok(())
//! }
//! ```
//!
//! ## Lazy + Active Expiry
//!
//! Mappings are expired in two ways:
//! 1. **Lazy**: a lookup that finds an expired mapping removes it
//! 2. **Active**: the sweeper periodically removes every expired mapping
//!
//! This ensures memory is reclaimed even for aliases nobody resolves again.
//!
//! ## Module Overview
//!
//! - [`storage`]: the expiring store, its clock and the sweeper
//! - [`keygen`]: alias generation
//! - [`service`]: the shorten/resolve façade
//! - [`config`]: service configuration
//! - [`error`]: error types

pub mod config;
pub mod error;
pub mod keygen;
pub mod service;
pub mod storage;

// Re-export commonly used types for convenience
pub use config::{ShortenerConfig, DEFAULT_BASE_URL, DEFAULT_TTL};
pub use error::{ConfigError, ShortenerError, SweeperError};
pub use keygen::KeyGenerator;
pub use service::ShortenerService;
pub use storage::{ExpirySweeper, UrlStore};

/// Version of QuickLink
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
