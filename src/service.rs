//! Shortener Service
//!
//! The façade callers talk to. It ties alias generation and the store
//! together and owns the sweeper's lifecycle.
//!
//! ## Request Flow
//!
//! ```text
//! shorten(target)                      resolve(short_url)
//!       │                                     │
//!       ▼                                     ▼
//! ┌──────────────┐                    ┌───────────────┐
//! │ KeyGenerator │                    │ strip prefix  │──> MalformedShortUrl
//! └──────┬───────┘                    └───────┬───────┘
//!        │ alias                              │ alias
//!        ▼                                    ▼
//! ┌──────────────┐                    ┌───────────────┐
//! │ UrlStore.put │                    │ UrlStore.get  │──> NotFound
//! └──────┬───────┘                    └───────┬───────┘
//!        ▼                                    ▼
//!  base_url + alias                         target
//! ```
//!
//! ## Lifecycle
//!
//! A new service answers requests immediately but only expires lazily.
//! [`ShortenerService::start`] adds the background sweeper. After
//! [`ShortenerService::stop`] or [`ShortenerService::shutdown`] every
//! request fails with [`ShortenerError::Unavailable`].

use crate::config::ShortenerConfig;
use crate::error::ShortenerError;
use crate::keygen::KeyGenerator;
use crate::storage::{Clock, ExpirySweeper, SystemClock, UrlStore};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tracing::{debug, error, info};

/// Shortens and resolves URLs against an expiring in-memory store.
///
/// Share it between callers with an `Arc`; every method takes `&self`.
///
/// # Example
///
/// ```
/// use quicklink::{ShortenerConfig, ShortenerError, ShortenerService};
///
/// let service = ShortenerService::new(ShortenerConfig::default())?;
///
/// let short_url = service.shorten("https://www.example.com")?;
/// assert!(short_url.starts_with("http://short.url/"));
/// assert_eq!(service.resolve(&short_url)?, "https://www.example.com");
/// # Ok::<(), ShortenerError>(())
/// ```
#[derive(Debug)]
pub struct ShortenerService {
    config: ShortenerConfig,
    generator: KeyGenerator,
    store: Arc<UrlStore>,

    /// Running sweeper, if started
    sweeper: Mutex<Option<ExpirySweeper>>,

    /// Set once the service has been stopped
    closed: AtomicBool,
}

impl ShortenerService {
    /// Creates a service driven by the system clock.
    ///
    /// # Errors
    ///
    /// Returns [`ShortenerError::Config`] if `config` fails validation.
    pub fn new(config: ShortenerConfig) -> Result<Self, ShortenerError> {
        Self::with_clock(config, Arc::new(SystemClock))
    }

    /// Creates a service whose store reads time from `clock`.
    pub fn with_clock(
        config: ShortenerConfig,
        clock: Arc<dyn Clock>,
    ) -> Result<Self, ShortenerError> {
        config.validate()?;

        info!(
            base_url = %config.base_url,
            key_length = config.key_length,
            ttl_ms = config.ttl.as_millis() as u64,
            "Shortener service initialized"
        );

        Ok(Self {
            generator: KeyGenerator::new(config.key_length),
            store: Arc::new(UrlStore::with_clock(clock)),
            sweeper: Mutex::new(None),
            closed: AtomicBool::new(false),
            config,
        })
    }

    fn sweeper(&self) -> MutexGuard<'_, Option<ExpirySweeper>> {
        self.sweeper.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Starts the background sweeper on the current tokio runtime.
    ///
    /// Calling it again while the sweeper runs does nothing.
    ///
    /// # Errors
    ///
    /// Returns [`ShortenerError::Sweeper`] outside a tokio runtime and
    /// [`ShortenerError::Unavailable`] once the service has been stopped.
    pub fn start(&self) -> Result<(), ShortenerError> {
        let mut sweeper = self.sweeper();
        if self.is_closed() {
            error!("Cannot start sweeper: service is stopped");
            return Err(ShortenerError::Unavailable);
        }
        if sweeper.is_some() {
            return Ok(());
        }

        let started = ExpirySweeper::start(Arc::clone(&self.store), self.config.sweep_interval)
            .inspect_err(|e| error!(error = %e, "Failed to start expiry sweeper"))?;
        *sweeper = Some(started);
        Ok(())
    }

    /// Stops the service without waiting for the sweeper task to exit.
    ///
    /// Subsequent requests fail with [`ShortenerError::Unavailable`].
    pub fn stop(&self) {
        let sweeper = self.close();
        // Dropping the handle signals the loop
        drop(sweeper);
    }

    /// Stops the service and waits until the sweeper task has exited.
    pub async fn shutdown(&self) {
        if let Some(sweeper) = self.close() {
            sweeper.shutdown().await;
        }
    }

    fn close(&self) -> Option<ExpirySweeper> {
        let mut sweeper = self.sweeper();
        if !self.closed.swap(true, Ordering::AcqRel) {
            info!("Shortener service stopped");
        }
        sweeper.take()
    }

    /// Returns true once the service has been stopped.
    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }

    /// Returns true while the background sweeper is running.
    pub fn is_sweeping(&self) -> bool {
        self.sweeper().as_ref().is_some_and(ExpirySweeper::is_running)
    }

    fn ensure_open(&self, operation: &'static str) -> Result<(), ShortenerError> {
        if self.is_closed() {
            error!(operation, "Rejected request: service is stopped");
            return Err(ShortenerError::Unavailable);
        }
        Ok(())
    }

    /// Stores `target` under a fresh alias and returns the short URL.
    ///
    /// The alias is not checked against existing ones. A collision replaces
    /// the older mapping.
    pub fn shorten(&self, target: impl Into<String>) -> Result<String, ShortenerError> {
        self.ensure_open("shorten")?;

        let alias = self.generator.generate();
        let short_url = self.render(&alias);
        self.store.put(alias, target, self.config.ttl);

        debug!(short_url = %short_url, "Shortened url");
        Ok(short_url)
    }

    /// Returns the target behind `short_url`.
    ///
    /// # Errors
    ///
    /// - [`ShortenerError::MalformedShortUrl`] if `short_url` does not start
    ///   with the base URL or the remainder is not a valid alias
    /// - [`ShortenerError::NotFound`] if the alias is unknown or expired
    /// - [`ShortenerError::Unavailable`] if the service has been stopped
    pub fn resolve(&self, short_url: &str) -> Result<String, ShortenerError> {
        self.ensure_open("resolve")?;

        let alias = self.parse_alias(short_url)?;
        match self.store.get(alias) {
            Some(target) => {
                debug!(alias = %alias, "Resolved short url");
                Ok(target)
            }
            None => {
                debug!(alias = %alias, "Short url not found");
                Err(ShortenerError::NotFound {
                    alias: alias.to_string(),
                })
            }
        }
    }

    /// Renders the short URL for `alias`.
    pub fn render(&self, alias: &str) -> String {
        format!("{}{}", self.config.base_url, alias)
    }

    /// Extracts the alias from a short URL.
    pub fn parse_alias<'a>(&self, short_url: &'a str) -> Result<&'a str, ShortenerError> {
        let malformed = |reason| ShortenerError::MalformedShortUrl {
            input: short_url.to_string(),
            reason,
        };

        let alias = short_url
            .strip_prefix(self.config.base_url.as_str())
            .ok_or_else(|| malformed("missing base url prefix"))?;
        if alias.is_empty() {
            return Err(malformed("empty alias"));
        }
        if !KeyGenerator::is_valid_alias(alias) {
            return Err(malformed("alias is not alphanumeric"));
        }
        Ok(alias)
    }

    /// Returns the shared store.
    pub fn store(&self) -> &Arc<UrlStore> {
        &self.store
    }

    /// Returns the configuration this service was built with.
    pub fn config(&self) -> &ShortenerConfig {
        &self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{ConfigError, SweeperError};
    use crate::storage::ManualClock;
    use std::time::Duration;

    const EXAMPLE: &str = "https://www.example.com";

    fn manual_service(ttl: Duration) -> (ShortenerService, ManualClock) {
        let clock = ManualClock::new();
        let config = ShortenerConfig {
            ttl,
            ..Default::default()
        };
        let service = ShortenerService::with_clock(config, Arc::new(clock.clone())).unwrap();
        (service, clock)
    }

    #[test]
    fn test_shorten_format() {
        let service = ShortenerService::new(ShortenerConfig::default()).unwrap();

        let short_url = service.shorten(EXAMPLE).unwrap();
        let alias = short_url.strip_prefix("http://short.url/").unwrap();

        assert_eq!(alias.len(), 6);
        assert!(alias.bytes().all(|b| b.is_ascii_alphanumeric()));
    }

    #[test]
    fn test_shorten_then_resolve() {
        let (service, _clock) = manual_service(Duration::from_secs(60));

        let short_url = service.shorten(EXAMPLE).unwrap();
        assert_eq!(service.resolve(&short_url).unwrap(), EXAMPLE);
        // Resolving does not consume the mapping
        assert_eq!(service.resolve(&short_url).unwrap(), EXAMPLE);
    }

    #[test]
    fn test_resolve_after_ttl() {
        let (service, clock) = manual_service(Duration::from_millis(10));

        let short_url = service.shorten(EXAMPLE).unwrap();
        assert_eq!(service.resolve(&short_url).unwrap(), EXAMPLE);

        clock.advance(Duration::from_millis(10));

        let alias = service.parse_alias(&short_url).unwrap().to_string();
        assert_eq!(
            service.resolve(&short_url),
            Err(ShortenerError::NotFound { alias })
        );
        assert!(service.store().is_empty());
    }

    #[test]
    fn test_zero_ttl_never_resolves() {
        let service = ShortenerService::new(ShortenerConfig {
            ttl: Duration::ZERO,
            ..Default::default()
        })
        .unwrap();

        let short_url = service.shorten(EXAMPLE).unwrap();
        assert!(matches!(
            service.resolve(&short_url),
            Err(ShortenerError::NotFound { .. })
        ));
    }

    #[test]
    fn test_max_ttl_shortens_and_never_expires() {
        let config = ShortenerConfig {
            ttl: Duration::MAX,
            ..Default::default()
        };
        assert_eq!(config.validate(), Ok(()));

        let clock = ManualClock::new();
        let service = ShortenerService::with_clock(config, Arc::new(clock.clone())).unwrap();

        let short_url = service.shorten(EXAMPLE).unwrap();
        clock.advance(Duration::from_secs(10 * 365 * 24 * 60 * 60));
        service.store().sweep();

        assert_eq!(service.resolve(&short_url).unwrap(), EXAMPLE);
    }

    #[test]
    fn test_resolve_unknown_alias() {
        let service = ShortenerService::new(ShortenerConfig::default()).unwrap();

        for _ in 0..3 {
            assert_eq!(
                service.resolve("http://short.url/zzzzzz"),
                Err(ShortenerError::NotFound {
                    alias: "zzzzzz".to_string()
                })
            );
        }
        assert!(service.store().is_empty());
    }

    #[test]
    fn test_resolve_malformed() {
        let service = ShortenerService::new(ShortenerConfig::default()).unwrap();
        let short_url = service.shorten(EXAMPLE).unwrap();
        let alias = service.parse_alias(&short_url).unwrap().to_string();

        let cases = [
            // bare alias without prefix
            alias.clone(),
            format!("https://short.url/{}", alias),
            format!("http://other.url/{}", alias),
            // prefix in the middle, which a naive replace would accept
            format!("x{}", short_url),
            "http://short.url/".to_string(),
            format!("{}/extra", short_url),
            format!("{}?q=1", short_url),
            String::new(),
        ];

        for input in cases {
            match service.resolve(&input) {
                Err(ShortenerError::MalformedShortUrl { input: got, .. }) => {
                    assert_eq!(got, input)
                }
                other => panic!("expected malformed for {:?}, got {:?}", input, other),
            }
        }
    }

    #[test]
    fn test_custom_config() {
        let service = ShortenerService::new(ShortenerConfig {
            base_url: "https://qk.io/".to_string(),
            key_length: 10,
            ..Default::default()
        })
        .unwrap();

        let short_url = service.shorten(EXAMPLE).unwrap();
        assert!(short_url.starts_with("https://qk.io/"));
        assert_eq!(service.parse_alias(&short_url).unwrap().len(), 10);
        assert_eq!(service.resolve(&short_url).unwrap(), EXAMPLE);
    }

    #[test]
    fn test_invalid_config() {
        let result = ShortenerService::new(ShortenerConfig {
            key_length: 0,
            ..Default::default()
        });
        assert_eq!(
            result.unwrap_err(),
            ShortenerError::Config(ConfigError::ZeroKeyLength)
        );
    }

    #[test]
    fn test_stopped_service_rejects_requests() {
        let service = ShortenerService::new(ShortenerConfig::default()).unwrap();
        let short_url = service.shorten(EXAMPLE).unwrap();

        service.stop();
        assert!(service.is_closed());

        assert_eq!(service.shorten(EXAMPLE), Err(ShortenerError::Unavailable));
        assert_eq!(service.resolve(&short_url), Err(ShortenerError::Unavailable));
        assert_eq!(service.start(), Err(ShortenerError::Unavailable));

        // Stopping twice is harmless
        service.stop();
    }

    #[test]
    fn test_start_without_runtime() {
        let service = ShortenerService::new(ShortenerConfig::default()).unwrap();
        assert_eq!(
            service.start(),
            Err(ShortenerError::Sweeper(SweeperError::NoRuntime))
        );
        // Requests still work, expiry is lazy only
        let short_url = service.shorten(EXAMPLE).unwrap();
        assert_eq!(service.resolve(&short_url).unwrap(), EXAMPLE);
    }

    #[tokio::test]
    async fn test_start_and_shutdown() {
        let service = ShortenerService::new(ShortenerConfig {
            ttl: Duration::from_millis(20),
            sweep_interval: Duration::from_millis(10),
            ..Default::default()
        })
        .unwrap();

        service.start().unwrap();
        // Idempotent
        service.start().unwrap();
        assert!(service.is_sweeping());

        for _ in 0..20 {
            service.shorten(EXAMPLE).unwrap();
        }
        tokio::time::sleep(Duration::from_millis(150)).await;

        // Swept without anyone resolving
        assert!(service.store().is_empty());
        assert_eq!(service.store().stats().lazy_evicted, 0);

        service.shutdown().await;
        assert!(!service.is_sweeping());
        assert_eq!(service.shorten(EXAMPLE), Err(ShortenerError::Unavailable));
    }

    #[tokio::test]
    async fn test_concurrent_callers() {
        let service = Arc::new(ShortenerService::new(ShortenerConfig::default()).unwrap());
        service.start().unwrap();

        let mut tasks = tokio::task::JoinSet::new();
        for i in 0..50 {
            let service = Arc::clone(&service);
            tasks.spawn(async move {
                let target = format!("https://example.com/page/{}", i);
                let short_url = service.shorten(target.clone()).unwrap();
                (target, short_url)
            });
        }

        let mut issued = Vec::new();
        while let Some(joined) = tasks.join_next().await {
            issued.push(joined.unwrap());
        }

        assert_eq!(issued.len(), 50);
        for (target, short_url) in &issued {
            assert_eq!(&service.resolve(short_url).unwrap(), target);
        }

        service.shutdown().await;
    }
}
