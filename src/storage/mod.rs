//! Storage Module
//!
//! This module holds the alias mappings and everything that expires them:
//! the store itself, the clock it reads time from, and the background
//! sweeper.
//!
//! ## Architecture
//!
//! ```text
//! ┌───────────────────────────────────┐       ┌───────────┐
//! │             UrlStore              │──────>│   Clock   │
//! │  RwLock<HashMap<alias, Mapping>>  │       └───────────┘
//! └───────────────────────────────────┘
//!                  ▲
//!                  │ sweep() every interval
//!    ┌─────────────┴─────────────┐
//!    │       ExpirySweeper       │
//!    │  (Background Tokio Task)  │
//!    └───────────────────────────┘
//! ```
//!
//! ## Example
//!
//! ```
//! use quicklink::storage::{ManualClock, UrlStore};
//! use std::sync::Arc;
//! use std::time::Duration;
//!
//! let clock = ManualClock::new();
//! let store = UrlStore::with_clock(Arc::new(clock.clone()));
//!
//! store.put("aZ3kQ9", "https://www.example.com", Duration::from_secs(60));
//! assert!(store.get("aZ3kQ9").is_some());
//!
//! clock.advance(Duration::from_secs(60));
//! assert!(store.get("aZ3kQ9").is_none());
//! ```

pub mod clock;
pub mod expiry;
pub mod store;

// Re-export commonly used types
pub use clock::{Clock, ManualClock, SystemClock};
pub use expiry::{ExpirySweeper, DEFAULT_SWEEP_INTERVAL};
pub use store::{Mapping, StoreStats, UrlStore};
