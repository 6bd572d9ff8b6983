//! Keyed stale-while-revalidate cache
//!
//! [`CacheStore`] serves the last good value for a key while keeping it fresh
//! in the background. Subscribers read through a [`Subscription`]; the store
//! deduplicates concurrent fetches, retries failures, applies local mutations
//! and revalidates on host focus and reconnect events.
//!
//! # Examples
//!
//! ```
//! use std::time::Duration;
//!
//! use adoptly_common::cache::{CacheConfig, CacheStore};
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! let store = CacheStore::new(
//!     "greetings",
//!     CacheConfig::builder().dedupe_interval(Duration::from_secs(2)).build(),
//!     |name: String| async move { Ok::<_, String>(format!("hello {name}")) },
//! );
//!
//! let sub = store.subscribe(Some("ada".to_string()));
//! let value = sub.load().await.unwrap();
//! assert_eq!(value.as_deref().map(String::as_str), Some("hello ada"));
//!
//! sub.mutate("bonjour ada".to_string());
//! assert_eq!(store.peek(&"ada".to_string()).as_deref().map(String::as_str), Some("bonjour ada"));
//! # }
//! ```

pub mod config;
pub mod state;
pub mod stats;
pub mod store;

pub use config::{CacheConfig, CacheConfigBuilder};
pub use state::{CacheState, RevalidateEvent};
pub use stats::CacheStats;
pub use store::{CacheStore, CacheStoreBuilder, FetchFuture, Fetcher, RetryPredicate, Subscription};
