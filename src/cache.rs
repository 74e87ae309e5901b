//! Content-addressed response caching: keys, TTL policies, stores, interceptor.
//!
//! Stores are dumb persistence layers: they never interpret expiry and never
//! surface read failures (a broken entry is a miss). The interceptor owns the
//! TTL decisions: it skips expired entries, performs the real call, and writes a
//! fresh entry only when the upstream response is successful.

pub mod disk;
pub mod entry;
pub mod interceptor;
pub mod key;
pub mod memory;
pub mod policy;

pub use disk::DiskCache;
pub use entry::CacheEntry;
pub use interceptor::*;
pub use key::*;
pub use memory::MemoryCache;
pub use policy::*;

// self
use crate::_prelude::*;

/// Boxed future returned by [`CacheStore`] operations.
pub type CacheFuture<'a, T> = Pin<Box<dyn Future<Output = T> + 'a + Send>>;

/// Persistence contract for cached response entries.
///
/// Implementations must be infallible from the caller's perspective: `get`
/// answers `None` for misses *and* read failures, `put` reports failure as
/// `false`, and neither ever panics on backend trouble.
pub trait CacheStore
where
	Self: Send + Sync,
{
	/// Persists or replaces the entry stored under `key`.
	fn put(&self, key: &CacheKey, entry: CacheEntry) -> CacheFuture<'_, bool>;

	/// Fetches the entry stored under `key`, expired or not.
	fn get<'a>(&'a self, key: &'a CacheKey) -> CacheFuture<'a, Option<CacheEntry>>;

	/// Removes every stored entry.
	fn clear(&self) -> CacheFuture<'_, ()>;
}

/// Error type produced internally by cache store backends.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ThisError)]
pub enum CacheStoreError {
	/// Serialization failures surfaced by the backend.
	#[error("Serialization error: {message}.")]
	Serialization {
		/// Human-readable error payload.
		message: String,
	},
	/// Backend-level failure for the storage engine.
	#[error("Backend failure: {message}.")]
	Backend {
		/// Human-readable error payload.
		message: String,
	},
}
