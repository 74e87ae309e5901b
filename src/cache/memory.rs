//! Thread-safe in-memory [`CacheStore`] implementation for local development and tests.

// self
use crate::{
	_prelude::*,
	cache::{CacheEntry, CacheFuture, CacheKey, CacheStore},
};

type EntryMap = Arc<RwLock<HashMap<CacheKey, CacheEntry>>>;

/// Thread-safe store that keeps entries in-process for tests and demos.
#[derive(Clone, Debug, Default)]
pub struct MemoryCache(EntryMap);
impl MemoryCache {
	fn put_now(map: EntryMap, key: CacheKey, entry: CacheEntry) -> bool {
		map.write().insert(key, entry);

		true
	}

	fn get_now(map: EntryMap, key: CacheKey) -> Option<CacheEntry> {
		map.read().get(&key).cloned()
	}

	fn clear_now(map: EntryMap) {
		map.write().clear();
	}
}
impl CacheStore for MemoryCache {
	fn put(&self, key: &CacheKey, entry: CacheEntry) -> CacheFuture<'_, bool> {
		let map = self.0.clone();
		let key = key.clone();

		Box::pin(async move { Self::put_now(map, key, entry) })
	}

	fn get<'a>(&'a self, key: &'a CacheKey) -> CacheFuture<'a, Option<CacheEntry>> {
		let map = self.0.clone();
		let key = key.clone();

		Box::pin(async move { Self::get_now(map, key) })
	}

	fn clear(&self) -> CacheFuture<'_, ()> {
		let map = self.0.clone();

		Box::pin(async move { Self::clear_now(map) })
	}
}
