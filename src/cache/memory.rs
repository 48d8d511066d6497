//! Thread-safe in-memory [`TokenCache`] for single-process helpers and tests.

// self
use crate::{
	_prelude::*,
	auth::TokenPair,
	cache::{CacheError, CacheFuture, CacheKey, TokenCache},
};

type CacheMap = Arc<RwLock<HashMap<CacheKey, TokenPair>>>;

/// Cache backend that keeps token pairs in-process.
///
/// Clones share the same map, so a clone handed to a test can observe what the authority
/// client wrote.
#[derive(Clone, Debug, Default)]
pub struct MemoryCache(CacheMap);
impl MemoryCache {
	/// Number of cached entries.
	pub fn len(&self) -> usize {
		self.0.read().len()
	}

	/// Returns `true` when nothing is cached.
	pub fn is_empty(&self) -> bool {
		self.0.read().is_empty()
	}

	fn put_now(map: CacheMap, key: CacheKey, pair: TokenPair) -> Result<(), CacheError> {
		map.write().insert(key, pair);

		Ok(())
	}
}
impl TokenCache for MemoryCache {
	fn get<'a>(&'a self, key: &'a CacheKey) -> CacheFuture<'a, Option<TokenPair>> {
		let map = self.0.clone();

		Box::pin(async move { Ok(map.read().get(key).cloned()) })
	}

	fn put(&self, key: CacheKey, pair: TokenPair) -> CacheFuture<'_, ()> {
		let map = self.0.clone();

		Box::pin(async move { Self::put_now(map, key, pair) })
	}

	fn invalidate<'a>(&'a self, key: &'a CacheKey) -> CacheFuture<'a, ()> {
		let map = self.0.clone();

		Box::pin(async move {
			map.write().remove(key);

			Ok(())
		})
	}
}
