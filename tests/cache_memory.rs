mod support;

// self
use support::*;

#[tokio::test]
async fn memory_cache_supports_put_get_and_invalidate() {
	let cache = MemoryCache::default();
	let key = cache_key(Some("alice@contoso.com"));
	let pair = pair_expiring_at("access", Some("refresh"), OffsetDateTime::now_utc());

	assert!(cache.get(&key).await.expect("Cache read should succeed.").is_none());

	cache.put(key.clone(), pair.clone()).await.expect("Cache write should succeed.");

	assert_eq!(cache.get(&key).await.expect("Cache read should succeed."), Some(pair));
	assert!(cache.get(&cache_key(None)).await.expect("Cache read should succeed.").is_none());

	cache.invalidate(&key).await.expect("Invalidation should succeed.");
	cache.invalidate(&key).await.expect("Invalidating a missing key should succeed.");

	assert!(cache.is_empty());
}

#[tokio::test]
async fn last_writer_wins_for_the_same_key() {
	let cache = MemoryCache::default();
	let key = cache_key(None);
	let now = OffsetDateTime::now_utc();

	cache
		.put(key.clone(), pair_expiring_at("first", None, now))
		.await
		.expect("First write should succeed.");
	cache
		.put(key.clone(), pair_expiring_at("second", None, now))
		.await
		.expect("Second write should succeed.");

	let stored = cache
		.get(&key)
		.await
		.expect("Cache read should succeed.")
		.expect("A pair should be cached.");

	assert_eq!(stored.access_token().value().expose(), "second");
	assert_eq!(cache.len(), 1);
}

#[tokio::test]
async fn clones_share_the_same_entries() {
	let cache = MemoryCache::default();
	let observer = cache.clone();
	let shared: Arc<dyn TokenCache> = Arc::new(cache);

	shared
		.put(cache_key(None), pair_expiring_at("shared", None, OffsetDateTime::now_utc()))
		.await
		.expect("Cache write should succeed.");

	assert_eq!(observer.len(), 1);
}
