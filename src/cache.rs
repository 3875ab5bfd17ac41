use std::time::Duration;

use axum::body::Bytes;
use moka::future::Cache;

/// The key prefix of cached landing pages.
pub const INDEX_PREFIX: &str = "index_page";

const MAX_CAPACITY: u64 = 1_024;

/// A time-based cache of serialized feed pages.
///
/// A cached page is served verbatim until it expires or the cache is cleared,
/// even if the posts it was built from have changed since.
#[derive(Clone)]
pub struct FeedCache {
	prefix: &'static str,
	inner: Cache<String, Bytes>,
}

impl FeedCache {
	pub fn new(prefix: &'static str, ttl: Duration) -> Self {
		Self {
			prefix,
			inner: Cache::builder()
				.max_capacity(MAX_CAPACITY)
				.time_to_live(ttl)
				.build(),
		}
	}

	fn key(&self, page: &str) -> String {
		format!("{}:{page}", self.prefix)
	}

	pub async fn get(&self, page: &str) -> Option<Bytes> {
		self.inner.get(&self.key(page)).await
	}

	pub async fn insert(&self, page: &str, body: Bytes) {
		self.inner.insert(self.key(page), body).await;
	}

	/// Drops every cached page.
	#[cfg_attr(not(test), allow(dead_code))]
	pub fn clear(&self) {
		tracing::debug!(prefix = self.prefix, "clearing feed cache");

		self.inner.invalidate_all();
	}
}

#[cfg(test)]
mod test {
	use super::*;

	#[tokio::test]
	async fn test_cached_page_is_returned_verbatim() {
		let cache = FeedCache::new(INDEX_PREFIX, Duration::from_secs(20));

		cache.insert("", Bytes::from_static(b"first")).await;
		cache.insert("2", Bytes::from_static(b"second")).await;

		assert_eq!(cache.get("").await.as_deref(), Some(&b"first"[..]));
		assert_eq!(cache.get("2").await.as_deref(), Some(&b"second"[..]));
		assert_eq!(cache.get("3").await, None);
	}

	#[tokio::test]
	async fn test_clear_drops_every_page() {
		let cache = FeedCache::new(INDEX_PREFIX, Duration::from_secs(20));

		cache.insert("", Bytes::from_static(b"first")).await;
		cache.clear();

		assert_eq!(cache.get("").await, None);
	}

	#[tokio::test]
	async fn test_entries_expire() {
		let cache = FeedCache::new(INDEX_PREFIX, Duration::from_millis(50));

		cache.insert("", Bytes::from_static(b"first")).await;
		tokio::time::sleep(Duration::from_millis(150)).await;

		assert_eq!(cache.get("").await, None);
	}
}
