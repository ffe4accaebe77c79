//! Bounded in-memory image cache.
//!
//! An LRU keyed by CID with three limits: entry count, cumulative bytes, and a
//! time-to-live measured from insertion. Whichever limit trips first evicts.

use bytes::Bytes;
use lru::LruCache;
use parking_lot::Mutex;
use std::time::{Duration, Instant};

use crate::config::CacheConfig;
use crate::observability::metrics;

/// An image body and the content type it was served with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CachedImage {
    pub bytes: Bytes,
    pub content_type: String,
}

impl CachedImage {
    pub fn new(bytes: impl Into<Bytes>, content_type: impl Into<String>) -> Self {
        Self {
            bytes: bytes.into(),
            content_type: content_type.into(),
        }
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

struct Entry {
    image: CachedImage,
    inserted_at: Instant,
}

struct Inner {
    entries: LruCache<String, Entry>,
    total_bytes: usize,
}

impl Inner {
    fn remove(&mut self, cid: &str) {
        if let Some(old) = self.entries.pop(cid) {
            self.total_bytes -= old.image.len();
        }
    }
}

/// Thread-safe LRU cache of IPFS images.
pub struct ImageCache {
    inner: Mutex<Inner>,
    max_entries: usize,
    max_bytes: usize,
    ttl: Duration,
}

impl ImageCache {
    pub fn new(max_entries: usize, max_bytes: usize, ttl: Duration) -> Self {
        Self {
            inner: Mutex::new(Inner {
                entries: LruCache::unbounded(),
                total_bytes: 0,
            }),
            max_entries: max_entries.max(1),
            max_bytes,
            ttl,
        }
    }

    pub fn from_config(config: &CacheConfig) -> Self {
        Self::new(
            config.max_entries,
            config.max_bytes,
            Duration::from_secs(config.ttl_secs),
        )
    }

    /// Look up a CID, promoting it to most recently used.
    ///
    /// An entry past its TTL is dropped and reported as absent.
    pub fn get(&self, cid: &str) -> Option<CachedImage> {
        let mut inner = self.inner.lock();
        let expired = inner.entries.peek(cid).map(|e| e.inserted_at.elapsed() >= self.ttl)?;
        if expired {
            inner.remove(cid);
            metrics::record_cache_size(inner.total_bytes);
            return None;
        }
        inner.entries.get(cid).map(|e| e.image.clone())
    }

    /// Store an image, evicting least recently used entries until both the
    /// count and byte limits hold. Images larger than the byte limit are not stored.
    pub fn insert(&self, cid: &str, image: CachedImage) {
        let mut inner = self.inner.lock();
        inner.remove(cid);

        if image.len() > self.max_bytes {
            tracing::debug!(cid, size = image.len(), "Image exceeds cache byte limit, not cached");
            return;
        }

        inner.total_bytes += image.len();
        inner.entries.put(
            cid.to_string(),
            Entry {
                image,
                inserted_at: Instant::now(),
            },
        );

        while inner.entries.len() > self.max_entries || inner.total_bytes > self.max_bytes {
            match inner.entries.pop_lru() {
                Some((evicted, entry)) => {
                    inner.total_bytes -= entry.image.len();
                    tracing::debug!(cid = %evicted, size = entry.image.len(), "Evicted cached image");
                }
                None => break,
            }
        }
        metrics::record_cache_size(inner.total_bytes);
    }

    /// Number of entries and cumulative bytes currently held.
    pub fn stats(&self) -> (usize, usize) {
        let inner = self.inner.lock();
        (inner.entries.len(), inner.total_bytes)
    }

    pub fn clear(&self) {
        let mut inner = self.inner.lock();
        inner.entries.clear();
        inner.total_bytes = 0;
        metrics::record_cache_size(0);
    }
}

impl std::fmt::Debug for ImageCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let (entries, bytes) = self.stats();
        f.debug_struct("ImageCache")
            .field("entries", &entries)
            .field("bytes", &bytes)
            .field("max_entries", &self.max_entries)
            .field("max_bytes", &self.max_bytes)
            .field("ttl", &self.ttl)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn image(len: usize) -> CachedImage {
        CachedImage::new(vec![7u8; len], "image/png")
    }

    #[test]
    fn test_get_returns_stored_value() {
        let cache = ImageCache::new(10, 1024, Duration::from_secs(60));
        assert!(cache.get("QmA").is_none());

        cache.insert("QmA", image(10));
        let hit = cache.get("QmA").unwrap();
        assert_eq!(hit.len(), 10);
        assert_eq!(hit.content_type, "image/png");
        assert_eq!(cache.stats(), (1, 10));
    }

    #[test]
    fn test_count_eviction_is_lru() {
        let cache = ImageCache::new(2, 1024, Duration::from_secs(60));
        cache.insert("a", image(1));
        cache.insert("b", image(1));

        // Touch "a" so "b" becomes least recently used.
        assert!(cache.get("a").is_some());
        cache.insert("c", image(1));

        assert!(cache.get("a").is_some());
        assert!(cache.get("b").is_none());
        assert!(cache.get("c").is_some());
        assert_eq!(cache.stats(), (2, 2));
    }

    #[test]
    fn test_byte_eviction() {
        let cache = ImageCache::new(100, 100, Duration::from_secs(60));
        cache.insert("a", image(40));
        cache.insert("b", image(40));
        cache.insert("c", image(40));

        assert!(cache.get("a").is_none());
        assert!(cache.get("b").is_some());
        assert!(cache.get("c").is_some());
        assert_eq!(cache.stats(), (2, 80));
    }

    #[test]
    fn test_oversized_image_not_cached() {
        let cache = ImageCache::new(10, 50, Duration::from_secs(60));
        cache.insert("small", image(10));
        cache.insert("huge", image(51));

        assert!(cache.get("huge").is_none());
        assert!(cache.get("small").is_some());
        assert_eq!(cache.stats(), (1, 10));
    }

    #[test]
    fn test_reinsert_replaces_size() {
        let cache = ImageCache::new(10, 100, Duration::from_secs(60));
        cache.insert("a", image(30));
        cache.insert("a", image(20));
        assert_eq!(cache.stats(), (1, 20));
    }

    #[test]
    fn test_ttl_expiry() {
        let cache = ImageCache::new(10, 1024, Duration::from_millis(20));
        cache.insert("a", image(5));
        assert!(cache.get("a").is_some());

        std::thread::sleep(Duration::from_millis(40));
        assert!(cache.get("a").is_none());
        assert_eq!(cache.stats(), (0, 0));
    }

    #[test]
    fn test_default_ttl_is_one_day() {
        let cache = ImageCache::from_config(&CacheConfig::default());
        assert_eq!(cache.ttl, Duration::from_secs(86_400));
    }
}
