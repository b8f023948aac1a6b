use lru::LruCache;
use std::num::NonZeroUsize;
use std::sync::Mutex;

/// LRU cache of block number → unix timestamp, private to the RPC client.
/// `get` promotes the entry to most-recently-used, satisfying the "hit
/// re-inserts for recency" rule; eviction drops the least recently
/// used entry once the cache is at capacity.
pub struct TimestampCache {
    inner: Mutex<LruCache<u64, u64>>,
}

impl TimestampCache {
    pub fn new(capacity: usize) -> Self {
        let cap = NonZeroUsize::new(capacity.max(1)).expect("capacity clamped to at least 1");
        Self {
            inner: Mutex::new(LruCache::new(cap)),
        }
    }

    pub fn get(&self, block_number: u64) -> Option<u64> {
        self.inner
            .lock()
            .expect("timestamp cache mutex poisoned")
            .get(&block_number)
            .copied()
    }

    pub fn insert(&self, block_number: u64, timestamp: u64) {
        self.inner
            .lock()
            .expect("timestamp cache mutex poisoned")
            .put(block_number, timestamp);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hit_is_pure_and_promotes_recency() {
        let cache = TimestampCache::new(2);
        cache.insert(1, 100);
        cache.insert(2, 200);

        assert_eq!(cache.get(1), Some(100));
        assert_eq!(cache.get(1), Some(100));

        // 1 was just touched, so inserting a third entry evicts 2, not 1.
        cache.insert(3, 300);
        assert_eq!(cache.get(1), Some(100));
        assert_eq!(cache.get(2), None);
        assert_eq!(cache.get(3), Some(300));
    }

    #[test]
    fn miss_returns_none() {
        let cache = TimestampCache::new(4);
        assert_eq!(cache.get(99), None);
    }
}
