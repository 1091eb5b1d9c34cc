//! Cache Entry Module
//!
//! The unit of storage shared by both eviction strategies: a key, an opaque
//! value, and the instant the entry stops being servable.

use std::time::{Duration, Instant};

// == Cache Entry ==
/// A single stored key/value pair with its expiry deadline.
#[derive(Debug, Clone)]
pub(crate) struct CacheEntry<K, V> {
    /// The key, kept here so index cleanup can run from the entry alone
    pub key: K,
    /// The stored value
    pub value: V,
    /// Instant after which the entry is expired
    pub expires_at: Instant,
}

impl<K, V> CacheEntry<K, V> {
    // == Constructor ==
    /// Creates an entry expiring `ttl` from now.
    pub fn new(key: K, value: V, ttl: Duration) -> Self {
        Self {
            key,
            value,
            expires_at: Instant::now() + ttl,
        }
    }

    // == Is Expired ==
    /// Checks whether the entry has expired as of `now`.
    ///
    /// The deadline itself is still servable: an entry expires only once the
    /// clock has moved strictly past `expires_at`. Callers pass `now` in so
    /// the lazy check in `get` and the background sweep apply the exact same
    /// test.
    pub fn is_expired_at(&self, now: Instant) -> bool {
        now > self.expires_at
    }

    // == Refresh ==
    /// Replaces the value and restarts the TTL window from now.
    pub fn refresh(&mut self, value: V, ttl: Duration) {
        self.value = value;
        self.expires_at = Instant::now() + ttl;
    }
}
